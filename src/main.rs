use jobman::command::Error;


#[tokio::main]
async fn main() -> Result<(), Error> {
    jobman::command::run().await
}
