use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::client::{Client, TaskApi};
use crate::command::{Cli, Command, Create, Error, Remote};
use crate::controller::{AutoConfirm, Confirm, Controller, Level, Overlay};
use crate::shell::{Dialog, Terminal};
use crate::tasks::{CreateTask, Task};
use crate::view;


pub async fn run() -> Result<(), Error> {
    let args = Cli::parse();
    let default_level = match (&args.command, args.verbose) {
        (_, true) => "debug",
        (Command::Serve { .. }, false) => "info",
        (_, false) => "warn",
    };
    init_logging(default_level);

    match args.command {
        Command::Serve { bind, port } => {
            serve(bind, port).await?;
        }
        Command::List(remote) => {
            find(String::new(), remote).await?;
        }
        Command::Find { name, remote } => {
            find(name, remote).await?;
        }
        Command::Create(create) => {
            create_task(create).await?;
        }
        Command::Delete { id, yes, remote } => {
            delete(id, yes, remote).await?;
        }
        Command::Run { id, yes, remote } => {
            run_task(id, yes, remote).await?;
        }
        Command::Output { id, remote } => {
            output(id, remote).await?;
        }
        Command::Shell(remote) => {
            shell(remote).await?;
        }
    }
    Ok(())
}


fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}


fn confirmer(yes: bool) -> Arc<dyn Confirm> {
    if yes {
        Arc::new(AutoConfirm(true))
    } else {
        Arc::new(Dialog)
    }
}


/// Prints success notifications and turns error notifications into an error.
async fn report<A: TaskApi, C: Confirm>(controller: &Controller<A, C>) -> Result<(), Error> {
    let mut errors = vec![];
    for notification in controller.take_notifications().await {
        match notification.level {
            Level::Success => println!("{}", view::render_notification(&notification)),
            Level::Error => errors.push(notification.message),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Failed(errors.join("; ")))
    }
}


async fn lookup<A: TaskApi, C: Confirm>(
    controller: &Controller<A, C>,
    id: &str
) -> Result<Task, Error> {
    controller.load_all().await;
    report(controller).await?;
    controller.state().await.tasks
        .into_iter()
        .find(|task| task.id.as_deref() == Some(id))
        .ok_or_else(|| Error::TaskNotFound(id.to_string()))
}


async fn print_overlay<A: TaskApi, C: Confirm>(controller: &Controller<A, C>) {
    if let Overlay::Open(output) = controller.state().await.overlay {
        print!("{}", view::render_output(&output));
    }
}


async fn serve(bind: String, port: u16) -> Result<(), std::io::Error> {
    let addr = format!("{}:{}", bind, port);
    let server = Arc::new(crate::server::Server::new());
    let listener = tokio::net::TcpListener::bind(addr).await?;
    crate::server::serve(server, listener).await?;
    Ok(())
}


async fn find(name: String, remote: Remote) -> Result<(), Error> {
    let controller = Controller::new(Client::new(remote.server), AutoConfirm(false));
    controller.search(&name).await;
    report(&controller).await?;

    let state = controller.state().await;
    print!("{}", view::render_tasks(&state.tasks, state.running.as_deref()));
    Ok(())
}


async fn create_task(create: Create) -> Result<(), Error> {
    let request = match create.file {
        Some(filename) => {
            serde_yaml::from_str::<CreateTask>(&tokio::fs::read_to_string(filename).await?)?
        }
        None => CreateTask::new(
            create.name.unwrap_or_default(),
            create.owner.unwrap_or_default(),
            create.command.unwrap_or_default(),
        ),
    };

    let controller = Controller::new(Client::new(create.remote.server), AutoConfirm(false));
    controller.open_create_form().await;
    let created = controller
        .create(&request.name, &request.owner, &request.command)
        .await;

    let state = controller.state().await;
    if !state.form.invalid.is_empty() {
        return Err(Error::Failed(view::render_invalid(&state.form.invalid)));
    }
    report(&controller).await?;

    if let Some(task) = created {
        println!("{}", task.id.unwrap_or_default());
    }
    Ok(())
}


async fn delete(id: String, yes: bool, remote: Remote) -> Result<(), Error> {
    let controller = Controller::new(Client::new(remote.server), confirmer(yes));
    if !controller.delete(&id).await {
        report(&controller).await?;
        println!("Cancelled");
        return Ok(());
    }
    report(&controller).await
}


async fn run_task(id: String, yes: bool, remote: Remote) -> Result<(), Error> {
    let controller = Controller::new(Client::new(remote.server), confirmer(yes));
    let task = lookup(&controller, &id).await?;

    if controller.run(&id, &task.command).await.is_none() {
        report(&controller).await?;
        println!("Cancelled");
        return Ok(());
    }
    report(&controller).await?;
    print_overlay(&controller).await;
    Ok(())
}


async fn output(id: String, remote: Remote) -> Result<(), Error> {
    let controller = Controller::new(Client::new(remote.server), AutoConfirm(false));
    let task = lookup(&controller, &id).await?;

    controller.view_last_output(&task).await;
    print_overlay(&controller).await;
    Ok(())
}


async fn shell(remote: Remote) -> Result<(), Error> {
    let controller = Controller::new(Client::new(remote.server), Dialog);
    crate::shell::run(&controller, &Terminal::new()).await?;
    Ok(())
}
