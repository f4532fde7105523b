use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

use crate::tasks::{CreateTask, Execution, Task};


#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Status { status: StatusCode, message: String },
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Status { status, .. } => *status == StatusCode::NOT_FOUND,
            Error::Reqwest(err) => err.status() == Some(StatusCode::NOT_FOUND),
        }
    }
}


/// The five calls the view layer makes against the `tasks` resource.
#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn list_tasks(&self) -> Result<Vec<Task>, Error>;
    async fn create_task(&self, task: &CreateTask) -> Result<Task, Error>;
    async fn find_tasks_by_name(&self, name: &str) -> Result<Vec<Task>, Error>;
    async fn delete_task(&self, id: &str) -> Result<(), Error>;
    async fn run_task(&self, id: &str) -> Result<Execution, Error>;
}


#[derive(Clone, Debug)]
pub struct Client {
    reqwest: reqwest::Client,
    server: String,
}

impl Client {
    pub fn new(server: String) -> Self {
        Self {
            reqwest: reqwest::Client::new(),
            server: server.trim_end_matches('/').to_string(),
        }
    }

    pub fn server(&self) -> &str {
        &self.server
    }
}

#[async_trait]
impl TaskApi for Client {
    async fn list_tasks(&self) -> Result<Vec<Task>, Error> {
        debug!("GET {}/tasks", self.server);
        let response = self.reqwest
            .get(format!("{}/tasks", self.server))
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    async fn create_task(&self, task: &CreateTask) -> Result<Task, Error> {
        debug!("PUT {}/tasks name={:?}", self.server, task.name);
        let response = self.reqwest
            .put(format!("{}/tasks", self.server))
            .json(task)
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    async fn find_tasks_by_name(&self, name: &str) -> Result<Vec<Task>, Error> {
        debug!("GET {}/tasks/find name={:?}", self.server, name);
        let response = self.reqwest
            .get(format!("{}/tasks/find", self.server))
            .query(&[("name", name)])
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    async fn delete_task(&self, id: &str) -> Result<(), Error> {
        debug!("DELETE {}/tasks/{}", self.server, id);
        let response = self.reqwest
            .delete(format!("{}/tasks/{}", self.server, id))
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    async fn run_task(&self, id: &str) -> Result<Execution, Error> {
        debug!("PUT {}/tasks/{}/execution", self.server, id);
        let response = self.reqwest
            .put(format!("{}/tasks/{}/execution", self.server, id))
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }
}


async fn check(response: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match body.trim() {
        "" => status.canonical_reason().unwrap_or("request failed").to_string(),
        text => text.to_string(),
    };

    Err(Error::Status { status, message })
}
