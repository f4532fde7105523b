use axum::routing::{delete, get, put};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::tasks::Task;

mod handlers;
mod run;


/// In-memory backend for the `tasks` resource, kept in insertion order.
pub struct Server {
    pub tasks: Mutex<Vec<Task>>,
}

impl Server {
    pub fn new() -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
        }
    }
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}


#[derive(Debug)]
pub enum ServerError {
    TaskNotFound(String),
    NoTasksFound(String),
    InvalidTask(String),
    InternalServerError(String),
}

impl axum::response::IntoResponse for ServerError {
    fn into_response(self) -> axum::http::Response<axum::body::Body> {
        match self {
            ServerError::TaskNotFound(id) => {
                (
                    axum::http::StatusCode::NOT_FOUND,
                    format!("Task not found: {}", id)
                ).into_response()
            }
            ServerError::NoTasksFound(name) => {
                (
                    axum::http::StatusCode::NOT_FOUND,
                    format!("No tasks found with name containing: {}", name)
                ).into_response()
            }
            ServerError::InvalidTask(reason) => {
                (
                    axum::http::StatusCode::BAD_REQUEST,
                    format!("Invalid task: {}", reason)
                ).into_response()
            }
            ServerError::InternalServerError(reason) => {
                (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    reason
                ).into_response()
            }
        }
    }
}


pub fn router(server: Arc<Server>) -> axum::Router {
    axum::Router::new()
        .route("/tasks", get(handlers::list_tasks).put(handlers::create_task))
        .route("/tasks/find", get(handlers::find_tasks))
        .route("/tasks/:task_id", delete(handlers::delete_task))
        .route("/tasks/:task_id/execution", put(handlers::run_task))
        .with_state(server)
}


pub async fn serve(
    server: Arc<Server>,
    listener: tokio::net::TcpListener
) -> Result<(), std::io::Error> {
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(server)).await
}
