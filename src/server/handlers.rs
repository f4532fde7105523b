use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::server::{Server, ServerError};
use crate::tasks::{CreateTask, Execution, Task};


#[derive(Debug, Deserialize)]
pub struct FindQuery {
    pub name: String,
}


pub async fn create_task(
    State(server): State<Arc<Server>>,
    body: Json<CreateTask>
) -> Result<Json<Task>, ServerError> {
    for (field, value) in [
        ("name", &body.name),
        ("owner", &body.owner),
        ("command", &body.command),
    ] {
        if value.trim().is_empty() {
            return Err(ServerError::InvalidTask(format!("{} is required", field)));
        }
    }

    let task = Task {
        id: Some(Uuid::new_v4().to_string()),
        name: body.name.clone(),
        owner: body.owner.clone(),
        command: body.command.clone(),
        task_executions: vec![],
    };

    info!("created task {:?} ({})", task.id, task.name);
    server.tasks.lock().await.push(task.clone());
    Ok(Json(task))
}


pub async fn list_tasks(State(server): State<Arc<Server>>) -> Json<Vec<Task>> {
    Json(server.tasks.lock().await.clone())
}


pub async fn find_tasks(
    State(server): State<Arc<Server>>,
    Query(query): Query<FindQuery>
) -> Result<Json<Vec<Task>>, ServerError> {
    let tasks: Vec<Task> = server.tasks.lock().await
        .iter()
        .filter(|task| task.name.contains(&query.name))
        .cloned()
        .collect();

    if tasks.is_empty() {
        return Err(ServerError::NoTasksFound(query.name));
    }

    Ok(Json(tasks))
}


pub async fn delete_task(
    State(server): State<Arc<Server>>,
    Path(task_id): Path<String>
) -> Result<StatusCode, ServerError> {
    let mut tasks = server.tasks.lock().await;
    match tasks.iter().position(|task| task.id.as_deref() == Some(task_id.as_str())) {
        Some(index) => {
            tasks.remove(index);
            info!("deleted task {}", task_id);
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(ServerError::TaskNotFound(task_id)),
    }
}


pub async fn run_task(
    State(server): State<Arc<Server>>,
    Path(task_id): Path<String>
) -> Result<Json<Execution>, ServerError> {
    Ok(Json(crate::server::run::run_task(server, task_id).await?))
}
