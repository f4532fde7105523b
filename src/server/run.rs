use std::sync::Arc;
use tracing::{info, warn};

use crate::process::Process;
use crate::server::{Server, ServerError};
use crate::tasks::Execution;


pub async fn run_task(
    server: Arc<Server>,
    task_id: String
) -> Result<Execution, ServerError> {
    // Avoid holding the lock while the command runs
    let command = match server.tasks.lock().await
        .iter()
        .find(|task| task.id.as_deref() == Some(task_id.as_str()))
    {
        Some(task) => task.command.clone(),
        None => {
            return Err(ServerError::TaskNotFound(task_id));
        }
    };

    info!("running task {}: {}", task_id, command);
    let execution = match Arc::new(Process::new()).run(&command).await {
        Ok(execution) => execution,
        Err(err) => {
            warn!("task {} failed to start: {}", task_id, err);
            return Err(ServerError::InternalServerError(err.to_string()));
        }
    };

    match server.tasks.lock().await
        .iter_mut()
        .find(|task| task.id.as_deref() == Some(task_id.as_str()))
    {
        Some(task) => {
            task.task_executions.push(execution.clone());
        }
        None => {
            warn!("task {} was deleted while running", task_id);
        }
    }

    Ok(execution)
}
