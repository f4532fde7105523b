use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};


#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    pub name: String,
    pub owner: String,
    pub command: String,
    #[serde(default)]
    pub task_executions: Vec<Execution>,
}

impl CreateTask {
    pub fn new(name: String, owner: String, command: String) -> Self {
        Self {
            name,
            owner,
            command,
            task_executions: vec![],
        }
    }
}


#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub owner: String,
    pub command: String,
    #[serde(default)]
    pub task_executions: Vec<Execution>,
}

impl Task {
    pub fn last_execution(&self) -> Option<&Execution> {
        self.task_executions.last()
    }
}


#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub output: String,
}
