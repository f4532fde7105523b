//! Shared fixtures for the integration tests.

use std::sync::Arc;

use jobman::Server;
use serde_json::{json, Value};
use wiremock::MockServer;

/// Starts a mock HTTP server.
#[allow(dead_code)]
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Starts the in-memory tasks backend on an ephemeral port and returns its base URL.
#[allow(dead_code)]
pub async fn start_backend() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(jobman::serve(Arc::new(Server::new()), listener));
    format!("http://{}", addr)
}

/// A task as the backend would return it.
#[allow(dead_code)]
pub fn task_json(id: &str, name: &str, executions: usize) -> Value {
    let executions: Vec<Value> = (0..executions)
        .map(|n| json!({
            "startTime": "2025-01-01T10:00:00Z",
            "endTime": "2025-01-01T10:00:01Z",
            "output": format!("run {}\n", n),
        }))
        .collect();

    json!({
        "id": id,
        "name": name,
        "owner": "alice",
        "command": "echo hi",
        "taskExecutions": executions,
    })
}
