mod common;

use common::{setup_mock_server, task_json};
use jobman::{Client, CreateTask, TaskApi};
use reqwest::StatusCode;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_list_tasks() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            task_json("a", "deploy", 0),
            task_json("b", "build", 2),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::new(server.uri());
    let tasks = assert_ok!(client.list_tasks().await);
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[1].task_executions.len(), 2);
    assert_eq!(tasks[1].last_execution().unwrap().output, "run 1\n");
}

#[tokio::test]
async fn test_create_task_puts_empty_executions() {
    let server = setup_mock_server().await;
    Mock::given(method("PUT"))
        .and(path("/tasks"))
        .and(body_json(json!({
            "name": "t1",
            "owner": "alice",
            "command": "echo hi",
            "taskExecutions": [],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_json("new-id", "t1", 0)))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::new(format!("{}/", server.uri()));
    let request = CreateTask::new("t1".into(), "alice".into(), "echo hi".into());
    let task = assert_ok!(client.create_task(&request).await);
    assert_eq!(task.id.as_deref(), Some("new-id"));
}

#[tokio::test]
async fn test_find_sends_name_query() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/tasks/find"))
        .and(query_param("name", "deploy prod"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            task_json("a", "deploy prod", 0),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::new(server.uri());
    let tasks = assert_ok!(client.find_tasks_by_name("deploy prod").await);
    assert_eq!(tasks[0].name, "deploy prod");
}

#[tokio::test]
async fn test_find_not_found() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/tasks/find"))
        .respond_with(ResponseTemplate::new(404).set_body_string("No tasks found"))
        .mount(&server)
        .await;

    let client = Client::new(server.uri());
    let err = assert_err!(client.find_tasks_by_name("missing").await);
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_task() {
    let server = setup_mock_server().await;
    Mock::given(method("DELETE"))
        .and(path("/tasks/abc"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::new(server.uri());
    assert_ok!(client.delete_task("abc").await);
}

#[tokio::test]
async fn test_run_task() {
    let server = setup_mock_server().await;
    Mock::given(method("PUT"))
        .and(path("/tasks/abc/execution"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "startTime": "2025-01-01T10:00:00Z",
            "endTime": "2025-01-01T10:00:02Z",
            "output": "hi\n",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::new(server.uri());
    let execution = assert_ok!(client.run_task("abc").await);
    assert_eq!(execution.output, "hi\n");
    assert!(execution.end_time > execution.start_time);
}

#[tokio::test]
async fn test_error_carries_body() {
    let server = setup_mock_server().await;
    Mock::given(method("PUT"))
        .and(path("/tasks/abc/execution"))
        .respond_with(ResponseTemplate::new(500).set_body_string("pod failed to start"))
        .mount(&server)
        .await;

    let client = Client::new(server.uri());
    let err = assert_err!(client.run_task("abc").await);
    assert!(!err.is_not_found());
    match err {
        jobman::client::Error::Status { status, message } => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(message, "pod failed to start");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_error_body_uses_reason() {
    let server = setup_mock_server().await;
    Mock::given(method("DELETE"))
        .and(path("/tasks/abc"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = Client::new(server.uri());
    let err = assert_err!(client.delete_task("abc").await);
    assert_eq!(err.to_string(), "503 Service Unavailable: Service Unavailable");
}
