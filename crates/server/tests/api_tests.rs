use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use orchestrator::{AgentRegistry, ChatClient, LlmConfig};
use serde_json::{json, Value};
use server::{create_router, state::AppState};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// One JSON reply that every agent can read its own fields from.
fn agent_reply() -> Value {
    json!({
        "reasoning": "scripted",
        "tasks": [
            {"description": "Say hello", "agentType": "executor", "dependencies": []}
        ],
        "success": true,
        "result": {"greeting": "hello"},
        "insights": ["greeting delivered"],
        "summary": "Said hello",
        "conclusion": "Done"
    })
}

fn completion_body(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

async fn mock_llm(reply: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(reply)
        .mount(&server)
        .await;
    server
}

async fn setup_test_server_with(llm: &MockServer) -> (TestServer, TempDir, AppState) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_url = format!("sqlite:{}", temp_dir.path().join("test.db").display());

    let pool = db::create_pool(&db_url).await.expect("Failed to create pool");
    db::run_migrations(&pool).await.expect("Failed to run migrations");

    let client = ChatClient::new(LlmConfig {
        api_key: "test-key".to_string(),
        base_url: llm.uri(),
        ..LlmConfig::default()
    });
    let registry = AgentRegistry::standard(Arc::new(client));

    let state = AppState::from_pool(pool, registry);
    let app = create_router(state.clone());
    let server = TestServer::new(app).expect("Failed to create test server");

    (server, temp_dir, state)
}

async fn setup_test_server() -> (TestServer, TempDir, AppState, MockServer) {
    let llm = mock_llm(
        ResponseTemplate::new(200).set_body_json(completion_body(&agent_reply().to_string())),
    )
    .await;
    let (server, temp_dir, state) = setup_test_server_with(&llm).await;
    (server, temp_dir, state, llm)
}

async fn wait_for_terminal(server: &TestServer, id: &str) -> Value {
    for _ in 0..200 {
        let body: Value = server.get(&format!("/api/executions/{}", id)).await.json();
        if body["status"] == "completed" || body["status"] == "failed" {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("execution {} did not finish", id);
}

async fn create_execution(server: &TestServer, goal: &str) -> Value {
    let response = server
        .post("/api/executions")
        .json(&json!({ "goal": goal }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

mod health {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoint() {
        let (server, _temp_dir, _state, _llm) = setup_test_server().await;

        let response = server.get("/health").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["subscribers"], 0);
    }

    #[tokio::test]
    async fn test_openapi_document() {
        let (server, _temp_dir, _state, _llm) = setup_test_server().await;

        let body: Value = server.get("/api/openapi.json").await.json();
        assert!(body["paths"]["/api/executions"].is_object());
        assert!(body["paths"]["/api/tasks/{id}/cancel"].is_object());
        assert!(body["components"]["schemas"]["Execution"].is_object());
    }
}

mod executions {
    use super::*;

    #[tokio::test]
    async fn test_create_execution_returns_pending() {
        let (server, _temp_dir, _state, _llm) = setup_test_server().await;

        let body = create_execution(&server, "Greet the world").await;

        assert_eq!(body["goal"], "Greet the world");
        assert_eq!(body["status"], "pending");
        assert!(body["id"].is_string());
        assert!(body["completedAt"].is_null());
    }

    #[tokio::test]
    async fn test_execution_runs_to_completion() {
        let (server, _temp_dir, _state, _llm) = setup_test_server().await;

        let created = create_execution(&server, "Greet the world").await;
        let id = created["id"].as_str().unwrap();

        let finished = wait_for_terminal(&server, id).await;
        assert_eq!(finished["status"], "completed");
        assert_eq!(finished["result"]["summary"], "Said hello");
        assert!(finished["completedAt"].is_string());

        let tasks: Value = server
            .get(&format!("/api/executions/{}/tasks", id))
            .await
            .json();
        assert_eq!(tasks.as_array().unwrap().len(), 1);
        assert_eq!(tasks[0]["agentType"], "executor");
        assert_eq!(tasks[0]["status"], "completed");
        assert_eq!(tasks[0]["order"], 0);
        assert_eq!(tasks[0]["result"], json!({"greeting": "hello"}));

        let logs: Value = server
            .get(&format!("/api/executions/{}/logs", id))
            .await
            .json();
        let actions: Vec<&str> = logs
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["action"].as_str().unwrap())
            .collect();
        assert_eq!(
            actions,
            vec![
                "Starting execution planning",
                "Created execution plan",
                "Executing: Say hello",
                "Completed: Say hello",
                "Final analysis completed",
            ]
        );

        let usage: Value = server
            .get(&format!("/api/executions/{}/tool-usage", id))
            .await
            .json();
        assert_eq!(usage[0]["toolName"], "execution_engine");
        assert_eq!(usage[0]["success"], true);
    }

    #[tokio::test]
    async fn test_llm_failure_fails_execution() {
        let llm = mock_llm(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"message": "bad request", "type": "invalid_request_error"}
        })))
        .await;
        let (server, _temp_dir, _state) = setup_test_server_with(&llm).await;

        let created = create_execution(&server, "Greet the world").await;
        let finished = wait_for_terminal(&server, created["id"].as_str().unwrap()).await;

        assert_eq!(finished["status"], "failed");
        assert!(finished["error"]
            .as_str()
            .unwrap()
            .starts_with("Planning failed"));
        assert!(finished["result"].is_null());
    }

    #[tokio::test]
    async fn test_list_executions_newest_first() {
        let (server, _temp_dir, _state, _llm) = setup_test_server().await;

        let first = create_execution(&server, "First goal").await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = create_execution(&server, "Second goal").await;

        let body: Value = server.get("/api/executions").await.json();
        let list = body.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["id"], second["id"]);
        assert_eq!(list[1]["id"], first["id"]);

        let limited: Value = server
            .get("/api/executions")
            .add_query_param("limit", 1)
            .await
            .json();
        assert_eq!(limited.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_execution() {
        let (server, _temp_dir, _state, _llm) = setup_test_server().await;

        let created = create_execution(&server, "Greet the world").await;
        let id = created["id"].as_str().unwrap();
        wait_for_terminal(&server, id).await;

        server
            .delete(&format!("/api/executions/{}", id))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .get(&format!("/api/executions/{}", id))
            .await
            .assert_status_not_found();
        server
            .delete(&format!("/api/executions/{}", id))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_analytics_after_run() {
        let (server, _temp_dir, _state, _llm) = setup_test_server().await;

        let created = create_execution(&server, "Greet the world").await;
        wait_for_terminal(&server, created["id"].as_str().unwrap()).await;

        let body: Value = server.get("/api/analytics").await.json();
        assert_eq!(body["totalExecutions"], 1);
        assert_eq!(body["successfulExecutions"], 1);
        assert_eq!(body["failedExecutions"], 0);
        assert_eq!(body["agentPerformance"]["executor"]["tasksCompleted"], 1);
        assert_eq!(body["agentPerformance"]["executor"]["successRate"], 100.0);
        assert_eq!(body["agentPerformance"]["coder"]["tasksCompleted"], 0);
        assert_eq!(body["toolUsageStats"]["execution_engine"]["count"], 1);
    }
}

mod tasks {
    use super::*;
    use agentflow_core::{AgentType, Execution, Task};

    #[tokio::test]
    async fn test_cancel_pending_task() {
        let (server, _temp_dir, state, _llm) = setup_test_server().await;
        let execution = state
            .store()
            .create_execution(&Execution::new("Manual"))
            .await
            .unwrap();
        let task = state
            .store()
            .create_task(&Task::new(execution.id, AgentType::Coder, "Write code", 0))
            .await
            .unwrap();
        let mut rx = state.event_bus.subscribe();

        let response = server.post(&format!("/api/tasks/{}/cancel", task.id)).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "cancelled");
        assert!(body["completedAt"].is_string());

        let envelope = rx.try_recv().unwrap();
        assert_eq!(envelope.event.event_type(), "task_update");

        let again = server.post(&format!("/api/tasks/{}/cancel", task.id)).await;
        again.assert_status(StatusCode::CONFLICT);
        let body: Value = again.json();
        assert_eq!(body["error"], "conflict");
    }
}

mod validation {
    use super::*;

    #[tokio::test]
    async fn test_create_execution_with_empty_goal_fails() {
        let (server, _temp_dir, _state, _llm) = setup_test_server().await;

        let response = server
            .post("/api/executions")
            .json(&json!({ "goal": "   " }))
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["error"], "bad_request");

        let list: Value = server.get("/api/executions").await.json();
        assert!(list.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_unknown_execution_returns_404() {
        let (server, _temp_dir, _state, _llm) = setup_test_server().await;

        let response = server
            .get(&format!("/api/executions/{}", uuid::Uuid::new_v4()))
            .await;

        response.assert_status_not_found();
        let body: Value = response.json();
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_logs_of_unknown_execution_return_404() {
        let (server, _temp_dir, _state, _llm) = setup_test_server().await;

        server
            .get(&format!("/api/executions/{}/logs", uuid::Uuid::new_v4()))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_cancel_unknown_task_returns_404() {
        let (server, _temp_dir, _state, _llm) = setup_test_server().await;

        server
            .post(&format!("/api/tasks/{}/cancel", uuid::Uuid::new_v4()))
            .await
            .assert_status_not_found();
    }
}
