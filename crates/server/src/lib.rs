//! HTTP and WebSocket surface of the execution orchestrator.

pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use websocket::WsState;

use state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "agentflow API",
        version = "0.1.0",
        description = "Submit goals to the agent pipeline and inspect executions"
    ),
    paths(
        routes::health_check,
        routes::create_execution,
        routes::list_executions,
        routes::get_execution,
        routes::delete_execution,
        routes::list_execution_tasks,
        routes::list_execution_logs,
        routes::list_execution_tool_usage,
        routes::cancel_task,
        routes::get_analytics,
    ),
    components(schemas(
        routes::HealthResponse,
        routes::CreateExecutionRequest,
        error::ErrorResponse,
        agentflow_core::Execution,
        agentflow_core::ExecutionStatus,
        agentflow_core::Task,
        agentflow_core::TaskStatus,
        agentflow_core::AgentType,
        agentflow_core::AgentLog,
        agentflow_core::LogLevel,
        agentflow_core::ToolUsage,
        agentflow_core::Analytics,
        agentflow_core::AgentPerformance,
        agentflow_core::ToolStats,
        events::ExecutionUpdate,
        events::AgentPerformanceUpdate,
    )),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "executions", description = "Goal submission and execution inspection"),
        (name = "tasks", description = "Administrative task control"),
        (name = "analytics", description = "Aggregated statistics"),
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn create_router(state: AppState) -> Router {
    let ws_router = Router::new()
        .route("/ws", get(websocket::ws_handler))
        .with_state(Arc::new(WsState::new(state.event_bus.clone())));

    Router::new()
        .route("/health", get(routes::health_check))
        .route("/api/openapi.json", get(openapi_json))
        .route(
            "/api/executions",
            get(routes::list_executions).post(routes::create_execution),
        )
        .route(
            "/api/executions/{id}",
            get(routes::get_execution).delete(routes::delete_execution),
        )
        .route(
            "/api/executions/{id}/tasks",
            get(routes::list_execution_tasks),
        )
        .route("/api/executions/{id}/logs", get(routes::list_execution_logs))
        .route(
            "/api/executions/{id}/tool-usage",
            get(routes::list_execution_tool_usage),
        )
        .route("/api/tasks/{id}/cancel", post(routes::cancel_task))
        .route("/api/analytics", get(routes::get_analytics))
        .with_state(state)
        .merge(ws_router)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
