use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use agentflow_core::{AgentLog, Execution, Task, ToolUsage};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{AppError, ErrorResponse};
use crate::state::AppState;

pub const DEFAULT_LIST_LIMIT: i64 = 50;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateExecutionRequest {
    pub goal: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListExecutionsQuery {
    /// Maximum number of executions, newest first.
    pub limit: Option<i64>,
}

async fn require_execution(state: &AppState, id: Uuid) -> Result<Execution, AppError> {
    state
        .store()
        .get_execution(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Execution not found: {}", id)))
}

#[utoipa::path(
    post,
    path = "/api/executions",
    request_body = CreateExecutionRequest,
    responses(
        (status = 201, description = "Execution created and started", body = Execution),
        (status = 400, description = "Empty goal", body = ErrorResponse)
    ),
    tag = "executions"
)]
pub async fn create_execution(
    State(state): State<AppState>,
    Json(payload): Json<CreateExecutionRequest>,
) -> Result<(StatusCode, Json<Execution>), AppError> {
    if payload.goal.trim().is_empty() {
        return Err(AppError::BadRequest("Goal cannot be empty".to_string()));
    }

    let execution = state.orchestrator.submit(&payload.goal).await?;
    Ok((StatusCode::CREATED, Json(execution)))
}

#[utoipa::path(
    get,
    path = "/api/executions",
    params(ListExecutionsQuery),
    responses(
        (status = 200, description = "Recent executions", body = Vec<Execution>)
    ),
    tag = "executions"
)]
pub async fn list_executions(
    State(state): State<AppState>,
    Query(query): Query<ListExecutionsQuery>,
) -> Result<Json<Vec<Execution>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT).max(1);
    let executions = state.store().list_executions(limit).await?;
    Ok(Json(executions))
}

#[utoipa::path(
    get,
    path = "/api/executions/{id}",
    params(("id" = Uuid, Path, description = "Execution ID")),
    responses(
        (status = 200, description = "Execution", body = Execution),
        (status = 404, description = "Execution not found", body = ErrorResponse)
    ),
    tag = "executions"
)]
pub async fn get_execution(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Execution>, AppError> {
    Ok(Json(require_execution(&state, id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/executions/{id}",
    params(("id" = Uuid, Path, description = "Execution ID")),
    responses(
        (status = 204, description = "Execution and its records deleted"),
        (status = 404, description = "Execution not found", body = ErrorResponse)
    ),
    tag = "executions"
)]
pub async fn delete_execution(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.store().delete_execution(id).await? {
        tracing::info!(execution_id = %id, "Execution deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Execution not found: {}", id)))
    }
}

#[utoipa::path(
    get,
    path = "/api/executions/{id}/tasks",
    params(("id" = Uuid, Path, description = "Execution ID")),
    responses(
        (status = 200, description = "Tasks in plan order", body = Vec<Task>),
        (status = 404, description = "Execution not found", body = ErrorResponse)
    ),
    tag = "executions"
)]
pub async fn list_execution_tasks(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Task>>, AppError> {
    require_execution(&state, id).await?;
    Ok(Json(state.store().list_tasks(id).await?))
}

#[utoipa::path(
    get,
    path = "/api/executions/{id}/logs",
    params(("id" = Uuid, Path, description = "Execution ID")),
    responses(
        (status = 200, description = "Agent logs in time order", body = Vec<AgentLog>),
        (status = 404, description = "Execution not found", body = ErrorResponse)
    ),
    tag = "executions"
)]
pub async fn list_execution_logs(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<AgentLog>>, AppError> {
    require_execution(&state, id).await?;
    Ok(Json(state.store().list_logs(id).await?))
}

#[utoipa::path(
    get,
    path = "/api/executions/{id}/tool-usage",
    params(("id" = Uuid, Path, description = "Execution ID")),
    responses(
        (status = 200, description = "Tool usage records", body = Vec<ToolUsage>),
        (status = 404, description = "Execution not found", body = ErrorResponse)
    ),
    tag = "executions"
)]
pub async fn list_execution_tool_usage(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ToolUsage>>, AppError> {
    require_execution(&state, id).await?;
    Ok(Json(state.store().list_tool_usage(id).await?))
}
