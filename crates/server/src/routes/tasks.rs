use axum::extract::{Path, State};
use axum::Json;
use agentflow_core::Task;
use orchestrator::OrchestratorError;
use uuid::Uuid;

use crate::error::{AppError, ErrorResponse};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/tasks/{id}/cancel",
    params(("id" = Uuid, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task cancelled", body = Task),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 409, description = "Task already finished", body = ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn cancel_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>, AppError> {
    match state.orchestrator.cancel_task(id).await {
        Ok(task) => Ok(Json(task)),
        Err(OrchestratorError::InvalidTransition { from, .. }) => Err(AppError::Conflict(
            format!("Task {} is already {}", id, from),
        )),
        Err(e) if e.is_not_found() => Err(AppError::NotFound(format!("Task not found: {}", id))),
        Err(e) => Err(e.into()),
    }
}
