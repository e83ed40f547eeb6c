use axum::extract::State;
use axum::Json;
use agentflow_core::Analytics;

use crate::error::AppError;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/analytics",
    responses(
        (status = 200, description = "Aggregated execution, agent and tool statistics", body = Analytics)
    ),
    tag = "analytics"
)]
pub async fn get_analytics(State(state): State<AppState>) -> Result<Json<Analytics>, AppError> {
    Ok(Json(state.store().get_analytics().await?))
}
