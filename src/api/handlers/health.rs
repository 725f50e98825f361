use crate::{types::HealthResponse, AppState};
use axum::{extract::State, Json};

/// Report whether the index is loaded and how many chunks it holds
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(state.orchestrator.health())
}
