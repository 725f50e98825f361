use crate::{
    types::{ErrorResponse, QueryRequest, QueryResponse, Result},
    AppState,
};
use axum::{extract::State, Json};

/// Retrieve the top-k chunks for a question and answer from them
#[utoipa::path(
    post,
    path = "/query",
    request_body = QueryRequest,
    responses(
        (status = 200, description = "Answer with ranked context", body = QueryResponse),
        (status = 400, description = "Empty question", body = ErrorResponse),
        (status = 503, description = "Index or embedder not loaded", body = ErrorResponse)
    ),
    tag = "rag"
)]
pub async fn query(
    State(state): State<AppState>,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<QueryResponse>> {
    let answer = state
        .orchestrator
        .query(&payload.question, payload.k)
        .await?;

    Ok(Json(QueryResponse {
        answer: answer.answer,
        context: answer.context,
    }))
}
