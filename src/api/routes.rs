use crate::AppState;
use crate::api::handlers::{health, query};
use axum::{
    Json, Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(health::health, query::query),
    components(schemas(
        crate::types::QueryRequest,
        crate::types::QueryResponse,
        crate::types::RetrievedChunk,
        crate::types::HealthResponse,
        crate::types::ErrorResponse
    )),
    tags(
        (name = "system", description = "Service status"),
        (name = "rag", description = "Retrieval-augmented question answering")
    ),
    info(title = "ragkit", description = "Minimal retrieval-augmented generation service")
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Full application router with tracing and CORS layers applied.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/query", post(query::query))
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
