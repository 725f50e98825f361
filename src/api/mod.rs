//! HTTP API Handlers and Routes
//!
//! A thin axum layer over [`QueryOrchestrator`](crate::rag::orchestrator::QueryOrchestrator).
//!
//! # API Endpoints
//!
//! - `GET /health` - `{status, index_loaded, chunks}`
//! - `POST /query` - `{question, k?}` → `{answer, context}`, or `{error}` with 400/503
//! - `GET /api-docs/openapi.json` - OpenAPI document

/// Request handlers for each endpoint.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

pub use routes::{create_router, ApiDoc};
