//! HTTP API tests over the full router.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use common::mocks::MockLLMClient;
use common::{hash_embedder, orchestrator_for};
use ragkit::api::create_router;
use ragkit::rag::orchestrator::CONTEXT_ONLY_ANSWER;
use ragkit::types::{ErrorResponse, HealthResponse, QueryResponse};
use ragkit::{AppState, QueryOrchestrator};
use serde_json::json;

const DOCS: [&str; 3] = [
    "The cat sat on the mat.",
    "The dog ran in the park.",
    "Quarterly earnings beat analyst expectations.",
];

fn server(orchestrator: QueryOrchestrator) -> TestServer {
    let state = AppState::new(orchestrator);
    TestServer::new(create_router(state)).unwrap()
}

#[tokio::test]
async fn test_health_with_index() {
    let server = server(orchestrator_for(&DOCS, None));

    let response = server.get("/health").await;
    response.assert_status_ok();
    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert!(health.index_loaded);
    assert_eq!(health.chunks, 3);
}

#[tokio::test]
async fn test_health_without_index() {
    let server = server(QueryOrchestrator::new(None, Some(hash_embedder()), None));

    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_json(&json!({"status": "ok", "index_loaded": false, "chunks": 0}));
}

#[tokio::test]
async fn test_query_context_only() {
    let server = server(orchestrator_for(&DOCS, None));

    let response = server
        .post("/query")
        .json(&json!({"question": "Where did the cat sit?", "k": 2}))
        .await;
    response.assert_status_ok();

    let body: QueryResponse = response.json();
    assert_eq!(body.answer, CONTEXT_ONLY_ANSWER);
    assert_eq!(body.context.len(), 2);
    assert_eq!(body.context[0].rank, 1);
    assert_eq!(body.context[0].text, "The cat sat on the mat.");
    assert!(body.context[0].score >= body.context[1].score);
}

#[tokio::test]
async fn test_query_default_k_is_clamped() {
    let server = server(orchestrator_for(&DOCS, None));

    let response = server.post("/query").json(&json!({"question": "cat"})).await;
    response.assert_status_ok();
    let body: QueryResponse = response.json();
    assert_eq!(body.context.len(), 3);
}

#[tokio::test]
async fn test_query_with_generator() {
    let client = MockLLMClient::new("It sat on the mat.");
    let server = server(orchestrator_for(&DOCS, Some(Box::new(client))));

    let response = server
        .post("/query")
        .json(&json!({"question": "Where did the cat sit?", "k": 1}))
        .await;
    response.assert_status_ok();
    let body: QueryResponse = response.json();
    assert_eq!(body.answer, "It sat on the mat.");
    assert_eq!(body.context.len(), 1);
}

#[tokio::test]
async fn test_query_generator_failure_still_200() {
    let server = server(orchestrator_for(&DOCS, Some(Box::new(MockLLMClient::failing()))));

    let response = server
        .post("/query")
        .json(&json!({"question": "Where did the cat sit?"}))
        .await;
    response.assert_status_ok();
    let body: QueryResponse = response.json();
    assert!(body.answer.starts_with("Generator error:"));
    assert!(!body.context.is_empty());
}

#[tokio::test]
async fn test_query_without_index_is_503() {
    let server = server(QueryOrchestrator::new(None, Some(hash_embedder()), None));

    let response = server
        .post("/query")
        .json(&json!({"question": "Where did the cat sit?"}))
        .await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: ErrorResponse = response.json();
    assert_eq!(body.error, "Index not loaded. Build it first.");
}

#[tokio::test]
async fn test_query_without_embedder_is_503() {
    let retriever = common::retriever_for(&DOCS);
    let server = server(QueryOrchestrator::new(Some(retriever), None, None));

    let response = server.post("/query").json(&json!({"question": "cat"})).await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: ErrorResponse = response.json();
    assert!(body.error.contains("Embedding model not loaded"));
}

#[tokio::test]
async fn test_empty_question_is_400() {
    let server = server(orchestrator_for(&DOCS, None));

    let response = server.post("/query").json(&json!({"question": "  "})).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_zero_k_returns_empty_context() {
    let server = server(orchestrator_for(&DOCS, None));

    let response = server
        .post("/query")
        .json(&json!({"question": "cat", "k": 0}))
        .await;
    response.assert_status_ok();
    let body: QueryResponse = response.json();
    assert!(body.context.is_empty());
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let server = server(orchestrator_for(&DOCS, None));

    let response = server.get("/api-docs/openapi.json").await;
    response.assert_status_ok();
    let doc: serde_json::Value = response.json();
    assert!(doc["paths"]["/health"].is_object());
    assert!(doc["paths"]["/query"].is_object());
}
