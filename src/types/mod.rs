use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============= API Request/Response Types =============

/// A question to answer from the index.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QueryRequest {
    pub question: String,
    /// Number of chunks to retrieve. Falls back to `[rag].default_top_k` (5).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<i64>,
}

/// One retrieved chunk. Rank 1 is the best match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RetrievedChunk {
    pub rank: usize,
    pub score: f32,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QueryResponse {
    pub answer: String,
    pub context: Vec<RetrievedChunk>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub index_loaded: bool,
    pub chunks: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No .txt files found under {0}")]
    NoInputFiles(String),

    #[error("No input chunks: {0}")]
    NoInputChunks(String),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Index not found: {0}")]
    IndexNotFound(String),

    #[error("Index not loaded. Build it first.")]
    IndexNotLoaded,

    #[error("Embedding model not loaded. Check the [embedding] configuration and restart the service.")]
    EmbedderNotLoaded,

    #[error("Generation failed: {0}")]
    GenerationFailure(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ragkit_index::Error> for AppError {
    fn from(err: ragkit_index::Error) -> Self {
        match err {
            ragkit_index::Error::IndexNotFound(path) => {
                AppError::IndexNotFound(path.display().to_string())
            }
            ragkit_index::Error::Io(e) => AppError::Io(e),
            other => AppError::Internal(format!("Index error: {}", other)),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let status = match &self {
            AppError::IndexNotLoaded
            | AppError::EmbedderNotLoaded
            | AppError::IndexNotFound(_)
            | AppError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_request_k_is_optional() {
        let req: QueryRequest = serde_json::from_str(r#"{"question": "Where?"}"#).unwrap();
        assert_eq!(req.question, "Where?");
        assert_eq!(req.k, None);

        let req: QueryRequest = serde_json::from_str(r#"{"question": "Where?", "k": -2}"#).unwrap();
        assert_eq!(req.k, Some(-2));
    }

    #[test]
    fn test_index_errors_convert() {
        let err: AppError =
            ragkit_index::Error::IndexNotFound(std::path::PathBuf::from("models/index")).into();
        assert!(matches!(err, AppError::IndexNotFound(ref p) if p == "models/index"));

        let err: AppError = ragkit_index::Error::Misaligned("2 vs 3".into()).into();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
