//! Error types for ragkit-index.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for ragkit-index operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in ragkit-index operations.
#[derive(Error, Debug)]
pub enum Error {
    /// One or both persisted artifacts are missing.
    #[error("Index not found at {0}")]
    IndexNotFound(PathBuf),

    /// Dimension mismatch between a vector and the index.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions.
        expected: usize,
        /// Actual dimensions provided.
        actual: usize,
    },

    /// The index was built by a different embedding model than the active one.
    #[error("Embedder mismatch: index built with '{actual}', active embedder is '{expected}'")]
    EmbedderMismatch {
        /// Identifier of the active embedder.
        expected: String,
        /// Identifier recorded in the index.
        actual: String,
    },

    /// Invalid vector (e.g., empty, contains NaN).
    #[error("Invalid vector: {0}")]
    InvalidVector(String),

    /// Index rows and chunk texts do not line up.
    #[error("Index and chunk texts are misaligned: {0}")]
    Misaligned(String),

    /// Persistence error (serialization, unsupported format, etc.).
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
