//! API request handlers.

/// Liveness and index status.
pub mod health;
/// Question answering over the loaded index.
pub mod query;
