//! # ragkit
//!
//! A minimal retrieval-augmented generation pipeline: plain-text documents are
//! cleaned and chunked, chunks are embedded into a flat inner-product index, and
//! questions are answered by a text generator constrained to the retrieved chunks.
//!
//! ## Overview
//!
//! ragkit can be used in two ways:
//!
//! 1. **As a CLI and server** - run the `ragkit` binary (`ingest`, `build`, `query`, `serve`)
//! 2. **As a library** - assemble the pipeline pieces in your own program
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use ragkit::{QueryOrchestrator, RagkitConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = RagkitConfig::load_or_default("ragkit.toml")?;
//!     let orchestrator = QueryOrchestrator::bootstrap(&config).await;
//!
//!     let answer = orchestrator.query("Where did the cat sit?", Some(5)).await?;
//!     println!("{}", answer.answer);
//!     for chunk in answer.context {
//!         println!("#{} {:.3} {}", chunk.rank, chunk.score, chunk.text);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Ollama generation backend (default) |
//! | `openai` | OpenAI-compatible generation backend |
//! | `local-embeddings` | fastembed ONNX sentence embeddings |
//! | `full` | All of the above |
//!
//! ## Index Format
//!
//! See [`ragkit_index`]: an index directory holds `index.bin` and `texts.json`,
//! tied together by a row count and a checksum so mismatched pairs fail to load.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
#[allow(missing_docs)]
pub mod api;
/// Command-line parsing and terminal output.
#[allow(missing_docs)]
pub mod cli;
/// LLM provider clients and abstractions.
#[allow(missing_docs)]
pub mod llm;
/// Chunking, embedding, indexing, retrieval and generation.
#[allow(missing_docs)]
pub mod rag;
/// Core types (requests, responses, errors).
#[allow(missing_docs)]
pub mod types;
/// Configuration utilities (TOML).
#[allow(missing_docs)]
pub mod utils;

// Re-export commonly used types
pub use llm::{GenerationParams, LLMClient, Provider};
pub use rag::embeddings::{Embedder, HashEmbedder};
pub use rag::orchestrator::{QueryAnswer, QueryOrchestrator, QueryOutcome};
pub use rag::retriever::Retriever;
pub use types::{AppError, Result};
pub use utils::toml_config::RagkitConfig;

use std::sync::Arc;

/// Application state shared across handlers
///
/// Built once at startup and never mutated; cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    /// Query pipeline with whichever capabilities loaded
    pub orchestrator: Arc<QueryOrchestrator>,
}

impl AppState {
    /// Wrap an orchestrator for sharing across requests
    pub fn new(orchestrator: QueryOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}
