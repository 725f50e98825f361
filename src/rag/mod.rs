//! Retrieval Augmented Generation (RAG) Pipeline
//!
//! # Module Structure
//!
//! - [`chunker`] - whitespace cleaning and greedy word-bounded chunking
//! - [`ingest`] - raw `*.txt` tree to processed chunk files
//! - [`embeddings`] - the [`Embedder`](embeddings::Embedder) trait plus hash and fastembed backends
//! - [`index_builder`] - embeds chunks and persists the index pair
//! - [`retriever`] - top-k search over a loaded index pair
//! - [`generator`] - context-constrained answer generation
//! - [`orchestrator`] - per-request embed → retrieve → generate flow
//!
//! # RAG Pipeline
//!
//! 1. **Ingestion** - raw text is cleaned and chunked (`ragkit ingest`)
//! 2. **Build** - chunks are embedded into a flat index saved with their texts (`ragkit build`)
//! 3. **Retrieval** - the query is embedded and the nearest chunks are returned
//! 4. **Generation** - an LLM answers from those chunks only
//!
//! # Example
//!
//! ```ignore
//! use ragkit::rag::{embeddings::HashEmbedder, index_builder::IndexBuilder, retriever::Retriever};
//!
//! let embedder = Arc::new(HashEmbedder::new(384)?);
//! let built = IndexBuilder::new(embedder.clone()).build(chunks)?;
//! built.persist(Path::new("models/index")).await?;
//!
//! let retriever = Retriever::load(Path::new("models/index"), Some(384)).await?;
//! let results = retriever.search(&embedder.embed("Where did the cat sit?")?, 5)?;
//! ```

pub mod chunker;
pub mod embeddings;
pub mod generator;
pub mod index_builder;
pub mod ingest;
pub mod orchestrator;
pub mod retriever;
