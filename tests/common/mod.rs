//! Shared test helpers.

#![allow(dead_code)]

pub mod mocks;

use ragkit::rag::generator::Generator;
use ragkit::rag::index_builder::IndexBuilder;
use ragkit::{Embedder, GenerationParams, HashEmbedder, LLMClient, QueryOrchestrator, Retriever};
use std::sync::Arc;

/// Dimension used by every test embedder.
pub const TEST_DIMENSIONS: usize = 128;

pub fn hash_embedder() -> Arc<dyn Embedder> {
    Arc::new(HashEmbedder::new(TEST_DIMENSIONS).expect("hash embedder"))
}

/// In-memory retriever over `texts`, embedded with [`hash_embedder`].
pub fn retriever_for(texts: &[&str]) -> Retriever {
    let built = IndexBuilder::new(hash_embedder())
        .build(texts.iter().map(|t| t.to_string()).collect())
        .expect("build index");
    Retriever::from_parts(built.index, built.texts).expect("aligned parts")
}

/// Orchestrator with a loaded index and embedder, and the given generator client.
pub fn orchestrator_for(texts: &[&str], client: Option<Box<dyn LLMClient>>) -> QueryOrchestrator {
    let generator = client.map(|c| Generator::new(c, GenerationParams::default()));
    QueryOrchestrator::new(Some(retriever_for(texts)), Some(hash_embedder()), generator)
}
