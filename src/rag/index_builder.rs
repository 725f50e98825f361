//! Embeds chunks into a flat inner-product index and persists the pair.

use crate::rag::embeddings::Embedder;
use crate::rag::ingest::load_processed_chunks;
use crate::types::{AppError, Result};
use crate::utils::toml_config::RagkitConfig;
use ragkit_index::{DistanceMetric, FlatIndex, IndexStore};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

const DEFAULT_BATCH_SIZE: usize = 32;

/// An index whose row `i` is the embedding of `texts[i]`.
#[derive(Debug, Clone)]
pub struct BuiltIndex {
    pub index: FlatIndex,
    pub texts: Vec<String>,
    pub embedder_id: String,
}

impl BuiltIndex {
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Replace the index pair in `dir`. The previous pair survives a failed write.
    pub async fn persist(&self, dir: &Path) -> Result<()> {
        IndexStore::save(dir, &self.index, &self.texts, &self.embedder_id).await?;
        info!(dir = ?dir, chunks = self.len(), "Index persisted");
        Ok(())
    }
}

pub struct IndexBuilder {
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
}

impl IndexBuilder {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Embed every chunk in order. Empty input is an error, never an empty index.
    pub fn build(&self, chunks: Vec<String>) -> Result<BuiltIndex> {
        if chunks.is_empty() {
            return Err(AppError::NoInputChunks(
                "no chunks to embed; run ingestion first".to_string(),
            ));
        }

        let started = Instant::now();
        let mut index = FlatIndex::new(self.embedder.dimensions(), DistanceMetric::DotProduct)?;

        for batch in chunks.chunks(self.batch_size) {
            let vectors = self.embedder.embed_batch(batch)?;
            if vectors.len() != batch.len() {
                return Err(AppError::Embedding(format!(
                    "embedder returned {} vectors for {} chunks",
                    vectors.len(),
                    batch.len()
                )));
            }
            index.add_batch(vectors.as_slice())?;
        }

        info!(
            chunks = chunks.len(),
            dimensions = index.dimensions(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Index built"
        );

        Ok(BuiltIndex {
            index,
            texts: chunks,
            embedder_id: self.embedder.model_id().to_string(),
        })
    }
}

/// Load processed chunks, build, and persist using the configured paths.
///
/// Embedding is CPU-bound and runs on the blocking pool.
pub async fn build_from_processed(config: &RagkitConfig, embedder: Arc<dyn Embedder>) -> Result<BuiltIndex> {
    let chunks = load_processed_chunks(&config.paths.processed_dir).await?;
    let builder = IndexBuilder::new(embedder).with_batch_size(config.rag.embed_batch_size);
    let built = tokio::task::spawn_blocking(move || builder.build(chunks))
        .await
        .map_err(|e| AppError::Internal(format!("Index build task failed: {}", e)))??;
    built.persist(&config.paths.index_dir).await?;
    Ok(built)
}
