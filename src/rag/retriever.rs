//! Top-k retrieval over a loaded index pair.

use crate::rag::embeddings::Embedder;
use crate::types::{AppError, Result, RetrievedChunk};
use ragkit_index::{FlatIndex, IndexStore, StoredIndex};
use std::path::Path;
use tracing::info;

/// Read-only index plus its row-aligned chunk texts.
#[derive(Debug, Clone)]
pub struct Retriever {
    index: FlatIndex,
    texts: Vec<String>,
    embedder_id: String,
}

impl Retriever {
    /// Load both artifacts from `dir`.
    ///
    /// When `expected_dimensions` is given, an index built with a different
    /// embedder dimension is rejected here instead of at the first query.
    pub async fn load(dir: &Path, expected_dimensions: Option<usize>) -> Result<Self> {
        let stored = IndexStore::load(dir).await?;
        if let Some(expected) = expected_dimensions {
            stored.ensure_dimensions(expected)?;
        }
        Ok(Self::from_stored(dir, stored))
    }

    /// Load from `dir` and require the index to come from `embedder`: same
    /// dimension and same model identifier.
    pub async fn load_for(dir: &Path, embedder: &dyn Embedder) -> Result<Self> {
        let stored = IndexStore::load(dir).await?;
        stored.ensure_dimensions(embedder.dimensions())?;
        stored.ensure_embedder(embedder.model_id())?;
        Ok(Self::from_stored(dir, stored))
    }

    fn from_stored(dir: &Path, stored: StoredIndex) -> Self {
        info!(
            dir = ?dir,
            chunks = stored.texts.len(),
            dimensions = stored.index.dimensions(),
            embedder = %stored.embedder_id,
            "Index loaded"
        );

        Self {
            index: stored.index,
            texts: stored.texts,
            embedder_id: stored.embedder_id,
        }
    }

    /// Build from in-memory parts. Row count must match the text count.
    pub fn from_parts(index: FlatIndex, texts: Vec<String>) -> Result<Self> {
        if index.len() != texts.len() {
            return Err(AppError::Internal(format!(
                "index has {} rows but {} chunk texts were given",
                index.len(),
                texts.len()
            )));
        }
        Ok(Self {
            index,
            texts,
            embedder_id: String::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.index.dimensions()
    }

    pub fn embedder_id(&self) -> &str {
        &self.embedder_id
    }

    /// Ranked chunks for `query_vector`, rank 1 first.
    ///
    /// `k <= 0` or an empty index gives an empty result; larger `k` is clamped
    /// to the chunk count. A query vector of the wrong dimension is an
    /// embedding error, whatever `k` is.
    pub fn search(&self, query_vector: &[f32], k: i64) -> Result<Vec<RetrievedChunk>> {
        if query_vector.len() != self.dimensions() {
            return Err(AppError::Embedding(format!(
                "query vector has {} dimensions, index expects {}",
                query_vector.len(),
                self.dimensions()
            )));
        }
        if k <= 0 || self.is_empty() {
            return Ok(Vec::new());
        }
        let k = usize::try_from(k).unwrap_or(usize::MAX);

        let hits = self.index.search(query_vector, k)?;
        Ok(hits
            .into_iter()
            .enumerate()
            .filter_map(|(i, hit)| {
                self.texts.get(hit.row).map(|text| RetrievedChunk {
                    rank: i + 1,
                    score: hit.score,
                    text: text.clone(),
                })
            })
            .collect())
    }
}
