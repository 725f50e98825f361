//! Text embedders.
//!
//! Every embedder returns unit-length vectors so inner product equals cosine
//! similarity at search time.

use crate::types::{AppError, Result};
use crate::utils::toml_config::{EmbeddingBackend, EmbeddingConfig};
use std::sync::Arc;

/// Maps text to a fixed-dimension, L2-normalized vector.
pub trait Embedder: Send + Sync {
    /// Identifier persisted next to the index so builds and queries can be matched.
    fn model_id(&self) -> &str;

    fn dimensions(&self) -> usize;

    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Order-preserving batch variant. Semantically equal to calling `embed` per item.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Scale `vector` to unit length in place. Zero vectors are left untouched.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}

/// Build the embedder selected by `[embedding]`.
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    match config.backend {
        EmbeddingBackend::Hash => Ok(Arc::new(HashEmbedder::new(config.dimensions)?)),
        #[cfg(feature = "local-embeddings")]
        EmbeddingBackend::FastEmbed => Ok(Arc::new(FastEmbedder::new(&config.model)?)),
        #[cfg(not(feature = "local-embeddings"))]
        EmbeddingBackend::FastEmbed => Err(AppError::ModelUnavailable(format!(
            "embedding backend 'fastembed' ({}) requires the 'local-embeddings' feature",
            config.model
        ))),
    }
}

/// [`create_embedder`] on the blocking pool. Model loading reads weights from
/// disk and may download them, so it must not run on a runtime worker.
pub async fn load_embedder(config: EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    tokio::task::spawn_blocking(move || create_embedder(&config))
        .await
        .map_err(|e| AppError::Internal(format!("Embedder load task failed: {}", e)))?
}

/// Embed one text on the blocking pool so concurrent requests keep running
/// while the model computes.
pub async fn embed_query(embedder: Arc<dyn Embedder>, text: String) -> Result<Vec<f32>> {
    tokio::task::spawn_blocking(move || embedder.embed(&text))
        .await
        .map_err(|e| AppError::Internal(format!("Embedding task failed: {}", e)))?
}

// ============= Hash embedder =============

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

// Feature namespaces, hashed ahead of the feature bytes.
const WORD: &[u8] = b"w\0";
const BIGRAM: &[u8] = b"b\0";
const SURFACE: &[u8] = b"s\0";

const SURFACE_WEIGHT: f32 = 0.5;

fn fnv1a(parts: &[&[u8]]) -> u64 {
    parts
        .iter()
        .flat_map(|part| part.iter())
        .fold(FNV_OFFSET, |h, b| (h ^ u64::from(*b)).wrapping_mul(FNV_PRIME))
}

/// Signed feature hashing over three feature families:
///
/// - lower-cased alphanumeric words, carrying the vocabulary signal;
/// - adjacent word pairs, so reordering the same words changes the vector;
/// - whitespace-delimited surface forms with case and punctuation intact,
///   at half weight, so texts differing only in those still separate.
///
/// Needs no model files, so it is the fallback backend and the one used in tests.
/// Texts sharing vocabulary produce vectors with positive inner product.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
    model_id: String,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(AppError::ModelUnavailable(
                "hash embedder needs at least one dimension".to_string(),
            ));
        }
        Ok(Self {
            dimensions,
            model_id: format!("hash-fnv1a-v2-{dimensions}"),
        })
    }

    fn accumulate(&self, vector: &mut [f32], hash: u64, weight: f32) {
        let bucket = (hash % self.dimensions as u64) as usize;
        // Top bit picks the sign so collisions tend to cancel.
        if hash >> 63 == 0 {
            vector[bucket] += weight;
        } else {
            vector[bucket] -= weight;
        }
    }
}

impl Embedder for HashEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimensions];

        let words: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect();

        for word in &words {
            self.accumulate(&mut vector, fnv1a(&[WORD, word.as_bytes()]), 1.0);
        }
        for pair in words.windows(2) {
            let hash = fnv1a(&[BIGRAM, pair[0].as_bytes(), b"\0", pair[1].as_bytes()]);
            self.accumulate(&mut vector, hash, 1.0);
        }
        for surface in text
            .split_whitespace()
            .filter(|s| s.chars().any(char::is_alphanumeric))
        {
            self.accumulate(&mut vector, fnv1a(&[SURFACE, surface.as_bytes()]), SURFACE_WEIGHT);
        }

        if words.is_empty() || vector.iter().all(|x| *x == 0.0) {
            vector.iter_mut().for_each(|x| *x = 0.0);
            vector[0] = 1.0;
            return Ok(vector);
        }

        l2_normalize(&mut vector);
        Ok(vector)
    }
}

// ============= fastembed =============

#[cfg(feature = "local-embeddings")]
pub use local::FastEmbedder;

#[cfg(feature = "local-embeddings")]
mod local {
    use super::{l2_normalize, Embedder};
    use crate::types::{AppError, Result};
    use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
    use parking_lot::Mutex;
    use tracing::info;

    fn resolve_model(name: &str) -> Result<(EmbeddingModel, usize)> {
        match name {
            "sentence-transformers/all-MiniLM-L6-v2" | "all-minilm-l6-v2" => {
                Ok((EmbeddingModel::AllMiniLML6V2, 384))
            }
            "BAAI/bge-small-en-v1.5" | "bge-small-en-v1.5" => Ok((EmbeddingModel::BGESmallENV15, 384)),
            "BAAI/bge-base-en-v1.5" | "bge-base-en-v1.5" => Ok((EmbeddingModel::BGEBaseENV15, 768)),
            other => Err(AppError::ModelUnavailable(format!(
                "unsupported fastembed model: {other}"
            ))),
        }
    }

    /// ONNX sentence-transformer embeddings via fastembed.
    pub struct FastEmbedder {
        // TextEmbedding::embed takes &mut self
        model: Mutex<TextEmbedding>,
        model_id: String,
        dimensions: usize,
    }

    impl FastEmbedder {
        pub fn new(model_name: &str) -> Result<Self> {
            let (model, dimensions) = resolve_model(model_name)?;
            let embedding = TextEmbedding::try_new(
                InitOptions::new(model).with_show_download_progress(false),
            )
            .map_err(|e| AppError::ModelUnavailable(format!("{model_name}: {e}")))?;

            info!(model = model_name, dimensions, "Embedding model loaded");

            Ok(Self {
                model: Mutex::new(embedding),
                model_id: model_name.to_string(),
                dimensions,
            })
        }
    }

    impl Embedder for FastEmbedder {
        fn model_id(&self) -> &str {
            &self.model_id
        }

        fn dimensions(&self) -> usize {
            self.dimensions
        }

        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let mut vectors = self.embed_batch(&[text.to_string()])?;
            vectors
                .pop()
                .ok_or_else(|| AppError::Embedding("model returned no vector".to_string()))
        }

        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let inputs: Vec<&str> = texts.iter().map(String::as_str).collect();
            let mut vectors = self
                .model
                .lock()
                .embed(inputs, None)
                .map_err(|e| AppError::Embedding(e.to_string()))?;
            for v in vectors.iter_mut() {
                l2_normalize(v);
            }
            Ok(vectors)
        }
    }
}
