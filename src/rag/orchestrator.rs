//! Embed → retrieve → generate, with each capability independently optional.
//!
//! The orchestrator is built once at startup and never mutated. A capability
//! that failed to load is simply absent, and every request checks for it before
//! use instead of failing inside the pipeline.

use crate::llm::{GenerationParams, Provider};
use crate::rag::embeddings::{embed_query, load_embedder, Embedder};
use crate::rag::generator::Generator;
use crate::rag::retriever::Retriever;
use crate::types::{AppError, HealthResponse, Result, RetrievedChunk};
use crate::utils::toml_config::RagkitConfig;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Answer used when retrieval succeeded but no generator is configured.
pub const CONTEXT_ONLY_ANSWER: &str = "Top matching chunks returned. (Generation model not loaded.)";

const DEFAULT_TOP_K: usize = 5;

/// How a successful query terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The generator ran. Its answer may be an inline error string.
    Answered,
    /// No generator; only retrieval results are meaningful.
    ContextOnly,
}

#[derive(Debug, Clone)]
pub struct QueryAnswer {
    pub answer: String,
    pub context: Vec<RetrievedChunk>,
    pub outcome: QueryOutcome,
}

pub struct QueryOrchestrator {
    retriever: Option<Retriever>,
    embedder: Option<Arc<dyn Embedder>>,
    generator: Option<Generator>,
    default_top_k: usize,
}

impl QueryOrchestrator {
    pub fn new(
        retriever: Option<Retriever>,
        embedder: Option<Arc<dyn Embedder>>,
        generator: Option<Generator>,
    ) -> Self {
        Self {
            retriever,
            embedder,
            generator,
            default_top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_default_top_k(mut self, k: usize) -> Self {
        self.default_top_k = k;
        self
    }

    /// Load every capability from `config`, logging and dropping whichever fails.
    ///
    /// The embedder loads first so the index can be checked against it. An
    /// index built by another model, or with another dimension, is not loaded.
    pub async fn bootstrap(config: &RagkitConfig) -> Self {
        let embedder = match load_embedder(config.embedding.clone()).await {
            Ok(embedder) => {
                info!(model = embedder.model_id(), dimensions = embedder.dimensions(), "Embedder ready");
                Some(embedder)
            }
            Err(e) => {
                warn!(error = %e, "Embedder unavailable, queries will be rejected");
                None
            }
        };

        let loaded = match &embedder {
            Some(embedder) => Retriever::load_for(&config.paths.index_dir, embedder.as_ref()).await,
            None => Retriever::load(&config.paths.index_dir, None).await,
        };
        let retriever = match loaded {
            Ok(retriever) => {
                info!(
                    chunks = retriever.len(),
                    dimensions = retriever.dimensions(),
                    embedder = retriever.embedder_id(),
                    "Retriever ready"
                );
                Some(retriever)
            }
            Err(e) => {
                warn!(dir = ?config.paths.index_dir, error = %e, "Index not loaded");
                None
            }
        };

        let generator = match Provider::from_config(config) {
            Ok(None) => {
                info!("Generation disabled, answering with retrieved context only");
                None
            }
            Ok(Some(provider)) => match provider.create_client().await {
                Ok(client) => {
                    let generator =
                        Generator::new(client, GenerationParams::from_config(&config.generation));
                    info!(provider = provider.name(), model = generator.model_name(), "Generator ready");
                    Some(generator)
                }
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "Generator unavailable");
                    None
                }
            },
            Err(e) => {
                warn!(error = %e, "Generator unavailable");
                None
            }
        };

        Self::new(retriever, embedder, generator).with_default_top_k(config.rag.default_top_k)
    }

    pub fn index_loaded(&self) -> bool {
        self.retriever.is_some()
    }

    pub fn embedder_loaded(&self) -> bool {
        self.embedder.is_some()
    }

    pub fn generator_loaded(&self) -> bool {
        self.generator.is_some()
    }

    pub fn chunk_count(&self) -> usize {
        self.retriever.as_ref().map_or(0, Retriever::len)
    }

    pub fn default_top_k(&self) -> usize {
        self.default_top_k
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            status: "ok".to_string(),
            index_loaded: self.index_loaded(),
            chunks: self.chunk_count(),
        }
    }

    /// Answer `question` from the top `k` chunks (`None` uses the configured default).
    ///
    /// Missing index or embedder short-circuit before any work. A generator
    /// failure does not fail the query: the answer carries the error text and
    /// the retrieved context is still returned.
    pub async fn query(&self, question: &str, k: Option<i64>) -> Result<QueryAnswer> {
        let retriever = self.retriever.as_ref().ok_or(AppError::IndexNotLoaded)?;
        let embedder = self.embedder.as_ref().ok_or(AppError::EmbedderNotLoaded)?;

        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::InvalidInput("question must not be empty".to_string()));
        }

        let k = k.unwrap_or(self.default_top_k as i64);
        let started = Instant::now();

        let query_vector = embed_query(Arc::clone(embedder), question.to_string()).await?;
        let context = retriever.search(&query_vector, k)?;

        let (answer, outcome) = match &self.generator {
            Some(generator) => {
                let texts: Vec<&str> = context.iter().map(|c| c.text.as_str()).collect();
                let answer = match generator.generate(question, texts.as_slice()).await {
                    Ok(answer) => answer,
                    Err(AppError::GenerationFailure(detail)) => {
                        warn!(error = %detail, "Generation failed, returning context");
                        format!("Generator error: {detail}")
                    }
                    Err(other) => {
                        warn!(error = %other, "Generation failed, returning context");
                        format!("Generator error: {other}")
                    }
                };
                (answer, QueryOutcome::Answered)
            }
            None => (CONTEXT_ONLY_ANSWER.to_string(), QueryOutcome::ContextOnly),
        };

        info!(
            k,
            results = context.len(),
            outcome = ?outcome,
            duration_ms = started.elapsed().as_millis() as u64,
            "Query answered"
        );

        Ok(QueryAnswer {
            answer,
            context,
            outcome,
        })
    }
}
