//! LLM client abstraction and provider selection

use crate::types::{AppError, Result};
use crate::utils::toml_config::{GenerationConfig, GenerationProvider, RagkitConfig};
use async_trait::async_trait;

/// Decoding settings for a single generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    /// Upper bound on generated tokens
    pub max_new_tokens: u32,
    /// 0.0 means greedy decoding
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_new_tokens: 128,
            temperature: 0.0,
        }
    }
}

impl GenerationParams {
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            max_new_tokens: config.max_new_tokens,
            ..Self::default()
        }
    }
}

/// Generic LLM client trait for provider abstraction
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion for `prompt`
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Provider enum for runtime selection
#[derive(Debug, Clone)]
pub enum Provider {
    /// Ollama local LLM provider
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::Ollama {
    ///     base_url: "http://localhost:11434".to_string(),
    ///     model: "llama3.2".to_string(),
    /// };
    /// ```
    Ollama { base_url: String, model: String },

    /// OpenAI API provider (including compatible APIs)
    OpenAI {
        api_key: String,
        api_base: String,
        model: String,
    },
}

impl Provider {
    /// Resolve the configured provider. `provider = "none"` yields `Ok(None)`.
    pub fn from_config(config: &RagkitConfig) -> Result<Option<Self>> {
        let generation = &config.generation;
        match generation.provider {
            GenerationProvider::Disabled => Ok(None),
            GenerationProvider::Ollama => Ok(Some(Provider::Ollama {
                base_url: generation.resolved_base_url(),
                model: generation.resolved_model(),
            })),
            GenerationProvider::OpenAI => {
                let api_key = config
                    .generation_api_key()
                    .map_err(|e| AppError::ModelUnavailable(e.to_string()))?;
                Ok(Some(Provider::OpenAI {
                    api_key,
                    api_base: generation.resolved_base_url(),
                    model: generation.resolved_model(),
                }))
            }
        }
    }

    /// Create a client instance for this provider
    ///
    /// # Errors
    ///
    /// `ModelUnavailable` if the provider's Cargo feature is not compiled in.
    pub async fn create_client(&self) -> Result<Box<dyn LLMClient>> {
        match self {
            #[cfg(feature = "ollama")]
            Provider::Ollama { base_url, model } => Ok(Box::new(
                super::ollama::OllamaClient::new(base_url, model.clone()),
            )),

            #[cfg(feature = "openai")]
            Provider::OpenAI {
                api_key,
                api_base,
                model,
            } => Ok(Box::new(super::openai::OpenAIClient::new(
                api_key.clone(),
                api_base.clone(),
                model.clone(),
            ))),

            #[allow(unreachable_patterns)]
            other => Err(AppError::ModelUnavailable(format!(
                "{} provider requires the '{}' feature",
                other.name(),
                other.feature()
            ))),
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Ollama { .. } => "Ollama",
            Provider::OpenAI { .. } => "OpenAI",
        }
    }

    fn feature(&self) -> &'static str {
        match self {
            Provider::Ollama { .. } => "ollama",
            Provider::OpenAI { .. } => "openai",
        }
    }
}
