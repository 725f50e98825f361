//! TOML-based configuration for ragkit
//!
//! Every setting has a default, so an empty (or missing) `ragkit.toml` yields a
//! working configuration. The same file drives ingestion, index builds, and the
//! server, which keeps the embedding backend identical across all three.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Root configuration structure loaded from ragkit.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagkitConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub rag: RagConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub generation: GenerationConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

// ============= Path Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory tree of plain-text source documents
    #[serde(default = "default_raw_dir")]
    pub raw_dir: PathBuf,

    /// Output directory for `<stem>.chunks.txt` files
    #[serde(default = "default_processed_dir")]
    pub processed_dir: PathBuf,

    /// Directory holding the index + chunk-text pair
    #[serde(default = "default_index_dir")]
    pub index_dir: PathBuf,
}

fn default_raw_dir() -> PathBuf {
    PathBuf::from("data/raw")
}

fn default_processed_dir() -> PathBuf {
    PathBuf::from("data/processed")
}

fn default_index_dir() -> PathBuf {
    PathBuf::from("models/index")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_dir: default_raw_dir(),
            processed_dir: default_processed_dir(),
            index_dir: default_index_dir(),
        }
    }
}

// ============= RAG Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Chunk budget in characters: each word counts its length plus one separator
    #[serde(default = "default_chunk_max_len")]
    pub chunk_max_len: usize,

    #[serde(default = "default_top_k")]
    pub default_top_k: usize,

    #[serde(default = "default_embed_batch_size")]
    pub embed_batch_size: usize,
}

fn default_chunk_max_len() -> usize {
    800
}

fn default_top_k() -> usize {
    5
}

fn default_embed_batch_size() -> usize {
    32
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_max_len: default_chunk_max_len(),
            default_top_k: default_top_k(),
            embed_batch_size: default_embed_batch_size(),
        }
    }
}

// ============= Embedding Configuration =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Deterministic feature-hashing embedder, no model download
    Hash,
    /// ONNX sentence-transformer via fastembed (feature `local-embeddings`)
    FastEmbed,
}

impl Default for EmbeddingBackend {
    fn default() -> Self {
        if cfg!(feature = "local-embeddings") {
            EmbeddingBackend::FastEmbed
        } else {
            EmbeddingBackend::Hash
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub backend: EmbeddingBackend,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Output dimension of the hash backend (fastembed models fix their own)
    #[serde(default = "default_embedding_dimensions")]
    pub dimensions: usize,
}

fn default_embedding_model() -> String {
    "sentence-transformers/all-MiniLM-L6-v2".to_string()
}

fn default_embedding_dimensions() -> usize {
    384
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::default(),
            model: default_embedding_model(),
            dimensions: default_embedding_dimensions(),
        }
    }
}

// ============= Generation Configuration =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationProvider {
    #[default]
    Ollama,
    OpenAI,
    /// Retrieval only; queries return the context-only placeholder answer
    #[serde(rename = "none")]
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default)]
    pub provider: GenerationProvider,

    /// Provider endpoint; defaults depend on the provider
    pub base_url: Option<String>,

    /// Model name; defaults depend on the provider
    pub model: Option<String>,

    /// Environment variable containing the API key (OpenAI)
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_max_new_tokens() -> u32 {
    128
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: GenerationProvider::default(),
            base_url: None,
            model: None,
            api_key_env: default_api_key_env(),
            max_new_tokens: default_max_new_tokens(),
        }
    }
}

impl GenerationConfig {
    /// Endpoint for the configured provider
    pub fn resolved_base_url(&self) -> String {
        if let Some(url) = &self.base_url {
            return url.clone();
        }
        match self.provider {
            GenerationProvider::OpenAI => "https://api.openai.com/v1".to_string(),
            _ => "http://localhost:11434".to_string(),
        }
    }

    /// Model name for the configured provider
    pub fn resolved_model(&self) -> String {
        if let Some(model) = &self.model {
            return model.clone();
        }
        match self.provider {
            GenerationProvider::OpenAI => "gpt-4o-mini".to_string(),
            _ => "llama3.2".to_string(),
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),
}

impl RagkitConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load configuration, falling back to defaults when the file is absent
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load(&path) {
            Err(ConfigError::FileNotFound(missing)) => {
                warn!(path = ?missing, "Configuration file not found, using defaults");
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
            other => other,
        }
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RagkitConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rag.chunk_max_len == 0 {
            return Err(ConfigError::ValidationError(
                "rag.chunk_max_len must be greater than 0".to_string(),
            ));
        }
        if self.rag.default_top_k == 0 {
            return Err(ConfigError::ValidationError(
                "rag.default_top_k must be greater than 0".to_string(),
            ));
        }
        if self.rag.embed_batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "rag.embed_batch_size must be greater than 0".to_string(),
            ));
        }
        if self.embedding.backend == EmbeddingBackend::Hash && self.embedding.dimensions == 0 {
            return Err(ConfigError::ValidationError(
                "embedding.dimensions must be greater than 0".to_string(),
            ));
        }
        if self.generation.max_new_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "generation.max_new_tokens must be greater than 0".to_string(),
            ));
        }
        if self.paths.index_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "paths.index_dir must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok()
    }

    /// Get the generation API key from the environment
    pub fn generation_api_key(&self) -> Result<String, ConfigError> {
        self.resolve_env(&self.generation.api_key_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(self.generation.api_key_env.clone()))
    }
}
