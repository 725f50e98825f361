//! Text-generation backends
//!
//! The generator only sees the [`LLMClient`] trait. Concrete clients are
//! selected at startup from `[generation]` in `ragkit.toml`.
//!
//! Enable providers via Cargo features:
//! - `ollama` - Local Ollama server (default)
//! - `openai` - OpenAI API and compatible endpoints

/// Core LLM client trait and provider selection.
pub mod client;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "openai")]
pub mod openai;

pub use client::{GenerationParams, LLMClient, Provider};
