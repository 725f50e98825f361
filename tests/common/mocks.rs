//! Mock LLM clients for testing.
//!
//! Used across test files to exercise the generator and orchestrator without a
//! running model server.

use async_trait::async_trait;
use parking_lot::Mutex;
use ragkit::llm::{GenerationParams, LLMClient};
use ragkit::types::{AppError, Result};
use std::sync::Arc;

/// Mock LLM client with a fixed response or a fixed failure.
///
/// Every prompt it receives is recorded so tests can assert on prompt layout
/// and on whether the backend was called at all.
#[derive(Clone)]
pub struct MockLLMClient {
    response: String,
    should_fail: bool,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockLLMClient {
    /// Create a mock client that returns the given response.
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            should_fail: false,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock client that always returns an error.
    pub fn failing() -> Self {
        Self {
            response: String::new(),
            should_fail: true,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, prompt: &str, _params: &GenerationParams) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        if self.should_fail {
            return Err(AppError::GenerationFailure(
                "Mock LLM failure: connection refused".to_string(),
            ));
        }
        Ok(self.response.clone())
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}
