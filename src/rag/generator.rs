//! Context-constrained answer generation.

use crate::llm::{GenerationParams, LLMClient};
use crate::types::Result;
use std::time::Instant;
use tracing::debug;

/// Answer returned when retrieval produced nothing; the model is not called.
pub const NO_CONTEXT_ANSWER: &str = "I don't have enough context to answer.";

/// Prompt listing each context chunk as a bullet, followed by the question.
pub fn build_prompt<S: AsRef<str>>(question: &str, contexts: &[S]) -> String {
    let bullets = contexts
        .iter()
        .map(|c| format!("- {}", c.as_ref()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a helpful assistant. Answer the question using ONLY the context.\n\
         If the answer is not in the context, say you don't know.\n\n\
         Context:\n{bullets}\n\n\
         Question: {question}\n\
         Answer:"
    )
}

pub struct Generator {
    client: Box<dyn LLMClient>,
    params: GenerationParams,
}

impl Generator {
    pub fn new(client: Box<dyn LLMClient>, params: GenerationParams) -> Self {
        Self { client, params }
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    /// Backend failures come back as `GenerationFailure`; callers decide how to surface them.
    pub async fn generate<S: AsRef<str> + Sync>(&self, question: &str, contexts: &[S]) -> Result<String> {
        if contexts.is_empty() {
            return Ok(NO_CONTEXT_ANSWER.to_string());
        }

        let prompt = build_prompt(question, contexts);
        let started = Instant::now();
        let answer = self.client.generate(&prompt, &self.params).await?;
        debug!(
            model = self.client.model_name(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Generated answer"
        );
        Ok(answer)
    }
}
