use crate::llm::client::{GenerationParams, LLMClient};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use ollama_rs::{
    Ollama,
    generation::chat::{ChatMessage, request::ChatMessageRequest},
    models::ModelOptions,
};

const DEFAULT_PORT: u16 = 11434;

/// Split `http://host:port` into (`http://host`, port).
fn split_base_url(base_url: &str) -> (String, u16) {
    let (scheme, rest) = base_url.split_once("://").unwrap_or(("http", base_url));
    let authority = rest.split('/').next().unwrap_or_default();
    let (host, port) = match authority.rsplit_once(':') {
        Some((host, port)) => (host, port.parse().unwrap_or(DEFAULT_PORT)),
        None => (authority, DEFAULT_PORT),
    };
    let host = if host.is_empty() { "localhost" } else { host };
    (format!("{scheme}://{host}"), port)
}

pub struct OllamaClient {
    client: Ollama,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: String) -> Self {
        let (host, port) = split_base_url(base_url);
        Self {
            client: Ollama::new(host, port),
            model,
        }
    }
}

#[async_trait]
impl LLMClient for OllamaClient {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        let messages = vec![ChatMessage::user(prompt.to_string())];
        let options = ModelOptions::default()
            .temperature(params.temperature)
            .num_predict(params.max_new_tokens as i32);

        let request = ChatMessageRequest::new(self.model.clone(), messages).options(options);

        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| AppError::GenerationFailure(format!("Ollama error: {}", e)))?;

        Ok(response.message.content.trim().to_string())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_parsing_full() {
        assert_eq!(
            split_base_url("http://localhost:11434"),
            ("http://localhost".to_string(), 11434)
        );
    }

    #[test]
    fn test_url_parsing_no_port() {
        assert_eq!(split_base_url("http://localhost"), ("http://localhost".to_string(), 11434));
    }

    #[test]
    fn test_url_parsing_custom_port_and_path() {
        assert_eq!(
            split_base_url("https://192.168.1.100:8080/api"),
            ("https://192.168.1.100".to_string(), 8080)
        );
    }

    #[test]
    fn test_url_parsing_without_scheme() {
        assert_eq!(split_base_url("gpu-box:9000"), ("http://gpu-box".to_string(), 9000));
    }
}
