//! OpenAI-compatible client tests against a mocked `/chat/completions` endpoint.

#![cfg(feature = "openai")]

use ragkit::llm::openai::OpenAIClient;
use ragkit::{AppError, GenerationParams, LLMClient};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn mock_completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1704067200,
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop",
            "logprobs": null
        }],
        "usage": {"prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17}
    })
}

fn client_for(server: &MockServer) -> OpenAIClient {
    OpenAIClient::new("sk-test".to_string(), server.uri(), "gpt-4o-mini".to_string())
}

#[tokio::test]
async fn test_generate_sends_greedy_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_completion(" On the mat. ")))
        .mount(&server)
        .await;

    let answer = client_for(&server)
        .generate("Question: Where did the cat sit?", &GenerationParams::default())
        .await
        .unwrap();
    assert_eq!(answer, "On the mat.");

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = requests[0].body_json().unwrap();
    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["temperature"].as_f64(), Some(0.0));
    assert_eq!(body["max_completion_tokens"], 128);
    assert_eq!(body["messages"][0]["content"], "Question: Where did the cat sit?");
}

#[tokio::test]
async fn test_api_error_is_generation_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "message": "The model `gpt-4o-mini` does not exist",
                "type": "invalid_request_error",
                "param": null,
                "code": "model_not_found"
            }
        })))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .generate("prompt", &GenerationParams::default())
        .await;
    assert!(matches!(result, Err(AppError::GenerationFailure(msg)) if msg.contains("OpenAI API error")));
}

#[tokio::test]
async fn test_empty_choices_is_generation_failure() {
    let server = MockServer::start().await;
    let mut body = mock_completion("unused");
    body["choices"] = json!([]);
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .generate("prompt", &GenerationParams::default())
        .await;
    assert!(matches!(result, Err(AppError::GenerationFailure(_))));
}
