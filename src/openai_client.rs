use crate::generation::{BackendKind, Generation, GenerationBackend, GenerationError, TokenUsage};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatCompletionMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatCompletionMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<ChatCompletionChoice>,
    #[serde(default)]
    pub usage: Option<ApiUsage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatCompletionChoice {
    #[serde(default)]
    pub index: u32,
    pub message: ChatCompletionMessage,
    pub finish_reason: Option<String>,
}

/// Token accounting block shared by the chat and legacy completions APIs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ApiUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl From<ApiUsage> for TokenUsage {
    fn from(usage: ApiUsage) -> Self {
        TokenUsage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

impl OpenAIClient {
    pub fn new(client: Client, api_key: String, base_url: String, model: String, timeout: Duration) -> Self {
        Self {
            client,
            api_key,
            base_url,
            model,
            timeout,
        }
    }

    pub fn build_request(&self, system: &str, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatCompletionMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatCompletionMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: None,
        }
    }

    pub async fn create_chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, GenerationError> {
        tracing::debug!("OpenAI API Request: model {}, {} messages", request.model, request.messages.len());

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!("OpenAI API error ({}): {}", status, response_text);
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body: response_text,
            });
        }

        Ok(serde_json::from_str(&response_text)?)
    }
}

#[async_trait]
impl GenerationBackend for OpenAIClient {
    fn kind(&self) -> BackendKind {
        BackendKind::OpenAi
    }

    async fn generate(&self, system: &str, prompt: &str) -> Result<Generation, GenerationError> {
        let request = self.build_request(system, prompt);
        let response = self.create_chat_completion(&request).await?;

        let text = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(GenerationError::EmptyResponse)?;

        Ok(Generation {
            text,
            usage: response.usage.map(TokenUsage::from).unwrap_or_default(),
        })
    }
}

/// Client for OpenAI-compatible legacy `/v1/completions` servers
/// (vLLM, llama.cpp server, and friends).
#[derive(Debug, Clone)]
pub struct CompletionsClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    timeout: Duration,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
    #[serde(default)]
    pub usage: Option<ApiUsage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompletionChoice {
    pub text: String,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl CompletionsClient {
    pub fn new(client: Client, base_url: String, api_key: Option<String>, model: String, timeout: Duration) -> Self {
        Self {
            client,
            base_url,
            api_key,
            model,
            timeout,
        }
    }

    /// Completions endpoints take a single string, so the system prompt and
    /// the question are flattened into one transcript ending on the assistant turn.
    pub fn build_request(&self, system: &str, prompt: &str) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            prompt: format!("{}\n\nUser: {}\nAssistant:", system, prompt),
            max_tokens: 1024,
            temperature: 0.7,
            stream: false,
        }
    }
}

#[async_trait]
impl GenerationBackend for CompletionsClient {
    fn kind(&self) -> BackendKind {
        BackendKind::Completions
    }

    async fn generate(&self, system: &str, prompt: &str) -> Result<Generation, GenerationError> {
        let request = self.build_request(system, prompt);

        let mut builder = self
            .client
            .post(format!("{}/v1/completions", self.base_url))
            .timeout(self.timeout)
            .json(&request);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!("Completions API error ({}): {}", status, response_text);
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body: response_text,
            });
        }

        let parsed: CompletionResponse = serde_json::from_str(&response_text)?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text.trim().to_string())
            .ok_or(GenerationError::EmptyResponse)?;

        Ok(Generation {
            text,
            usage: parsed.usage.map(TokenUsage::from).unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::spawn_stub;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    fn openai() -> OpenAIClient {
        OpenAIClient::new(
            Client::new(),
            "sk-test".to_string(),
            "https://api.openai.com/v1".to_string(),
            "gpt-4o".to_string(),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_chat_request_puts_document_in_system_message() {
        let request = openai().build_request("SYLLABUS CONTENT:\nWeek 1", "When is week 1?");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "gpt-4o",
                "messages": [
                    {"role": "system", "content": "SYLLABUS CONTENT:\nWeek 1"},
                    {"role": "user", "content": "When is week 1?"}
                ]
            })
        );
    }

    #[test]
    fn test_chat_response_usage_conversion() {
        let response: ChatCompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Week 1 starts Monday."}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 100, "completion_tokens": 7, "total_tokens": 107}
        }))
        .unwrap();
        assert_eq!(response.choices[0].message.content, "Week 1 starts Monday.");
        let usage: TokenUsage = response.usage.unwrap().into();
        assert_eq!(usage, TokenUsage::new(100, 7));
    }

    #[test]
    fn test_completions_request_flattens_prompt() {
        let client = CompletionsClient::new(
            Client::new(),
            "http://localhost:8000".to_string(),
            None,
            "local-model".to_string(),
            Duration::from_secs(5),
        );
        let request = client.build_request("Be helpful.", "What is the grading policy?");
        assert_eq!(request.prompt, "Be helpful.\n\nUser: What is the grading policy?\nAssistant:");
        assert!(!request.stream);
        assert_eq!(request.model, "local-model");
    }

    #[test]
    fn test_completions_response_without_usage() {
        let response: CompletionResponse =
            serde_json::from_value(json!({"choices": [{"text": " Midterm is 30%."}]})).unwrap();
        assert!(response.usage.is_none());
        assert_eq!(response.choices[0].text, " Midterm is 30%.");
    }

    fn openai_at(base_url: String) -> OpenAIClient {
        OpenAIClient::new(
            Client::new(),
            "sk-test".to_string(),
            base_url,
            "gpt-4o".to_string(),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_chat_completion_over_http() {
        let stub = Router::new().route(
            "/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer sk-test") {
                    return (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad key"})));
                }
                assert_eq!(body["messages"][0]["role"], "system");
                (
                    StatusCode::OK,
                    Json(json!({
                        "choices": [{"message": {"role": "assistant", "content": "Office hours are Tuesdays."}}],
                        "usage": {"prompt_tokens": 40, "completion_tokens": 6, "total_tokens": 46}
                    })),
                )
            }),
        );
        let url = spawn_stub(stub).await;

        let generation = openai_at(url).generate("context", "When are office hours?").await.unwrap();
        assert_eq!(generation.text, "Office hours are Tuesdays.");
        assert_eq!(generation.usage, TokenUsage::new(40, 6));
    }

    #[tokio::test]
    async fn test_chat_completion_failures() {
        let url = spawn_stub(Router::new().route(
            "/chat/completions",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "rate limited") }),
        ))
        .await;
        let err = openai_at(url).generate("context", "hi").await.unwrap_err();
        assert!(matches!(err, GenerationError::Api { status: 429, .. }));

        let url = spawn_stub(Router::new().route(
            "/chat/completions",
            post(|| async { Json(json!({"choices": []})) }),
        ))
        .await;
        let err = openai_at(url).generate("context", "hi").await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_completions_over_http() {
        let stub = Router::new().route(
            "/v1/completions",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["max_tokens"], 1024);
                Json(json!({"choices": [{"text": "  Midterm is 30%.\n"}]}))
            }),
        );
        let url = spawn_stub(stub).await;
        let client = CompletionsClient::new(Client::new(), url, None, "local-model".to_string(), Duration::from_secs(5));

        let generation = client.generate("context", "How much is the midterm?").await.unwrap();
        assert_eq!(generation.text, "Midterm is 30%.");
        assert_eq!(generation.usage, TokenUsage::default());
    }
}
