use crate::generation::{BackendKind, Generation, GenerationBackend, GenerationError, TokenUsage};
use async_trait::async_trait;
use reqwest::{multipart, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Client for the custom document backend: LangChain-style chat generation
/// and PDF text extraction.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Extraction service error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("Expected JSON response from /upload, got {0}")]
    UnexpectedContentType(String),
    #[error("Failed to parse extraction response: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LangChainChatRequest {
    pub chat_history: Vec<LangChainMessage>,
    pub persona: String,
}

/// One message in LangChain's JSON serialization format.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LangChainMessage {
    pub lc: u8,
    #[serde(rename = "type")]
    pub message_type: String,
    pub id: Vec<String>,
    pub lc_kwargs: LangChainKwargs,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LangChainKwargs {
    pub content: String,
    pub additional_kwargs: serde_json::Map<String, serde_json::Value>,
    pub response_metadata: serde_json::Map<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_tool_calls: Option<Vec<serde_json::Value>>,
}

impl LangChainMessage {
    pub fn system(id: String, content: &str) -> Self {
        Self::build("system", id, content, None)
    }

    pub fn human(id: String, content: &str) -> Self {
        Self::build("human", id, content, Some(Vec::new()))
    }

    fn build(message_type: &str, id: String, content: &str, tool_calls: Option<Vec<serde_json::Value>>) -> Self {
        Self {
            lc: 1,
            message_type: message_type.to_string(),
            id: vec![id],
            lc_kwargs: LangChainKwargs {
                content: content.to_string(),
                additional_kwargs: serde_json::Map::new(),
                response_metadata: serde_json::Map::new(),
                invalid_tool_calls: tool_calls.clone(),
                tool_calls,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LangChainChatResponse {
    pub result: LangChainResult,
}

#[derive(Debug, Deserialize)]
pub struct LangChainResult {
    pub response: LangChainResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct LangChainResponseMessage {
    pub kwargs: LangChainResponseKwargs,
}

#[derive(Debug, Deserialize)]
pub struct LangChainResponseKwargs {
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct ExtractionResponse {
    text: String,
}

impl BackendClient {
    pub fn new(client: Client, base_url: String, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url,
            api_key,
            timeout,
        }
    }

    pub fn build_chat_request(system: &str, prompt: &str) -> LangChainChatRequest {
        let now = chrono::Utc::now().timestamp_millis();
        LangChainChatRequest {
            chat_history: vec![
                LangChainMessage::system(format!("system-{}", now), system),
                LangChainMessage::human(now.to_string(), prompt),
            ],
            persona: String::new(),
        }
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.api_key {
            Some(ref key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    /// Sends a document to the extraction service and returns its plain text.
    pub async fn extract_text(&self, file_name: &str, data: Vec<u8>) -> Result<String, ExtractionError> {
        let part = multipart::Part::bytes(data).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);

        let response = self
            .authorized(self.client.post(format!("{}/upload", self.base_url)))
            .timeout(self.timeout)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let raw_text = response.text().await?;

        if !status.is_success() {
            tracing::error!("PDF extraction failed ({}): {}", status, raw_text);
            return Err(ExtractionError::Api {
                status: status.as_u16(),
                body: raw_text,
            });
        }

        if !content_type.contains("application/json") {
            tracing::error!("Unexpected extraction response content-type: {}", content_type);
            return Err(ExtractionError::UnexpectedContentType(content_type));
        }

        let parsed: ExtractionResponse = serde_json::from_str(&raw_text)?;
        tracing::debug!("Extracted {} characters from {}", parsed.text.len(), file_name);
        Ok(parsed.text)
    }
}

#[async_trait]
impl GenerationBackend for BackendClient {
    fn kind(&self) -> BackendKind {
        BackendKind::LangChain
    }

    async fn generate(&self, system: &str, prompt: &str) -> Result<Generation, GenerationError> {
        let request = Self::build_chat_request(system, prompt);

        let response = self
            .authorized(self.client.post(format!("{}/chat/generate", self.base_url)))
            .query(&[("stream", "false"), ("researchMode", "false"), ("scope", "internal")])
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!("Backend chat error ({}): {}", status, response_text);
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body: response_text,
            });
        }

        let parsed: LangChainChatResponse = serde_json::from_str(&response_text)?;
        let text = parsed.result.response.kwargs.content;
        if text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        // The backend reports no token accounting.
        Ok(Generation {
            text,
            usage: TokenUsage::default(),
        })
    }
}
