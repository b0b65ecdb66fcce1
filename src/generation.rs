// src/generation.rs
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Which external text-generation service answers chat prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// OpenAI chat completions.
    OpenAi,
    /// Custom backend taking a LangChain-serialized chat history.
    LangChain,
    /// Any OpenAI-compatible `/v1/completions` endpoint.
    Completions,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::OpenAi => "openai",
            BackendKind::LangChain => "langchain",
            BackendKind::Completions => "completions",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(BackendKind::OpenAi),
            "langchain" => Ok(BackendKind::LangChain),
            "completions" => Ok(BackendKind::Completions),
            other => Err(format!("Unknown generation backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub text: String,
    pub usage: TokenUsage,
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("No text content in response")]
    EmptyResponse,
}

/// A service that turns a system prompt plus a user prompt into text.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    async fn generate(&self, system: &str, prompt: &str) -> Result<Generation, GenerationError>;
}

/// Stand-in used when the selected backend has no credentials; every call fails.
pub struct UnconfiguredBackend {
    kind: BackendKind,
    missing: &'static str,
}

impl UnconfiguredBackend {
    pub fn new(kind: BackendKind, missing: &'static str) -> Self {
        Self { kind, missing }
    }
}

#[async_trait]
impl GenerationBackend for UnconfiguredBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    async fn generate(&self, _system: &str, _prompt: &str) -> Result<Generation, GenerationError> {
        Err(GenerationError::NotConfigured(self.missing))
    }
}
