// src/config.rs
use crate::generation::BackendKind;
use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_COMPLETIONS_MODEL: &str = "gpt-3.5-turbo-instruct";
pub const DEFAULT_PROCESSING_DELAY_MS: u64 = 1000;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024; // 50MB, same as the upload page check
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;

/// Runtime settings, read once at startup from the process environment
/// (after `.env` has been loaded by `dotenvy`).
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub backend: BackendKind,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    /// Base URL of the custom chat/extraction backend.
    pub backend_url: Option<String>,
    pub backend_api_key: Option<String>,
    pub completions_model: String,
    pub processing_delay: Duration,
    pub max_upload_bytes: usize,
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            backend: BackendKind::OpenAi,
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            backend_url: None,
            backend_api_key: None,
            completions_model: DEFAULT_COMPLETIONS_MODEL.to_string(),
            processing_delay: Duration::from_millis(DEFAULT_PROCESSING_DELAY_MS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let backend = match get("GENERATION_BACKEND") {
            Some(raw) => match raw.parse::<BackendKind>() {
                Ok(kind) => kind,
                Err(e) => {
                    tracing::warn!("{}; falling back to {}", e, defaults.backend);
                    defaults.backend
                }
            },
            None => defaults.backend,
        };

        let processing_delay = parse_or(get("UPLOAD_PROCESSING_DELAY_MS"), "UPLOAD_PROCESSING_DELAY_MS", DEFAULT_PROCESSING_DELAY_MS);
        let http_timeout = parse_or(get("HTTP_TIMEOUT_SECS"), "HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS);

        Self {
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            backend,
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.openai_base_url),
            openai_model: get("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            backend_url: get("BACKEND_URL").map(|url| url.trim_end_matches('/').to_string()),
            backend_api_key: get("BACKEND_API_KEY"),
            completions_model: get("COMPLETIONS_MODEL").unwrap_or(defaults.completions_model),
            processing_delay: Duration::from_millis(processing_delay),
            max_upload_bytes: parse_or(get("MAX_UPLOAD_BYTES"), "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
            http_timeout: Duration::from_secs(http_timeout),
        }
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    match raw {
        Some(value) => value.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value for {}: {:?}, using {}", key, value, default);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = config_from(&[]);
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.backend, BackendKind::OpenAi);
        assert_eq!(config.openai_model, "gpt-4o");
        assert_eq!(config.processing_delay, Duration::from_millis(1000));
        assert_eq!(config.max_upload_bytes, 50 * 1024 * 1024);
        assert!(config.backend_url.is_none());
    }

    #[test]
    fn test_overrides_and_trailing_slashes() {
        let config = config_from(&[
            ("GENERATION_BACKEND", "langchain"),
            ("BACKEND_URL", "http://localhost:8000/"),
            ("UPLOAD_PROCESSING_DELAY_MS", "0"),
            ("OPENAI_BASE_URL", "http://proxy.local/v1/"),
        ]);
        assert_eq!(config.backend, BackendKind::LangChain);
        assert_eq!(config.backend_url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(config.openai_base_url, "http://proxy.local/v1");
        assert_eq!(config.processing_delay, Duration::ZERO);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("GENERATION_BACKEND", "gemini"),
            ("MAX_UPLOAD_BYTES", "lots"),
            ("OPENAI_API_KEY", "   "),
        ]);
        assert_eq!(config.backend, BackendKind::OpenAi);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert!(config.openai_api_key.is_none());
    }
}
