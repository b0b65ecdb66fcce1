// lib.rs - SyllabusAI: upload a course syllabus and chat with an assistant about it
pub mod backend_client;
pub mod components;
pub mod config;
pub mod error;
pub mod generation;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod openai_client;
pub mod services;

use axum::{Extension, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use backend_client::BackendClient;
use config::Config;
use generation::{BackendKind, GenerationBackend, UnconfiguredBackend};
use openai_client::{CompletionsClient, OpenAIClient};
use services::{DocumentStore, SharedDocumentStore};

// AppState holds the document store, the chat generation backend and the optional extraction service
pub struct AppState {
    pub config: Config,
    pub documents: SharedDocumentStore,
    pub generator: Arc<dyn GenerationBackend>,
    pub extractor: Option<BackendClient>,
}

impl AppState {
    pub fn new(config: Config, generator: Arc<dyn GenerationBackend>, extractor: Option<BackendClient>) -> Self {
        Self {
            config,
            documents: Arc::new(DocumentStore::new()),
            generator,
            extractor,
        }
    }

    /// Wires up the external clients the config asks for. Missing credentials
    /// are not fatal: the affected feature fails per request instead.
    pub fn from_config(config: Config) -> Self {
        let http = reqwest::Client::new();

        let backend_client = config.backend_url.clone().map(|url| {
            BackendClient::new(http.clone(), url, config.backend_api_key.clone(), config.http_timeout)
        });

        let generator: Arc<dyn GenerationBackend> = match config.backend {
            BackendKind::OpenAi => match config.openai_api_key.clone() {
                Some(api_key) => {
                    tracing::info!("Initializing OpenAI client ({})...", config.openai_model);
                    Arc::new(OpenAIClient::new(
                        http.clone(),
                        api_key,
                        config.openai_base_url.clone(),
                        config.openai_model.clone(),
                        config.http_timeout,
                    ))
                }
                None => {
                    tracing::warn!("OPENAI_API_KEY not found. Chat generation will fail until it is set.");
                    Arc::new(UnconfiguredBackend::new(BackendKind::OpenAi, "OPENAI_API_KEY"))
                }
            },
            BackendKind::LangChain => match backend_client.clone() {
                Some(client) => {
                    tracing::info!("Using custom chat backend at {}", config.backend_url.as_deref().unwrap_or_default());
                    Arc::new(client)
                }
                None => {
                    tracing::warn!("BACKEND_URL not found. Chat generation will fail until it is set.");
                    Arc::new(UnconfiguredBackend::new(BackendKind::LangChain, "BACKEND_URL"))
                }
            },
            BackendKind::Completions => match config.backend_url.clone() {
                Some(url) => {
                    tracing::info!("Using OpenAI-compatible completions at {} ({})", url, config.completions_model);
                    Arc::new(CompletionsClient::new(
                        http.clone(),
                        url,
                        config.backend_api_key.clone(),
                        config.completions_model.clone(),
                        config.http_timeout,
                    ))
                }
                None => {
                    tracing::warn!("BACKEND_URL not found. Chat generation will fail until it is set.");
                    Arc::new(UnconfiguredBackend::new(BackendKind::Completions, "BACKEND_URL"))
                }
            },
        };

        if backend_client.is_some() {
            tracing::info!("PDF text extraction delegated to {}/upload", config.backend_url.as_deref().unwrap_or_default());
        } else {
            tracing::info!("To enable PDF text extraction, set: BACKEND_URL");
        }

        Self::new(config, generator, backend_client)
    }
}

/// Builds the application with all routes, middleware and shared state.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(handlers::pages::page_routes())
        .merge(handlers::documents::document_routes(state.config.max_upload_bytes))
        .merge(handlers::chat::chat_routes())
        .merge(handlers::status::status_routes())
        .layer(axum::middleware::from_fn(middleware::logging::request_logging_middleware))
        .layer(CorsLayer::permissive())
        .layer(Extension(state))
}
