// src/handlers/chat.rs
use crate::error::AppError;
use crate::models::chat::{GenerateRequest, GenerateResponse};
use crate::services::{prompt::build_system_prompt, relevance::relevance_rating};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Extension},
    response::Json,
    routing::post,
    Router,
};
use std::sync::Arc;

const GENERATION_FAILED: &str = "Failed to generate response";

pub fn chat_routes() -> Router {
    Router::new().route("/api/chat/generate", post(generate_response))
}

pub async fn generate_response(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, AppError> {
    let Json(request) = payload.map_err(|e| {
        tracing::error!("Error generating response: invalid request body: {}", e);
        AppError::internal(GENERATION_FAILED)
    })?;

    let prompt = request
        .prompt
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("No prompt provided"))?;

    let document_id = request
        .document_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("No document ID provided"))?;

    // The document must exist before anything is sent upstream.
    let document = state
        .documents
        .get(&document_id)
        .await
        .ok_or_else(|| AppError::not_found("Document not found"))?;

    let system = build_system_prompt(&document.content);
    tracing::info!(
        "Generating answer for document {} via {} ({} chars of context)",
        document.id,
        state.generator.kind(),
        system.len()
    );

    let generation = state.generator.generate(&system, &prompt).await.map_err(|e| {
        tracing::error!("Error generating response: {}", e);
        AppError::internal(GENERATION_FAILED)
    })?;

    tracing::debug!(
        "Generated {} chars, {} total tokens",
        generation.text.len(),
        generation.usage.total_tokens
    );

    Ok(Json(GenerateResponse {
        text: generation.text,
        relevance_rating: relevance_rating(),
        usage: generation.usage,
    }))
}
