use crate::AppState;
use axum::{extract::Extension, response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::sync::Arc;

pub fn status_routes() -> Router {
    Router::new().route("/api/status", get(api_status))
}

// API Status endpoint
pub async fn api_status(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    let extraction_status = if state.extractor.is_some() { "configured" } else { "not_configured" };

    Json(json!({
        "status": "operational",
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "generation_backend": state.generator.kind().as_str(),
            "text_extraction": extraction_status
        },
        "documents": state.documents.len().await
    }))
}
