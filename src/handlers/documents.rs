use crate::error::AppError;
use crate::models::document::{Document, DocumentSummary, UploadResponse};
use crate::AppState;
use axum::{
    extract::{multipart::Multipart, DefaultBodyLimit, Extension, Path},
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

const UPLOAD_FAILED: &str = "Failed to process document";

/// Room for multipart boundaries, part headers and the `name` field on top of
/// the file size limit.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn document_routes(max_upload_bytes: usize) -> Router {
    let upload_routes = Router::new()
        .route("/api/documents/upload", post(upload_document))
        .layer(DefaultBodyLimit::max(max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES)));

    Router::new()
        .route("/api/documents", get(list_documents))
        .route("/api/documents/:id", get(get_document))
        .merge(upload_routes)
}

struct UploadedFile {
    file_name: String,
    data: Vec<u8>,
}

pub async fn upload_document(
    Extension(state): Extension<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut file: Option<UploadedFile> = None;
    let mut name: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Upload error: failed to parse multipart field: {}", e);
        AppError::internal(UPLOAD_FAILED)
    })? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("document").to_string();
                let data = field.bytes().await.map_err(|e| {
                    tracing::error!("Upload error: failed to read file '{}': {}", file_name, e);
                    AppError::internal(UPLOAD_FAILED)
                })?;
                file = Some(UploadedFile {
                    file_name,
                    data: data.to_vec(),
                });
            }
            Some("name") => {
                let value = field.text().await.map_err(|e| {
                    tracing::error!("Upload error: failed to read name field: {}", e);
                    AppError::internal(UPLOAD_FAILED)
                })?;
                name = Some(value);
            }
            other => {
                tracing::debug!("Skipping multipart field: {:?}", other);
            }
        }
    }

    let file = file.ok_or_else(|| AppError::bad_request("No file provided"))?;
    let content = read_file_text(&state, &file).await?;

    let name = name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| file.file_name.clone());

    let document = state.documents.insert(name, content).await;
    tracing::info!(
        "Stored document {} '{}' from {} ({} bytes)",
        document.id,
        document.name,
        file.file_name,
        file.data.len()
    );

    // Simulated processing time
    if !state.config.processing_delay.is_zero() {
        tokio::time::sleep(state.config.processing_delay).await;
    }

    Ok(Json(UploadResponse {
        document_id: document.id,
        message: "Document uploaded successfully".to_string(),
    }))
}

/// PDFs go through the extraction service when one is configured; everything
/// else is read as (lossy) UTF-8 text.
async fn read_file_text(state: &AppState, file: &UploadedFile) -> Result<String, AppError> {
    match state.extractor {
        Some(ref extractor) if is_pdf(&file.file_name) => extractor
            .extract_text(&file.file_name, file.data.clone())
            .await
            .map_err(|e| {
                tracing::error!("Upload error: text extraction failed for '{}': {}", file.file_name, e);
                AppError::internal(UPLOAD_FAILED)
            }),
        _ => Ok(String::from_utf8_lossy(&file.data).into_owned()),
    }
}

fn is_pdf(file_name: &str) -> bool {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

pub async fn get_document(
    Path(id): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Document>, AppError> {
    match state.documents.get(&id).await {
        Some(document) => Ok(Json(document)),
        None => {
            tracing::debug!("Document {} not found", id);
            Err(AppError::not_found("Document not found"))
        }
    }
}

pub async fn list_documents(Extension(state): Extension<Arc<AppState>>) -> Json<Vec<DocumentSummary>> {
    Json(state.documents.list().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::handlers::test_support::{
        backend_client, multipart_request, send, spawn_stub, test_config, test_state, test_state_with,
        RecordingBackend,
    };
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;

    async fn extracting_state(stub: Router) -> Arc<AppState> {
        let url = spawn_stub(stub).await;
        test_state_with(
            test_config(),
            Arc::new(RecordingBackend::new("unused")),
            Some(backend_client(url)),
        )
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[test]
    fn test_is_pdf() {
        assert!(is_pdf("syllabus.pdf"));
        assert!(is_pdf("SYLLABUS.PDF"));
        assert!(!is_pdf("syllabus.txt"));
        assert!(!is_pdf("pdf"));
    }

    #[tokio::test]
    async fn test_upload_then_fetch() {
        let state = test_state(RecordingBackend::new("unused"));

        let (status, body) = send(
            state.clone(),
            multipart_request("/api/documents/upload", Some(("notes.txt", "abc")), Some("n")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Document uploaded successfully");
        let id = body["documentId"].as_str().expect("documentId is a string").to_string();

        let (status, body) = send(state, get(&format!("/api/documents/{}", id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], id.as_str());
        assert_eq!(body["name"], "n");
        assert_eq!(body["content"], "abc");
        assert!(body["uploadedAt"].is_string());
    }

    #[tokio::test]
    async fn test_upload_without_file_is_bad_request() {
        let state = test_state(RecordingBackend::new("unused"));
        let (status, body) = send(state.clone(), multipart_request("/api/documents/upload", None, Some("n"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No file provided");
        assert_eq!(state.documents.len().await, 0);
    }

    #[tokio::test]
    async fn test_name_falls_back_to_file_name() {
        let state = test_state(RecordingBackend::new("unused"));
        let (_, body) = send(
            state.clone(),
            multipart_request("/api/documents/upload", Some(("CS101.txt", "Week 1")), Some("  ")),
        )
        .await;
        let id = body["documentId"].as_str().unwrap().to_string();
        let document = state.documents.get(&id).await.unwrap();
        assert_eq!(document.name, "CS101.txt");
    }

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let state = test_state(RecordingBackend::new("unused"));
        for expected in ["1", "2", "3"] {
            let (_, body) = send(
                state.clone(),
                multipart_request("/api/documents/upload", Some(("a.txt", "x")), None),
            )
            .await;
            assert_eq!(body["documentId"], expected);
        }
    }

    #[tokio::test]
    async fn test_fetch_missing_document_is_not_found() {
        let state = test_state(RecordingBackend::new("unused"));
        let (status, body) = send(state, get("/api/documents/999")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Document not found");
    }

    #[tokio::test]
    async fn test_list_documents() {
        let state = test_state(RecordingBackend::new("unused"));
        state.documents.insert("CS101".to_string(), "intro".to_string()).await;
        state.documents.insert("MATH201".to_string(), "linear algebra".to_string()).await;

        let (status, body) = send(state, get("/api/documents")).await;
        assert_eq!(status, StatusCode::OK);
        let list = body.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["name"], "CS101");
        assert_eq!(list[1]["id"], "2");
        assert!(list[0].get("content").is_none());
    }

    #[tokio::test]
    async fn test_pdf_upload_stores_extracted_text() {
        let stub = Router::new().route(
            "/upload",
            post(|| async { Json(json!({"text": "CS101\nWeek 1: Introduction"})) }),
        );
        let state = extracting_state(stub).await;

        let (status, body) = send(
            state.clone(),
            multipart_request("/api/documents/upload", Some(("cs101.pdf", "%PDF-1.4 binary")), Some("CS101")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let document = state.documents.get(body["documentId"].as_str().unwrap()).await.unwrap();
        assert_eq!(document.content, "CS101\nWeek 1: Introduction");
    }

    #[tokio::test]
    async fn test_text_upload_skips_extraction() {
        let stub = Router::new().route(
            "/upload",
            post(|| async { Json(json!({"text": "should not be used"})) }),
        );
        let state = extracting_state(stub).await;

        let (_, body) = send(
            state.clone(),
            multipart_request("/api/documents/upload", Some(("notes.txt", "raw notes")), None),
        )
        .await;
        let document = state.documents.get(body["documentId"].as_str().unwrap()).await.unwrap();
        assert_eq!(document.content, "raw notes");
    }

    #[tokio::test]
    async fn test_failed_extraction_is_server_error() {
        for stub in [
            Router::new().route("/upload", post(|| async { "<html>not json</html>" })),
            Router::new().route("/upload", post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") })),
        ] {
            let state = extracting_state(stub).await;
            let (status, body) = send(
                state.clone(),
                multipart_request("/api/documents/upload", Some(("cs101.pdf", "%PDF")), None),
            )
            .await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, json!({"error": "Failed to process document"}));
            assert_eq!(state.documents.len().await, 0);
        }
    }

    #[tokio::test]
    async fn test_file_at_size_limit_is_accepted() {
        let config = Config {
            max_upload_bytes: 4096,
            ..test_config()
        };
        let state = test_state_with(config, Arc::new(RecordingBackend::new("unused")), None);

        let exact = "x".repeat(4096);
        let (status, body) = send(
            state.clone(),
            multipart_request("/api/documents/upload", Some(("big.txt", &exact)), Some("Big")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let document = state.documents.get(body["documentId"].as_str().unwrap()).await.unwrap();
        assert_eq!(document.content.len(), 4096);

        let oversized = "x".repeat(4096 + MULTIPART_OVERHEAD_BYTES);
        let (status, _) = send(
            state.clone(),
            multipart_request("/api/documents/upload", Some(("huge.txt", &oversized)), None),
        )
        .await;
        assert_ne!(status, StatusCode::OK);
        assert_eq!(state.documents.len().await, 1);
    }
}
