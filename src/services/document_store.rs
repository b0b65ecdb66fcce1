// src/services/document_store.rs
//! In-process document storage standing in for a database.

use crate::models::document::{Document, DocumentSummary};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

pub type SharedDocumentStore = Arc<DocumentStore>;

/// Maps document id to document. Ids come from an atomic counter starting at 1,
/// so concurrent uploads never share an id.
pub struct DocumentStore {
    documents: RwLock<HashMap<String, Document>>,
    next_id: AtomicU64,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Assigns the next id, stamps the upload time and stores the document.
    pub async fn insert(&self, name: String, content: String) -> Document {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        let document = Document {
            id: id.clone(),
            name,
            content,
            uploaded_at: Utc::now(),
        };

        let mut documents = self.documents.write().await;
        documents.insert(id, document.clone());
        tracing::debug!("Stored document {} ({} total)", document.id, documents.len());
        document
    }

    pub async fn get(&self, id: &str) -> Option<Document> {
        self.documents.read().await.get(id).cloned()
    }

    /// Summaries ordered by numeric id, i.e. upload order.
    pub async fn list(&self) -> Vec<DocumentSummary> {
        let documents = self.documents.read().await;
        let mut summaries: Vec<DocumentSummary> = documents.values().map(DocumentSummary::from).collect();
        summaries.sort_by_key(|summary| summary.id.parse::<u64>().unwrap_or(u64::MAX));
        summaries
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}
