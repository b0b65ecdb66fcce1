// src/services/mod.rs
pub mod document_store;
pub mod prompt;
pub mod relevance;

pub use document_store::{DocumentStore, SharedDocumentStore};
