// src/handlers/mod.rs
pub mod chat;
pub mod documents;
pub mod pages;
pub mod status;
