// src/services/relevance.rs
use rand::Rng;

pub const MIN_RELEVANCE: u8 = 8;
pub const MAX_RELEVANCE: u8 = 10;

/// Cosmetic score shown next to chat answers. It is not derived from the
/// answer or the document.
pub fn relevance_rating() -> u8 {
    rand::thread_rng().gen_range(MIN_RELEVANCE..=MAX_RELEVANCE)
}
