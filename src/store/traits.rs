//! `KeywordBackend` trait: the raw paginated interface of the keyword store.
//!
//! The relay never caches keywords across events; every read goes through
//! this trait.

use async_trait::async_trait;

use crate::error::StoreError;

/// Largest page a single `query` call may return.
pub const MAX_PAGE_SIZE: usize = 1000;

/// A stored keyword. `id` is opaque and distinct from `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub id: String,
    pub text: String,
}

impl Keyword {
    /// Build a keyword with a fresh random id.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
        }
    }
}

/// One page of a cursor-driven scan.
#[derive(Debug, Clone, Default)]
pub struct KeywordPage {
    pub items: Vec<Keyword>,
    /// Continuation token. `None` (or empty) ends the scan.
    pub next_cursor: Option<String>,
}

/// Backend-agnostic keyword store.
#[async_trait]
pub trait KeywordBackend: Send + Sync {
    /// Fetch up to `limit` keywords after `cursor`, in insertion order.
    async fn query(&self, limit: usize, cursor: Option<&str>)
    -> Result<KeywordPage, StoreError>;

    /// Store a keyword. Duplicate texts are allowed.
    async fn put(&self, keyword: &Keyword) -> Result<(), StoreError>;

    /// Delete a keyword by id. Deleting an unknown id is not an error.
    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError>;
}
