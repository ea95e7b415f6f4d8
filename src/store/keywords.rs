//! KeywordStore: full-set reads and single-entry mutations over a backend.
//!
//! Reads always scan every page before returning; a failed page fails the
//! whole call and nothing partial is handed back.

use std::sync::Arc;

use futures::stream::{self, Stream, TryStreamExt};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::store::traits::{Keyword, KeywordBackend, MAX_PAGE_SIZE};

/// Result of `delete_first_matching`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub deleted: bool,
}

/// Where a paged scan stands between fetches.
enum ScanState {
    Start,
    After(String),
    Done,
}

/// Keyword accessor shared by every event handler.
///
/// Holds no keyword data itself; each call reads the backend afresh.
#[derive(Clone)]
pub struct KeywordStore {
    backend: Arc<dyn KeywordBackend>,
    page_size: usize,
}

impl KeywordStore {
    pub fn new(backend: Arc<dyn KeywordBackend>) -> Self {
        Self {
            backend,
            page_size: MAX_PAGE_SIZE,
        }
    }

    /// Use a smaller page size. Values are clamped to `1..=MAX_PAGE_SIZE`.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    async fn next_page(
        &self,
        state: ScanState,
    ) -> Result<Option<(Vec<Keyword>, ScanState)>, StoreError> {
        let cursor = match state {
            ScanState::Done => return Ok(None),
            ScanState::Start => None,
            ScanState::After(cursor) => Some(cursor),
        };

        let page = self.backend.query(self.page_size, cursor.as_deref()).await?;
        let next = match page.next_cursor.filter(|c| !c.is_empty()) {
            Some(cursor) => ScanState::After(cursor),
            None => ScanState::Done,
        };
        Ok(Some((page.items, next)))
    }

    /// Pages of the full keyword set, in arrival order.
    fn pages(&self) -> impl Stream<Item = Result<Vec<Keyword>, StoreError>> + '_ {
        stream::try_unfold(ScanState::Start, move |state| self.next_page(state))
    }

    /// Lazy, restartable sequence of every keyword. Each call starts a new scan.
    pub fn stream(&self) -> impl Stream<Item = Result<Keyword, StoreError>> + '_ {
        self.pages()
            .map_ok(|items| stream::iter(items.into_iter().map(Ok::<Keyword, StoreError>)))
            .try_flatten()
    }

    /// Read the whole keyword set.
    pub async fn list_all(&self) -> Result<Vec<Keyword>, StoreError> {
        let mut pages = std::pin::pin!(self.pages());
        let mut keywords = Vec::new();
        let mut fetched = 0usize;

        while let Some(items) = pages.try_next().await? {
            fetched += 1;
            keywords.extend(items);
        }

        debug!(pages = fetched, total = keywords.len(), "Keyword scan complete");
        Ok(keywords)
    }

    /// Store a new keyword under a fresh id. Existing duplicates are not checked.
    pub async fn insert(&self, text: &str) -> Result<String, StoreError> {
        let keyword = Keyword::new(text);
        self.backend.put(&keyword).await?;
        info!(id = %keyword.id, keyword = %keyword.text, "Keyword added");
        Ok(keyword.id)
    }

    /// Delete the first stored keyword whose text equals `text` exactly.
    ///
    /// Later duplicates stay in the store.
    pub async fn delete_first_matching(&self, text: &str) -> Result<DeleteOutcome, StoreError> {
        let keywords = self.list_all().await?;
        let Some(found) = keywords.into_iter().find(|k| k.text == text) else {
            debug!(keyword = %text, "No keyword to delete");
            return Ok(DeleteOutcome { deleted: false });
        };

        self.backend.delete_by_id(&found.id).await?;
        info!(id = %found.id, keyword = %found.text, "Keyword deleted");
        Ok(DeleteOutcome { deleted: true })
    }
}

// ── Tests ───────────────────────────────────────────────────────────
