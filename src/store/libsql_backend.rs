//! libSQL backend: async `KeywordBackend` implementation.
//!
//! Supports local file and in-memory databases. Pages are keyed on the
//! autoincrement `seq` column; the cursor is the last `seq` of a full page.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::store::migrations;
use crate::store::traits::{Keyword, KeywordBackend, KeywordPage, MAX_PAGE_SIZE};

/// libSQL keyword store.
///
/// Holds one connection for every operation; an in-memory database only
/// lives as long as that connection.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_database(db).await?;
        info!(path = %path.display(), "Keyword database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| StoreError::Pool(format!("Failed to create in-memory database: {e}")))?;

        Self::from_database(db).await
    }

    async fn from_database(db: LibSqlDatabase) -> Result<Self, StoreError> {
        let conn = db
            .connect()
            .map_err(|e| StoreError::Pool(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn).await?;

        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }
}

fn parse_cursor(cursor: Option<&str>) -> Result<i64, StoreError> {
    match cursor.filter(|c| !c.is_empty()) {
        Some(raw) => raw
            .parse::<i64>()
            .map_err(|_| StoreError::Query(format!("invalid cursor: {raw:?}"))),
        None => Ok(0),
    }
}

#[async_trait]
impl KeywordBackend for LibSqlBackend {
    async fn query(
        &self,
        limit: usize,
        cursor: Option<&str>,
    ) -> Result<KeywordPage, StoreError> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let after = parse_cursor(cursor)?;

        let mut rows = self
            .conn
            .query(
                "SELECT seq, id, keyword FROM keywords WHERE seq > ?1 ORDER BY seq LIMIT ?2",
                params![after, limit as i64],
            )
            .await
            .map_err(|e| StoreError::Query(format!("query: {e}")))?;

        let mut items = Vec::with_capacity(limit);
        let mut last_seq = after;
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| StoreError::Query(format!("query: {e}")))?
        {
            last_seq = row
                .get::<i64>(0)
                .map_err(|e| StoreError::Query(format!("query row parse: {e}")))?;
            items.push(Keyword {
                id: row
                    .get::<String>(1)
                    .map_err(|e| StoreError::Query(format!("query row parse: {e}")))?,
                text: row
                    .get::<String>(2)
                    .map_err(|e| StoreError::Query(format!("query row parse: {e}")))?,
            });
        }

        // A short page is the last one; a full page may have more behind it.
        let next_cursor = (items.len() == limit).then(|| last_seq.to_string());
        debug!(after, returned = items.len(), "Keyword page fetched");

        Ok(KeywordPage { items, next_cursor })
    }

    async fn put(&self, keyword: &Keyword) -> Result<(), StoreError> {
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO keywords (id, keyword, created_at) VALUES (?1, ?2, ?3)",
                params![keyword.id.as_str(), keyword.text.as_str(), now],
            )
            .await
            .map_err(|e| StoreError::Write(format!("put: {e}")))?;

        debug!(id = %keyword.id, "Keyword row inserted");
        Ok(())
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError> {
        let count = self
            .conn
            .execute("DELETE FROM keywords WHERE id = ?1", params![id])
            .await
            .map_err(|e| StoreError::Write(format!("delete_by_id: {e}")))?;

        debug!(id, removed = count, "Keyword row deleted");
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> LibSqlBackend {
        LibSqlBackend::new_memory().await.unwrap()
    }

    #[tokio::test]
    async fn put_and_query() {
        let db = test_db().await;
        let kw = Keyword::new("rust");
        db.put(&kw).await.unwrap();

        let page = db.query(10, None).await.unwrap();
        assert_eq!(page.items, vec![kw]);
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test]
    async fn empty_store_returns_empty_page() {
        let db = test_db().await;
        let page = db.query(MAX_PAGE_SIZE, None).await.unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test]
    async fn full_page_carries_cursor() {
        let db = test_db().await;
        for text in ["a", "b", "c"] {
            db.put(&Keyword::new(text)).await.unwrap();
        }

        let first = db.query(2, None).await.unwrap();
        let texts: Vec<_> = first.items.iter().map(|k| k.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b"]);
        let cursor = first.next_cursor.expect("full page should carry a cursor");

        let second = db.query(2, Some(&cursor)).await.unwrap();
        let texts: Vec<_> = second.items.iter().map(|k| k.text.as_str()).collect();
        assert_eq!(texts, vec!["c"]);
        assert!(second.next_cursor.is_none());
    }

    #[tokio::test]
    async fn limit_is_capped() {
        let db = test_db().await;
        db.put(&Keyword::new("only")).await.unwrap();

        // Zero is raised to one, so a single row fills the page.
        let page = db.query(0, None).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert!(page.next_cursor.is_some());
    }

    #[tokio::test]
    async fn invalid_cursor_is_a_query_error() {
        let db = test_db().await;
        let err = db.query(10, Some("not-a-number")).await.unwrap_err();
        assert!(matches!(err, StoreError::Query(_)));
    }

    #[tokio::test]
    async fn duplicate_texts_are_allowed() {
        let db = test_db().await;
        db.put(&Keyword::new("x")).await.unwrap();
        db.put(&Keyword::new("x")).await.unwrap();

        let page = db.query(10, None).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert_ne!(page.items[0].id, page.items[1].id);
    }

    #[tokio::test]
    async fn duplicate_id_is_a_write_error() {
        let db = test_db().await;
        let kw = Keyword::new("x");
        db.put(&kw).await.unwrap();
        let err = db.put(&kw).await.unwrap_err();
        assert!(matches!(err, StoreError::Write(_)));
    }

    #[tokio::test]
    async fn delete_by_id_removes_only_that_row() {
        let db = test_db().await;
        let keep = Keyword::new("keep");
        let drop = Keyword::new("drop");
        db.put(&keep).await.unwrap();
        db.put(&drop).await.unwrap();

        db.delete_by_id(&drop.id).await.unwrap();
        db.delete_by_id("missing-id").await.unwrap();

        let page = db.query(10, None).await.unwrap();
        assert_eq!(page.items, vec![keep]);
    }

    #[tokio::test]
    async fn new_local_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("nested").join("dir").join("keywords.db");
        let db = LibSqlBackend::new_local(&db_path).await.unwrap();
        db.put(&Keyword::new("persisted")).await.unwrap();
        assert!(db_path.exists());
    }
}
