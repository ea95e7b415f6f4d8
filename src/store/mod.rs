//! Persistence layer: the keyword store and its libSQL backend.

pub mod keywords;
pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use keywords::{DeleteOutcome, KeywordStore};
pub use libsql_backend::LibSqlBackend;
pub use traits::{Keyword, KeywordBackend, KeywordPage, MAX_PAGE_SIZE};
