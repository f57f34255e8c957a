//! Persistent article storage.
//!
//! # Backends
//!
//! | Backend | Module | Notes |
//! |---------|--------|-------|
//! | SQLite | [`sqlite`] | The on-disk store used by the CLI |
//! | Memory | [`memory`] | Same semantics, kept in process; used by tests |
//!
//! Every backend enforces uniqueness on the article id. Inserting an article
//! whose id is already present is a normal outcome reported as `false`, not
//! an error. Each insert is its own atomic unit; there is no batch-wide
//! transaction, so readers may observe a partially ingested batch.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::models::{Article, StoredArticle};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The storage operations the pipeline and the report views rely on.
pub trait ArticleStore {
    /// Create the schema if it does not exist yet. Safe to call repeatedly.
    async fn init(&self) -> Result<(), StoreError>;

    /// Insert `article` unless its id is already stored.
    ///
    /// Returns `true` only for a first-time insert.
    async fn insert_if_absent(&self, article: &Article) -> Result<bool, StoreError>;

    /// The `limit` most recently inserted articles, newest first.
    async fn recent(&self, limit: usize) -> Result<Vec<StoredArticle>, StoreError>;

    /// Articles whose publication date is today (UTC), latest published first.
    async fn todays(&self) -> Result<Vec<StoredArticle>, StoreError>;

    /// The rows the classified views are computed from: the `limit` most
    /// recently inserted articles with their full metadata.
    async fn recent_rows(&self, limit: usize) -> Result<Vec<StoredArticle>, StoreError> {
        self.recent(limit).await
    }
}

/// Calendar date (UTC) of a normalized `published` value.
///
/// Accepts RFC 3339 timestamps, zone-less `YYYY-MM-DDTHH:MM:SS` values and
/// anything starting with a `YYYY-MM-DD` date.
pub(crate) fn published_date(published: &str) -> Option<NaiveDate> {
    let published = published.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(published) {
        return Some(dt.naive_utc().date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(published, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    published
        .get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
}
