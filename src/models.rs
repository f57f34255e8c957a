//! Data models shared by the ingestion pipeline and the report views.
//!
//! - [`Source`]: a configured, named feed endpoint
//! - [`FeedEntry`]: one candidate item as it comes out of the feed parser
//! - [`Article`]: the unit of persistence, keyed by its content fingerprint
//! - [`StoredArticle`]: an article read back from the store with its
//!   server-assigned insertion time

use crate::identity::make_id;
use serde::{Deserialize, Serialize};

/// A named feed endpoint.
///
/// Sources are read-only input to the pipeline. Their order controls the
/// order in which feeds are ingested, never the identity of the articles.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Source {
    /// Display name, also stored on every article from this feed.
    pub name: String,
    /// RSS or Atom feed URL.
    pub url: String,
}

impl Source {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A candidate item extracted from a feed document.
///
/// `title` and `link` are already trimmed and non-empty. `published` is the
/// normalized timestamp, or `None` when the feed's date could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub published: Option<String>,
}

/// An article ready to be inserted into the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// Content fingerprint of `(title, source, url)`; the primary key.
    pub id: String,
    pub title: String,
    pub source: String,
    pub url: String,
    /// ISO 8601 publication time, if the feed provided a readable one.
    pub published: Option<String>,
}

impl Article {
    /// Build the persistent record for an entry found in `source`'s feed.
    pub fn from_entry(entry: FeedEntry, source: &str) -> Self {
        Self {
            id: make_id(&entry.title, source, &entry.link),
            title: entry.title,
            source: source.to_string(),
            url: entry.link,
            published: entry.published,
        }
    }
}

/// An article as read back from the store.
///
/// `inserted_at` is assigned by the store on first insert and defines the
/// recency order of every "recent" view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArticle {
    pub title: String,
    pub source: String,
    pub url: String,
    pub published: Option<String>,
    pub inserted_at: String,
}
