//! Ingestion orchestrator: fetch → parse → dedup-insert, one source at a time.
//!
//! A failure while fetching or parsing one source is recorded in that
//! source's [`SourceOutcome`] and the batch moves on. Nothing is retried.
//!
//! With `concurrency > 1` the fetch+parse step of several sources runs at
//! once through [`StreamExt::buffered`], which still yields results in the
//! configured source order. Inserts always happen on this task, one article
//! at a time, so the store's uniqueness check settles every duplicate.

use crate::config::FetchSettings;
use crate::fetcher::{FeedFetcher, FetchError};
use crate::models::{Article, Source};
use crate::parser::{FeedEntries, ParseError, parse_feed};
use crate::store::{ArticleStore, StoreError};
use crate::utils::truncate_for_log;
use futures::stream::{self, StreamExt};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

/// Everything that can go wrong while ingesting a single source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),

    #[error("store failed: {0}")]
    Store(#[from] StoreError),
}

/// What happened to one source during a batch.
#[derive(Debug)]
pub enum SourceOutcome {
    Ingested {
        added: usize,
    },
    /// `added` counts the articles stored before the failure; it is only
    /// non-zero when the store failed part-way through the feed.
    Failed {
        added: usize,
        error: SourceError,
    },
}

impl SourceOutcome {
    pub fn added(&self) -> usize {
        match self {
            SourceOutcome::Ingested { added } | SourceOutcome::Failed { added, .. } => *added,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, SourceOutcome::Ingested { .. })
    }
}

/// Per-source outcome, tagged with the source name.
#[derive(Debug)]
pub struct SourceReport {
    pub source: String,
    pub outcome: SourceOutcome,
}

/// Result of one ingestion batch, in configured source order.
#[derive(Debug, Default)]
pub struct IngestSummary {
    pub reports: Vec<SourceReport>,
}

impl IngestSummary {
    /// Total number of first-time inserts across all sources.
    pub fn total_added(&self) -> usize {
        self.reports.iter().map(|r| r.outcome.added()).sum()
    }

    pub fn failed(&self) -> usize {
        self.reports.iter().filter(|r| !r.outcome.is_ok()).count()
    }
}

/// Fetch and parse one source's feed.
#[instrument(level = "debug", skip(fetcher, source), fields(source = %source.name))]
pub async fn fetch_entries<F: FeedFetcher>(
    fetcher: &F,
    source: &Source,
    limit: usize,
) -> Result<FeedEntries, SourceError> {
    let bytes = fetcher.fetch(&source.url).await?;
    let entries = parse_feed(&bytes, limit)?;
    debug!(format = ?entries.format(), bytes = bytes.len(), "Feed parsed");
    Ok(entries)
}

/// Insert every entry for `source`, returning how many were new.
async fn store_entries<S: ArticleStore>(
    store: &S,
    source: &Source,
    entries: FeedEntries,
) -> SourceOutcome {
    let mut added = 0;
    for entry in entries {
        let article = Article::from_entry(entry, &source.name);
        match store.insert_if_absent(&article).await {
            Ok(true) => {
                debug!(source = %source.name, id = %article.id, "Stored new article");
                added += 1;
            }
            Ok(false) => {}
            Err(e) => {
                return SourceOutcome::Failed {
                    added,
                    error: e.into(),
                };
            }
        }
    }
    SourceOutcome::Ingested { added }
}

/// Ingest a single source end to end.
pub async fn ingest_source<F: FeedFetcher, S: ArticleStore>(
    fetcher: &F,
    store: &S,
    source: &Source,
    limit: usize,
) -> SourceOutcome {
    match fetch_entries(fetcher, source, limit).await {
        Ok(entries) => store_entries(store, source, entries).await,
        Err(error) => SourceOutcome::Failed { added: 0, error },
    }
}

/// Ingest every source in order and return the per-source outcomes.
#[instrument(level = "info", skip_all, fields(sources = sources.len()))]
pub async fn ingest_all<F: FeedFetcher, S: ArticleStore>(
    fetcher: &F,
    store: &S,
    sources: &[Source],
    settings: &FetchSettings,
) -> IngestSummary {
    let t0 = Instant::now();
    let limit = settings.per_source_limit;
    let concurrency = settings.concurrency.max(1);

    let mut fetched = stream::iter(sources)
        .map(|source| async move { (source, fetch_entries(fetcher, source, limit).await) })
        .buffered(concurrency);

    let mut summary = IngestSummary::default();
    while let Some((source, parsed)) = fetched.next().await {
        let outcome = match parsed {
            Ok(entries) => store_entries(store, source, entries).await,
            Err(error) => SourceOutcome::Failed { added: 0, error },
        };

        match &outcome {
            SourceOutcome::Ingested { added } => {
                info!(source = %source.name, added, "Source ingested");
            }
            SourceOutcome::Failed { added, error } => {
                error!(
                    source = %source.name,
                    added,
                    error = %truncate_for_log(&error.to_string(), 300),
                    "Source failed; continuing"
                );
            }
        }
        summary.reports.push(SourceReport {
            source: source.name.clone(),
            outcome,
        });
    }

    let failed = summary.failed();
    if failed > 0 {
        warn!(failed, "Some sources failed during ingestion");
    }
    info!(
        total_added = summary.total_added(),
        failed,
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "Ingest complete"
    );
    summary
}
