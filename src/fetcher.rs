//! Feed retrieval over HTTP.
//!
//! # Architecture
//!
//! - [`FeedFetcher`]: the seam the orchestrator depends on
//! - [`HttpFetcher`]: the `reqwest` implementation used in production
//!
//! A fetch is attempted exactly once; there is no retry.

use crate::config::FetchSettings;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Failure to retrieve a feed document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, DNS, TLS or timeout failure.
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The response body could not be read to the end.
    #[error("failed to read body: {0}")]
    Body(#[source] reqwest::Error),
}

/// Something that turns a feed URL into the raw feed bytes.
pub trait FeedFetcher {
    /// Fetch the document at `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// [`FeedFetcher`] backed by a shared `reqwest::Client`.
///
/// Every request carries the configured `User-Agent` and is bounded by a
/// fixed timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher from the `fetch` section of the settings.
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(FetchError::Request)?;
        Ok(Self { client })
    }
}

impl FeedFetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let t0 = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::Request)?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "Feed returned non-success status");
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await.map_err(FetchError::Body)?;
        debug!(
            %url,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched feed"
        );
        Ok(body.to_vec())
    }
}
