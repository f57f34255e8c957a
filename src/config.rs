//! Runtime configuration.
//!
//! Settings come from an optional YAML file. Every field has a default, so an
//! empty file (or no file at all) yields a working configuration with the
//! built-in source list.
//!
//! ```yaml
//! database: news.db
//! fetch:
//!   timeout_secs: 20
//!   user_agent: Mozilla/5.0
//!   per_source_limit: 25
//!   concurrency: 1
//! sources:
//!   - name: Hacker News
//!     url: https://hnrss.org/frontpage
//! report:
//!   recent_limit: 10
//! ```

use crate::classifier::Vocabulary;
use crate::models::Source;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, instrument};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("source {name:?} has an invalid feed URL {url:?}")]
    InvalidUrl { name: String, url: String },

    #[error("a source has an empty name")]
    EmptySourceName,

    #[error("source name {0:?} is listed more than once")]
    DuplicateSource(String),
}

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Path of the SQLite database file.
    pub database: String,
    pub fetch: FetchSettings,
    /// Feeds to ingest, in ingestion order.
    pub sources: Vec<Source>,
    pub vocabulary: Vocabulary,
    pub report: ReportSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: "news.db".to_string(),
            fetch: FetchSettings::default(),
            sources: default_sources(),
            vocabulary: Vocabulary::default(),
            report: ReportSettings::default(),
        }
    }
}

/// How feeds are fetched and how much of each is considered.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Maximum number of candidate items read from one feed per run.
    pub per_source_limit: usize,
    /// Number of feeds fetched at once; 1 keeps ingestion fully sequential.
    pub concurrency: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 20,
            user_agent: "Mozilla/5.0".to_string(),
            per_source_limit: 25,
            concurrency: 1,
        }
    }
}

/// Sizes of the report views.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportSettings {
    pub recent_limit: usize,
    pub ai_limit: usize,
    pub ai_scan: usize,
    pub funding_limit: usize,
    pub funding_scan: usize,
    pub html_scan: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            recent_limit: 10,
            ai_limit: 15,
            ai_scan: 200,
            funding_limit: 20,
            funding_scan: 300,
            html_scan: 300,
        }
    }
}

impl Settings {
    /// Load settings from `path`, or fall back to the defaults when no path is
    /// given. The result is validated before it is returned.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let settings = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                let settings = Self::from_yaml(&raw)?;
                info!(path = %path.display(), sources = settings.sources.len(), "Loaded configuration");
                settings
            }
            None => {
                debug!("No config file given; using built-in defaults");
                Self::default()
            }
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from YAML text. An empty document gives the defaults.
    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Check that every source has a unique, non-empty name and an http(s) URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(ConfigError::EmptySourceName);
            }
            if !seen.insert(source.name.as_str()) {
                return Err(ConfigError::DuplicateSource(source.name.clone()));
            }
            let valid = url::Url::parse(&source.url)
                .map(|u| matches!(u.scheme(), "http" | "https"))
                .unwrap_or(false);
            if !valid {
                return Err(ConfigError::InvalidUrl {
                    name: source.name.clone(),
                    url: source.url.clone(),
                });
            }
        }
        Ok(())
    }
}

/// The feeds ingested when no config file overrides them.
pub fn default_sources() -> Vec<Source> {
    vec![
        Source::new(
            "TechCrunch AI",
            "https://techcrunch.com/category/artificial-intelligence/feed/",
        ),
        Source::new("VentureBeat AI", "https://venturebeat.com/category/ai/feed/"),
        Source::new(
            "MIT Technology Review",
            "https://www.technologyreview.com/feed/",
        ),
        Source::new(
            "The Verge AI",
            "https://www.theverge.com/rss/ai-artificial-intelligence/index.xml",
        ),
        Source::new("OpenAI News", "https://openai.com/news/rss.xml"),
        Source::new("Hacker News", "https://hnrss.org/frontpage"),
        Source::new("arXiv cs.AI", "https://rss.arxiv.org/rss/cs.AI"),
    ]
}
