//! Command-line interface definitions for the news agent.
//!
//! With no action flag the agent ingests every source, then prints today's
//! brief and the recent list. When several action flags are given, the first
//! one in the order `--ingest`, `--brief`, `--funding`, `--recent`, `--html`
//! wins. The config file and database path can also come from the
//! environment.

use clap::{CommandFactory, Parser};
use std::path::PathBuf;

/// Command-line arguments for the news agent.
///
/// # Examples
///
/// ```sh
/// # Ingest, then print today's brief and the recent list
/// news_agent
///
/// # Ranked AI view against a custom database
/// news_agent --brief -d ~/feeds/news.db
///
/// # Static report
/// news_agent --html ./site/index.html -c ./config.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Fetch and store all sources, then print the per-source summary
    #[arg(long)]
    pub ingest: bool,

    /// Print the AI brief ranked by keyword score
    #[arg(long)]
    pub brief: bool,

    /// Print recent funding-related articles
    #[arg(long)]
    pub funding: bool,

    /// Print the most recently ingested articles
    #[arg(long)]
    pub recent: bool,

    /// Write the tabbed HTML report to this path
    #[arg(long, value_name = "PATH")]
    pub html: Option<PathBuf>,

    /// Optional path to a config.yaml file
    #[arg(short, long, env = "NEWS_AGENT_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// SQLite database path; overrides the config file
    #[arg(short, long, env = "NEWS_AGENT_DB", value_name = "PATH")]
    pub database: Option<PathBuf>,
}

/// What a single invocation does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Ingest, then print today's brief and the recent list.
    Default,
    Ingest,
    Brief,
    Funding,
    Recent,
    Html(PathBuf),
}

impl Cli {
    /// Resolve the action flags into one [`Action`].
    pub fn action(&self) -> Action {
        if self.ingest {
            Action::Ingest
        } else if self.brief {
            Action::Brief
        } else if self.funding {
            Action::Funding
        } else if self.recent {
            Action::Recent
        } else if let Some(path) = &self.html {
            Action::Html(path.clone())
        } else {
            Action::Default
        }
    }
}

/// The usage text printed for `--help` and on argument errors.
pub fn usage() -> String {
    Cli::command().render_help().to_string()
}
