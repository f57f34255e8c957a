//! # News Agent
//!
//! A local news pipeline: pulls RSS and Atom feeds from a list of sources,
//! stores each headline once in SQLite, and reads the store back through
//! keyword views aimed at AI and startup-funding news.
//!
//! ## Features
//!
//! - Fetches every configured feed with a bounded timeout and a fixed
//!   `User-Agent`, isolating failures per source
//! - Parses RSS 2.0 and Atom 1.0 into title/link/date entries
//! - Deduplicates by a SHA-256 fingerprint of title, source and link
//! - Ranks titles by AI keyword score and flags funding news
//! - Prints terminal listings or writes a tabbed static HTML report
//!
//! ## Usage
//!
//! ```sh
//! news_agent              # ingest, then today's brief and the recent list
//! news_agent --brief      # ranked AI view
//! news_agent --html site/index.html
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching**: download each feed ([`fetcher`])
//! 2. **Parsing**: extract entries and normalize dates ([`parser`])
//! 3. **Storing**: fingerprint and insert-if-absent ([`identity`], [`store`])
//! 4. **Reporting**: classify at read time ([`classifier`], [`views`], [`outputs`])
//!
//! Diagnostics go to stderr through `tracing`; listings go to stdout.

use clap::Parser;
use clap::error::ErrorKind;
use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod classifier;
mod cli;
mod config;
mod fetcher;
mod identity;
mod ingest;
mod models;
mod outputs;
mod parser;
mod store;
mod utils;
mod views;

use classifier::Classifier;
use cli::{Action, Cli};
use config::Settings;
use fetcher::HttpFetcher;
use outputs::{console, html};
use store::{ArticleStore, SqliteStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();

    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.print()?;
            return Ok(());
        }
        Err(e) => {
            eprintln!("error: {}", e.kind());
            eprintln!("{}", cli::usage());
            std::process::exit(1);
        }
    };
    debug!(?args, "Parsed CLI arguments");

    let settings = Settings::load(args.config.as_deref())?;
    let db_path = args
        .database
        .clone()
        .unwrap_or_else(|| PathBuf::from(&settings.database));

    let store = SqliteStore::open(&db_path).await?;
    store.init().await?;
    let classifier = Classifier::new(&settings.vocabulary)?;
    info!(
        db = ?store.db_path(),
        vocabulary_version = classifier.version(),
        "Store and classifier ready"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let report = &settings.report;

    match args.action() {
        Action::Default => {
            run_ingest(&store, &settings, &mut out).await?;
            console::write_todays_brief(&mut out, &store.todays().await?)?;
            console::write_recent(&mut out, &store.recent(report.recent_limit).await?, report.recent_limit)?;
        }
        Action::Ingest => {
            run_ingest(&store, &settings, &mut out).await?;
        }
        Action::Brief => {
            let rows = store.recent_rows(report.ai_scan).await?;
            let ranked = views::ai_brief(&classifier, rows, report.ai_limit);
            console::write_ai_brief(&mut out, &ranked)?;
        }
        Action::Funding => {
            let rows = store.recent_rows(report.funding_scan).await?;
            let hits = views::funding_tracker(&classifier, rows, report.funding_limit);
            console::write_funding_tracker(&mut out, &hits)?;
        }
        Action::Recent => {
            let rows = store.recent(report.recent_limit).await?;
            console::write_recent(&mut out, &rows, report.recent_limit)?;
        }
        Action::Html(path) => {
            let rows = store.recent_rows(report.html_scan).await?;
            let grouped = views::build_report(&classifier, rows);
            html::write_report(&grouped, &path, &db_path.display().to_string()).await?;
            writeln!(out, "Wrote {}", path.display())?;
        }
    }
    out.flush()?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

async fn run_ingest<W: Write>(
    store: &SqliteStore,
    settings: &Settings,
    out: &mut W,
) -> Result<(), Box<dyn Error>> {
    let fetcher = HttpFetcher::new(&settings.fetch)?;
    let summary = ingest::ingest_all(&fetcher, store, &settings.sources, &settings.fetch).await;
    console::write_ingest_summary(out, &summary)?;
    Ok(())
}
