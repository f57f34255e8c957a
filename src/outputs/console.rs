//! Plain-text listings for the terminal.
//!
//! Every function writes to any [`Write`] so the CLI can pass stdout and the
//! tests can pass a buffer.

use crate::ingest::{IngestSummary, SourceOutcome};
use crate::models::StoredArticle;
use crate::utils::truncate_for_log;
use crate::views::RankedArticle;
use std::io::{self, Write};

/// One `[OK]`/`[ERROR]` line per source, then the batch total.
pub fn write_ingest_summary<W: Write>(out: &mut W, summary: &IngestSummary) -> io::Result<()> {
    for report in &summary.reports {
        match &report.outcome {
            SourceOutcome::Ingested { added } => {
                writeln!(out, "[OK] {}: +{}", report.source, added)?;
            }
            SourceOutcome::Failed { error, .. } => {
                writeln!(
                    out,
                    "[ERROR] {}: {}",
                    report.source,
                    truncate_for_log(&error.to_string(), 300)
                )?;
            }
        }
    }
    writeln!(out)?;
    writeln!(out, "Ingest complete. New articles added: {}", summary.total_added())
}

fn write_listing<W: Write>(
    out: &mut W,
    heading: &str,
    empty_notice: &str,
    articles: &[StoredArticle],
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "=== {} ===", heading)?;
    if articles.is_empty() {
        return writeln!(out, "{}", empty_notice);
    }
    for (i, article) in articles.iter().enumerate() {
        writeln!(out, "{}. [{}] {}", i + 1, article.source, article.title)?;
        writeln!(out, "   {}", article.url)?;
    }
    Ok(())
}

pub fn write_todays_brief<W: Write>(out: &mut W, articles: &[StoredArticle]) -> io::Result<()> {
    write_listing(out, "Today's Brief", "No articles today.", articles)
}

pub fn write_recent<W: Write>(
    out: &mut W,
    articles: &[StoredArticle],
    limit: usize,
) -> io::Result<()> {
    write_listing(
        out,
        &format!("Recent Articles (last {} ingested)", limit),
        "No articles yet.",
        articles,
    )
}

pub fn write_funding_tracker<W: Write>(
    out: &mut W,
    articles: &[StoredArticle],
) -> io::Result<()> {
    write_listing(
        out,
        "Funding Tracker",
        "No funding-related items found in recent scan.",
        articles,
    )
}

/// The ranked AI brief; each line carries the article's score.
pub fn write_ai_brief<W: Write>(out: &mut W, ranked: &[RankedArticle]) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "=== AI Brief (ranked) ===")?;
    if ranked.is_empty() {
        return writeln!(out, "No AI-related items found in recent scan.");
    }
    for (i, item) in ranked.iter().enumerate() {
        writeln!(
            out,
            "{}. ({}) [{}] {}",
            i + 1,
            item.score,
            item.article.source,
            item.article.title
        )?;
        writeln!(out, "   {}", item.article.url)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::FetchError;
    use crate::ingest::{SourceError, SourceReport};

    fn article(title: &str, source: &str) -> StoredArticle {
        StoredArticle {
            title: title.to_string(),
            source: source.to_string(),
            url: "https://example.com/x".to_string(),
            published: None,
            inserted_at: "2025-06-10 12:00:00.000".to_string(),
        }
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_ingest_summary_lines() {
        let summary = IngestSummary {
            reports: vec![
                SourceReport {
                    source: "Down".to_string(),
                    outcome: SourceOutcome::Failed {
                        added: 0,
                        error: SourceError::Fetch(FetchError::Status {
                            status: 503,
                            url: "https://down.example/feed".to_string(),
                        }),
                    },
                },
                SourceReport {
                    source: "Up".to_string(),
                    outcome: SourceOutcome::Ingested { added: 4 },
                },
            ],
        };

        let text = render(|out| write_ingest_summary(out, &summary));
        assert!(text.contains("[ERROR] Down: fetch failed: HTTP 503 from https://down.example/feed"));
        assert!(text.contains("[OK] Up: +4"));
        assert!(text.ends_with("Ingest complete. New articles added: 4\n"));
    }

    #[test]
    fn test_listing_numbers_entries() {
        let articles = vec![article("First", "A"), article("Second", "B")];
        let text = render(|out| write_recent(out, &articles, 10));
        assert!(text.contains("=== Recent Articles (last 10 ingested) ==="));
        assert!(text.contains("1. [A] First\n   https://example.com/x\n"));
        assert!(text.contains("2. [B] Second\n"));
    }

    #[test]
    fn test_empty_views_print_notice() {
        assert!(render(|out| write_todays_brief(out, &[])).contains("No articles today."));
        assert!(render(|out| write_ai_brief(out, &[])).contains("No AI-related items"));
        assert!(render(|out| write_funding_tracker(out, &[])).contains("No funding-related items"));
    }

    #[test]
    fn test_ai_brief_shows_score() {
        let ranked = vec![RankedArticle {
            score: 4,
            article: article("AI startup raises $50M", "B"),
        }];
        let text = render(|out| write_ai_brief(out, &ranked));
        assert!(text.contains("1. (4) [B] AI startup raises $50M"));
    }
}
