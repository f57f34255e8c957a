//! Static HTML report.
//!
//! A single self-contained page (inline CSS and a few lines of JS) with one
//! tab per view. Each view lists its sources in first-seen order with one card
//! per article. Keys `1`/`2`/`3` switch tabs.

use crate::utils::{ensure_parent_writable, snippet};
use crate::views::{Report, View, ViewKind};
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::error::Error;
use std::path::Path;
use tracing::{info, instrument};

/// Titles longer than this are shortened in the card snippet.
const SNIPPET_CHARS: usize = 120;

const STYLE: &str = r#"
:root {
  --bg: #0f1115;
  --card: #161a22;
  --text: #e5e7eb;
  --muted: #9ca3af;
  --accent: #3b82f6;
  --border: #232834;
}
body {
  margin: 0;
  padding: 24px;
  background: var(--bg);
  color: var(--text);
  font-family: Inter, Segoe UI, Arial, sans-serif;
}
h1 { margin-bottom: 6px; }
p { color: var(--muted); }
.tabs { display: flex; gap: 12px; margin: 24px 0; }
.tab {
  padding: 8px 14px;
  border-radius: 8px;
  background: var(--card);
  cursor: pointer;
  border: 1px solid var(--border);
  color: var(--muted);
}
.tab.active { color: white; border-color: var(--accent); background: #1e293b; }
.view { display: none; }
.view.active { display: block; }
.source { margin-top: 32px; }
.source h2 {
  font-size: 1.1rem;
  color: #c7d2fe;
  margin-bottom: 14px;
  border-bottom: 1px solid var(--border);
  padding-bottom: 6px;
}
.grid {
  display: grid;
  grid-template-columns: repeat(auto-fill, minmax(300px, 1fr));
  gap: 16px;
}
.card {
  background: var(--card);
  border-radius: 12px;
  padding: 14px 16px;
  border: 1px solid var(--border);
  display: flex;
  flex-direction: column;
  justify-content: space-between;
}
.card a { color: #93c5fd; font-weight: 600; text-decoration: none; }
.card a:hover { text-decoration: underline; }
.snippet { margin-top: 8px; font-size: 0.9rem; color: var(--muted); }
.meta { margin-top: 10px; font-size: 0.75rem; color: #6b7280; }
.footer { margin-top: 28px; font-size: 0.8rem; color: var(--muted); }
@media (max-width: 520px) {
  .grid { grid-template-columns: 1fr; }
}
"#;

const SCRIPT: &str = r#"
document.querySelectorAll('.tab').forEach(function (t) {
  t.addEventListener('click', function () {
    var target = t.getAttribute('data-target');
    document.querySelectorAll('.view').forEach(function (v) { v.classList.remove('active'); });
    document.querySelectorAll('.tab').forEach(function (x) { x.classList.remove('active'); });
    document.getElementById(target).classList.add('active');
    t.classList.add('active');
  });
});
document.addEventListener('keydown', function (e) {
  var el = document.activeElement;
  if (el && (el.tagName === 'INPUT' || el.tagName === 'TEXTAREA')) return;
  var ids = { '1': 'all', '2': 'ai', '3': 'funding' };
  var id = ids[e.key];
  if (id) document.querySelector('.tab[data-target="' + id + '"]').click();
});
"#;

/// Render `report` as a complete HTML document.
///
/// `footer_note` names where the data came from (usually the database path).
pub fn render_report(report: &Report, footer_note: &str) -> String {
    let mut page = String::new();
    page.push_str("<!doctype html>\n<html>\n<head>\n");
    page.push_str("<meta charset='utf-8'>\n");
    page.push_str("<meta name='viewport' content='width=device-width, initial-scale=1'>\n");
    page.push_str("<title>AI News Agent</title>\n");
    page.push_str(&format!("<style>{}</style>\n", STYLE));
    page.push_str("</head>\n<body>\n");
    page.push_str("<h1>AI News Agent</h1>\n");
    page.push_str("<p>Local, curated AI signal</p>\n");

    page.push_str("<div class='tabs'>\n");
    for (i, kind) in ViewKind::ALL.iter().enumerate() {
        let active = if i == 0 { " active" } else { "" };
        page.push_str(&format!(
            "<div class='tab{}' data-target='{}'>{}</div>\n",
            active,
            kind.id(),
            kind.label()
        ));
    }
    page.push_str("</div>\n");

    for (i, kind) in ViewKind::ALL.iter().enumerate() {
        match report.view(*kind) {
            Some(view) => render_view(&mut page, view, i == 0),
            None => render_view(
                &mut page,
                &View {
                    kind: *kind,
                    groups: Vec::new(),
                },
                i == 0,
            ),
        }
    }

    page.push_str(&format!("<script>{}</script>\n", SCRIPT));
    page.push_str(&format!(
        "<div class='footer'>Generated from <code>{}</code>. Re-run the ingest to refresh.</div>\n",
        encode_text(footer_note)
    ));
    page.push_str("</body></html>\n");
    page
}

fn render_view(page: &mut String, view: &View, active: bool) {
    let class_active = if active { " active" } else { "" };
    page.push_str(&format!(
        "<div id='{}' class='view{}'>\n",
        view.kind.id(),
        class_active
    ));

    if view.is_empty() {
        page.push_str("<p style='color:var(--muted)'>No items in this view.</p>\n");
    }

    for group in &view.groups {
        page.push_str(&format!(
            "<div class='source'><h2>{}</h2><div class='grid'>\n",
            encode_text(&group.source)
        ));
        for article in &group.articles {
            let heading = if is_web_link(&article.url) {
                format!(
                    "<a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a>",
                    encode_double_quoted_attribute(&article.url),
                    encode_text(&article.title)
                )
            } else {
                format!("<span>{}</span>", encode_text(&article.title))
            };
            page.push_str(&format!(
                "<div class='card'><div>{}<div class='snippet'>{}</div></div>\
                 <div class='meta'>{}</div></div>\n",
                heading,
                encode_text(&snippet(&article.title, SNIPPET_CHARS)),
                encode_text(article.published.as_deref().unwrap_or("")),
            ));
        }
        page.push_str("</div></div>\n");
    }

    page.push_str("</div>\n");
}

/// Only `http`/`https` links are rendered as anchors.
fn is_web_link(link: &str) -> bool {
    url::Url::parse(link)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Render `report` and write it to `path`, creating parent directories.
#[instrument(level = "info", skip(report), fields(path = %path.display()))]
pub async fn write_report(
    report: &Report,
    path: &Path,
    footer_note: &str,
) -> Result<(), Box<dyn Error>> {
    ensure_parent_writable(path).await?;
    let page = render_report(report, footer_note);
    tokio::fs::write(path, page).await?;
    info!(
        articles = report.view(ViewKind::All).map(View::article_count).unwrap_or(0),
        "Wrote HTML report"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classifier;
    use crate::models::StoredArticle;
    use crate::views::build_report;

    fn row(title: &str, source: &str, url: &str) -> StoredArticle {
        StoredArticle {
            title: title.to_string(),
            source: source.to_string(),
            url: url.to_string(),
            published: Some("2025-06-10T14:30:00".to_string()),
            inserted_at: "2025-06-10 14:31:00.000".to_string(),
        }
    }

    #[test]
    fn test_render_has_three_views_and_escapes() {
        let report = build_report(
            &Classifier::default(),
            vec![
                row("AI startup raises $50M", "Tech <Daily>", "https://x.example/?a=1&b=\"2\""),
                row("Quiet news day", "Plain", "https://y.example/"),
            ],
        );
        let page = render_report(&report, "news.db");

        assert!(page.contains("<div id='all' class='view active'>"));
        assert!(page.contains("<div id='ai' class='view'>"));
        assert!(page.contains("<div id='funding' class='view'>"));
        assert!(page.contains("<h2>Tech &lt;Daily&gt;</h2>"));
        assert!(page.contains("href=\"https://x.example/?a=1&amp;b=&quot;2&quot;\""));
        assert!(page.contains("<div class='meta'>2025-06-10T14:30:00</div>"));
        assert!(page.contains("<code>news.db</code>"));
        assert!(!page.contains("<h2>Tech <Daily></h2>"));
    }

    #[test]
    fn test_non_web_links_are_not_clickable() {
        let report = build_report(
            &Classifier::default(),
            vec![
                row("Sneaky", "S", "javascript:alert(1)"),
                row("Relative", "S", "/posts/1"),
                row("Fine", "S", "HTTPS://ok.example/1"),
            ],
        );
        let page = render_report(&report, "news.db");

        assert!(!page.contains("javascript:"));
        assert!(!page.contains("href=\"/posts/1\""));
        assert!(page.contains("<span>Sneaky</span>"));
        assert!(page.contains("<span>Relative</span>"));
        assert!(page.contains("href=\"HTTPS://ok.example/1\""));
    }

    #[test]
    fn test_empty_views_show_notice() {
        let report = build_report(&Classifier::default(), Vec::new());
        let page = render_report(&report, "news.db");
        assert_eq!(page.matches("No items in this view.").count(), 3);
    }

    #[test]
    fn test_long_titles_are_snipped() {
        let title = "x".repeat(150);
        let report = build_report(
            &Classifier::default(),
            vec![row(&title, "S", "https://s.example/")],
        );
        let page = render_report(&report, "news.db");
        assert!(page.contains(&format!("<div class='snippet'>{}...</div>", "x".repeat(117))));
    }

    #[tokio::test]
    async fn test_write_report_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site").join("index.html");
        let report = build_report(
            &Classifier::default(),
            vec![row("New model", "S", "https://s.example/")],
        );

        write_report(&report, &path, "news.db").await.unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<!doctype html>"));
        assert!(written.contains("New model"));
    }
}
