//! Report views over stored articles.
//!
//! Views classify at read time: the rows come straight from the store and are
//! run through the [`Classifier`] on every call.
//!
//! | View | Selection | Order |
//! |------|-----------|-------|
//! | AI brief | AI score > 0 | score desc, then newest insert first |
//! | Funding tracker | funding flag | newest insert first |
//! | Recent / today | none | as returned by the store |
//!
//! The grouped [`Report`] feeds the HTML renderer: the three views `all`,
//! `ai` and `funding`, each grouped by source in first-seen order.

use crate::classifier::Classifier;
use crate::models::StoredArticle;
use itertools::Itertools;

/// An article with its AI score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedArticle {
    pub score: u32,
    pub article: StoredArticle,
}

/// AI-relevant articles from `rows`, best first, at most `limit`.
pub fn ai_brief(
    classifier: &Classifier,
    rows: Vec<StoredArticle>,
    limit: usize,
) -> Vec<RankedArticle> {
    rows.into_iter()
        .map(|article| RankedArticle {
            score: classifier.score_ai(&article.title),
            article,
        })
        .filter(|ranked| ranked.score > 0)
        .sorted_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| b.article.inserted_at.cmp(&a.article.inserted_at))
        })
        .take(limit)
        .collect()
}

/// Funding-related articles from `rows`, newest insert first, at most `limit`.
pub fn funding_tracker(
    classifier: &Classifier,
    rows: Vec<StoredArticle>,
    limit: usize,
) -> Vec<StoredArticle> {
    rows.into_iter()
        .filter(|article| classifier.is_funding(&article.title))
        .sorted_by(|a, b| b.inserted_at.cmp(&a.inserted_at))
        .take(limit)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    All,
    Ai,
    Funding,
}

impl ViewKind {
    pub const ALL: [ViewKind; 3] = [ViewKind::All, ViewKind::Ai, ViewKind::Funding];

    /// Stable identifier, used as the HTML element id.
    pub fn id(&self) -> &'static str {
        match self {
            ViewKind::All => "all",
            ViewKind::Ai => "ai",
            ViewKind::Funding => "funding",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewKind::All => "All",
            ViewKind::Ai => "AI",
            ViewKind::Funding => "Funding",
        }
    }
}

/// Articles of one source within a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceGroup {
    pub source: String,
    pub articles: Vec<StoredArticle>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub kind: ViewKind,
    pub groups: Vec<SourceGroup>,
}

impl View {
    fn new(kind: ViewKind) -> Self {
        Self {
            kind,
            groups: Vec::new(),
        }
    }

    fn push(&mut self, article: StoredArticle) {
        match self.groups.iter_mut().find(|g| g.source == article.source) {
            Some(group) => group.articles.push(article),
            None => self.groups.push(SourceGroup {
                source: article.source.clone(),
                articles: vec![article],
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn article_count(&self) -> usize {
        self.groups.iter().map(|g| g.articles.len()).sum()
    }
}

/// The three grouped views over one scan of recent rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub views: Vec<View>,
}

impl Report {
    pub fn view(&self, kind: ViewKind) -> Option<&View> {
        self.views.iter().find(|v| v.kind == kind)
    }
}

/// Classify `rows` (newest first) into the grouped report.
pub fn build_report(classifier: &Classifier, rows: Vec<StoredArticle>) -> Report {
    let mut all = View::new(ViewKind::All);
    let mut ai = View::new(ViewKind::Ai);
    let mut funding = View::new(ViewKind::Funding);

    for article in rows {
        let classification = classifier.classify(&article.title);
        if classification.is_ai() {
            ai.push(article.clone());
        }
        if classification.funding {
            funding.push(article.clone());
        }
        all.push(article);
    }

    Report {
        views: vec![all, ai, funding],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(title: &str, source: &str, inserted_at: &str) -> StoredArticle {
        StoredArticle {
            title: title.to_string(),
            source: source.to_string(),
            url: format!("https://{}.example/{}", source.to_lowercase(), title.len()),
            published: None,
            inserted_at: inserted_at.to_string(),
        }
    }

    #[test]
    fn test_ai_brief_orders_by_score_then_recency() {
        let classifier = Classifier::default();
        let rows = vec![
            row("Faster inference chips", "A", "2025-06-10 12:00:03.000"),
            row("Quiet news day", "A", "2025-06-10 12:00:02.000"),
            row("AI startup raises $50M", "B", "2025-06-10 12:00:01.000"),
            row("Vector databases compared", "B", "2025-06-10 12:00:04.000"),
        ];

        let brief = ai_brief(&classifier, rows, 10);
        let titles: Vec<&str> = brief.iter().map(|r| r.article.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "AI startup raises $50M",
                "Vector databases compared",
                "Faster inference chips"
            ]
        );
        assert_eq!(brief[0].score, 4);
        assert_eq!(brief[1].score, 2);
    }

    #[test]
    fn test_ai_brief_limit() {
        let classifier = Classifier::default();
        let rows = vec![
            row("New model one", "A", "2025-06-10 12:00:02.000"),
            row("New model two", "A", "2025-06-10 12:00:01.000"),
        ];
        let brief = ai_brief(&classifier, rows, 1);
        assert_eq!(brief.len(), 1);
        assert_eq!(brief[0].article.title, "New model one");
    }

    #[test]
    fn test_funding_tracker_newest_first() {
        let classifier = Classifier::default();
        let rows = vec![
            row("Acme raises seed", "A", "2025-06-10 12:00:01.000"),
            row("Weather report", "A", "2025-06-10 12:00:05.000"),
            row("Lab gets $20M", "B", "2025-06-10 12:00:03.000"),
        ];
        let hits = funding_tracker(&classifier, rows, 10);
        let titles: Vec<&str> = hits.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Lab gets $20M", "Acme raises seed"]);
    }

    #[test]
    fn test_build_report_groups_by_source_in_first_seen_order() {
        let classifier = Classifier::default();
        let rows = vec![
            row("AI startup raises $50M", "B", "3"),
            row("Quiet news day", "A", "2"),
            row("New model weights", "B", "1"),
        ];

        let report = build_report(&classifier, rows);

        let all = report.view(ViewKind::All).unwrap();
        let sources: Vec<&str> = all.groups.iter().map(|g| g.source.as_str()).collect();
        assert_eq!(sources, vec!["B", "A"]);
        assert_eq!(all.groups[0].articles.len(), 2);
        assert_eq!(all.article_count(), 3);

        let ai = report.view(ViewKind::Ai).unwrap();
        assert_eq!(ai.groups.len(), 1);
        assert_eq!(ai.article_count(), 2);

        let funding = report.view(ViewKind::Funding).unwrap();
        assert_eq!(funding.article_count(), 1);
        assert_eq!(funding.groups[0].articles[0].title, "AI startup raises $50M");
    }

    #[test]
    fn test_build_report_empty() {
        let report = build_report(&Classifier::default(), Vec::new());
        assert_eq!(report.views.len(), 3);
        assert!(report.views.iter().all(View::is_empty));
    }
}
