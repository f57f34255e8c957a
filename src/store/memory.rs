use super::{ArticleStore, StoreError, published_date};
use crate::models::{Article, StoredArticle};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct MemoryInner {
    ids: HashSet<String>,
    /// Insertion order; the index doubles as the tie-breaker for equal timestamps.
    articles: Vec<StoredArticle>,
}

/// In-process [`ArticleStore`] with the same semantics as the SQLite backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.articles.len()
    }
}

impl ArticleStore for MemoryStore {
    async fn init(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert_if_absent(&self, article: &Article) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.ids.insert(article.id.clone()) {
            return Ok(false);
        }
        inner.articles.push(StoredArticle {
            title: article.title.clone(),
            source: article.source.clone(),
            url: article.url.clone(),
            published: article.published.clone(),
            inserted_at: Utc::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
        });
        Ok(true)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<StoredArticle>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.articles.iter().rev().take(limit).cloned().collect())
    }

    async fn todays(&self) -> Result<Vec<StoredArticle>, StoreError> {
        let today = Utc::now().date_naive();
        let inner = self.inner.read().await;
        let mut todays: Vec<StoredArticle> = inner
            .articles
            .iter()
            .filter(|a| a.published.as_deref().and_then(published_date) == Some(today))
            .cloned()
            .collect();
        todays.sort_by(|a, b| b.published.cmp(&a.published));
        Ok(todays)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeedEntry;

    fn article(title: &str, published: Option<&str>) -> Article {
        Article::from_entry(
            FeedEntry {
                title: title.to_string(),
                link: format!("https://example.com/{title}"),
                published: published.map(str::to_string),
            },
            "Example",
        )
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_not_new() {
        let store = MemoryStore::new();
        assert!(store.insert_if_absent(&article("a", None)).await.unwrap());
        assert!(!store.insert_if_absent(&article("a", None)).await.unwrap());
        assert!(store.insert_if_absent(&article("b", None)).await.unwrap());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_recent_is_newest_first() {
        let store = MemoryStore::new();
        for title in ["a", "b", "c"] {
            store.insert_if_absent(&article(title, None)).await.unwrap();
        }
        let titles: Vec<String> = store
            .recent_rows(10)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.title)
            .collect();
        assert_eq!(titles, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_todays_sorted_by_published() {
        let store = MemoryStore::new();
        let today = Utc::now().date_naive();
        let early = format!("{today}T00:00:01");
        let late = format!("{today}T23:59:59");

        store.insert_if_absent(&article("late", Some(&late))).await.unwrap();
        store.insert_if_absent(&article("early", Some(&early))).await.unwrap();
        store
            .insert_if_absent(&article("old", Some("1999-12-31T10:00:00")))
            .await
            .unwrap();

        let titles: Vec<String> = store
            .todays()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.title)
            .collect();
        assert_eq!(titles, vec!["late", "early"]);
    }
}
