use super::{ArticleStore, StoreError};
use crate::models::{Article, StoredArticle};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

const MIGRATIONS: &[&str] = &[r#"
    CREATE TABLE IF NOT EXISTS articles (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        source TEXT NOT NULL,
        url TEXT NOT NULL,
        published TEXT,
        inserted_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
    )
    "#];

/// SQLite-backed [`ArticleStore`].
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    db_path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (creating if needed) the database file at `db_path`.
    #[instrument(level = "info", fields(path = %db_path.display()))]
    pub async fn open(db_path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        info!("Opened article database");

        Ok(Self {
            pool,
            db_path: Some(db_path.to_path_buf()),
        })
    }

    /// A private in-memory database, gone when the store is dropped.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let options: SqliteConnectOptions = "sqlite::memory:".parse()?;
        // Every connection to `:memory:` is its own database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Ok(Self { pool, db_path: None })
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    async fn fetch_articles(
        &self,
        sql: &str,
        limit: Option<usize>,
    ) -> Result<Vec<StoredArticle>, StoreError> {
        let mut query = sqlx::query(sql);
        if let Some(limit) = limit {
            query = query.bind(limit as i64);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(row_to_article).collect()
    }
}

fn row_to_article(row: &SqliteRow) -> Result<StoredArticle, StoreError> {
    Ok(StoredArticle {
        title: row.try_get("title")?,
        source: row.try_get("source")?,
        url: row.try_get("url")?,
        published: row.try_get("published")?,
        inserted_at: row.try_get("inserted_at")?,
    })
}

impl ArticleStore for SqliteStore {
    async fn init(&self) -> Result<(), StoreError> {
        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration).execute(&self.pool).await?;
            debug!(migration = i, "Applied migration");
        }
        Ok(())
    }

    async fn insert_if_absent(&self, article: &Article) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO articles (id, title, source, url, published)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&article.id)
        .bind(&article.title)
        .bind(&article.source)
        .bind(&article.url)
        .bind(article.published.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<StoredArticle>, StoreError> {
        self.fetch_articles(
            r#"
            SELECT title, source, url, published, inserted_at
            FROM articles
            ORDER BY inserted_at DESC, rowid DESC
            LIMIT ?
            "#,
            Some(limit),
        )
        .await
    }

    async fn todays(&self) -> Result<Vec<StoredArticle>, StoreError> {
        self.fetch_articles(
            r#"
            SELECT title, source, url, published, inserted_at
            FROM articles
            WHERE published IS NOT NULL
              AND date(published) = date('now')
            ORDER BY published DESC
            "#,
            None,
        )
        .await
    }
}
