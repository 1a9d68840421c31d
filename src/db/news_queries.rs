use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{CreateNewsItem, NewsItem};
use crate::services::ingestion_service::NewsStore;

/// Postgres-backed news storage
pub struct PgNewsStore {
    pool: PgPool,
}

impl PgNewsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NewsStore for PgNewsStore {
    async fn insert(
        &self,
        item: &CreateNewsItem,
        published_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "INSERT INTO news (id, headline, content, source, url, symbol, sentiment, ai_summary, published_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT ON CONSTRAINT news_source_headline_key DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(&item.headline)
        .bind(&item.content)
        .bind(&item.source)
        .bind(&item.url)
        .bind(&item.symbol)
        .bind(item.sentiment)
        .bind(&item.ai_summary)
        .bind(published_at)
        .execute(&self.pool)
        .await?;

        // rows_affected is 0 when the (source, headline) pair already exists
        Ok(result.rows_affected() > 0)
    }
}

pub async fn fetch_recent(pool: &PgPool, limit: i64) -> Result<Vec<NewsItem>, sqlx::Error> {
    sqlx::query_as::<_, NewsItem>(
        "SELECT id, headline, content, source, url, symbol, sentiment, ai_summary,
                published_at, created_at
         FROM news
         ORDER BY published_at DESC
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}
