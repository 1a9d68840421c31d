use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sentiment classification for news
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "sentiment", rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "positive"),
            Sentiment::Negative => write!(f, "negative"),
            Sentiment::Neutral => write!(f, "neutral"),
        }
    }
}

/// Candidate article as extracted from a source page. Lives only within a
/// single ingestion run.
#[derive(Debug, Clone)]
pub struct RawArticle {
    pub headline: String,
    /// Body snippet; falls back to the headline when the page carries none
    pub content: String,
    /// Absolute URL (relative links are resolved against the source base)
    pub url: String,
    pub source: String,
}

/// A fully tagged news item ready for insertion
#[derive(Debug, Clone, Serialize)]
pub struct CreateNewsItem {
    pub headline: String,
    pub content: String,
    pub source: String,
    pub url: String,
    pub symbol: String,
    pub sentiment: Sentiment,
    pub ai_summary: String,
}

/// A stored news row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct NewsItem {
    pub id: Uuid,
    pub headline: String,
    pub content: String,
    pub source: String,
    pub url: String,
    pub symbol: String,
    pub sentiment: Sentiment,
    pub ai_summary: String,
    pub published_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Response body for an ingestion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestSummary {
    pub success: bool,
    pub scraped: usize,
    pub inserted: usize,
    pub sources: Vec<String>,
}

/// Query parameters for reading stored news
#[derive(Debug, Clone, Deserialize)]
pub struct NewsQueryParams {
    /// Maximum rows to return (default 50, capped at 200)
    pub limit: Option<i64>,
}
