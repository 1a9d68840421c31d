use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{error, info};

use crate::db::{holding_queries, news_queries};
use crate::db::news_queries::PgNewsStore;
use crate::errors::AppError;
use crate::models::{IngestSummary, NewsItem, NewsQueryParams};
use crate::services::relevance;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(fetch_news))
        .route("/ingest", post(ingest_news))
        .route("/relevant", get(fetch_relevant_news))
}

/// POST /api/news/ingest
///
/// Run one full ingestion pass: scrape all configured sources, tag, and
/// persist. Always answers with a summary when the run completes, even if
/// every source came back empty.
#[axum::debug_handler]
pub async fn ingest_news(
    State(state): State<AppState>,
) -> Result<Json<IngestSummary>, AppError> {
    info!("POST /api/news/ingest - Starting ingestion run");

    let store = PgNewsStore::new(state.pool.clone());
    let summary = state.ingestion.run(&store).await.map_err(|e| {
        error!("Ingestion run failed: {}", e);
        e
    })?;

    Ok(Json(summary))
}

/// GET /api/news?limit=N
///
/// Stored news, most recent first
#[axum::debug_handler]
pub async fn fetch_news(
    State(state): State<AppState>,
    Query(params): Query<NewsQueryParams>,
) -> Result<Json<Vec<NewsItem>>, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    info!("GET /api/news - Fetching latest news (limit={})", limit);

    let news = news_queries::fetch_recent(&state.pool, limit)
        .await
        .map_err(|e| {
            error!("Failed to fetch news: {}", e);
            AppError::Db(e)
        })?;

    Ok(Json(news))
}

/// GET /api/news/relevant?limit=N
///
/// Stored news narrowed to the current holdings (plus index-level items).
/// With no holdings the full list is returned.
#[axum::debug_handler]
pub async fn fetch_relevant_news(
    State(state): State<AppState>,
    Query(params): Query<NewsQueryParams>,
) -> Result<Json<Vec<NewsItem>>, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    info!(
        "GET /api/news/relevant - Fetching portfolio news (limit={})",
        limit
    );

    let held_symbols = holding_queries::fetch_symbols(&state.pool)
        .await
        .map_err(|e| {
            error!("Failed to fetch held symbols: {}", e);
            AppError::Db(e)
        })?;

    let news = news_queries::fetch_recent(&state.pool, limit)
        .await
        .map_err(|e| {
            error!("Failed to fetch news: {}", e);
            AppError::Db(e)
        })?;

    Ok(Json(relevance::filter_by_portfolio(news, &held_symbols)))
}
