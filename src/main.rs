mod app;
mod db;
mod errors;
mod logging;
mod models;
mod routes;
mod services;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use crate::services::analysis_service::{AnalysisConfig, AnalysisService};
use crate::services::ingestion_service::IngestionService;
use crate::services::scrape::ScrapeConfig;
use crate::services::tagging::{Tagger, TaggingConfig};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    logging::init_logging(logging::LoggingConfig::from_env())?;

    let database_url = std::env::var("DATABASE_URL")?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;

    sqlx::migrate!().run(&pool).await?;

    let tagger = Tagger::new(TaggingConfig::default())?;
    let ingestion = IngestionService::new(ScrapeConfig::from_env(), tagger)?;
    let analysis = AnalysisService::new(AnalysisConfig::from_env());

    let state = AppState {
        pool,
        ingestion: Arc::new(ingestion),
        analysis: Arc::new(analysis),
    };
    let app = app::create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Marketpulse backend running at http://{}/", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
