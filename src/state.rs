use std::sync::Arc;

use sqlx::PgPool;

use crate::services::analysis_service::AnalysisService;
use crate::services::ingestion_service::IngestionService;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub ingestion: Arc<IngestionService>,
    pub analysis: Arc<AnalysisService>,
}
