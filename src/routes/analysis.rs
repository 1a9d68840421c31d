use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tracing::info;

use crate::models::{AnalysisRequest, MarketAnalysis};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(analyze_market))
}

/// POST /api/analysis
///
/// Forward headlines and holdings to the model and reshape the reply.
/// Always answers 200 with a fully-populated structure; upstream failures
/// are absorbed into fallback copy.
#[axum::debug_handler]
pub async fn analyze_market(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Json<MarketAnalysis> {
    info!(
        "POST /api/analysis - {} headlines, {} holdings",
        request.headlines.len(),
        request.portfolio.len()
    );

    let outcome = state
        .analysis
        .analyze(&request.headlines, &request.portfolio)
        .await;

    if outcome.is_fallback() {
        info!("Serving fallback analysis");
    }

    Json(outcome.into_inner())
}
