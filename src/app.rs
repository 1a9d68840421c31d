use axum::Router;
use tower_http::cors::CorsLayer;

use crate::routes::{analysis, health, holdings, news};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/api/news", news::router())
        .nest("/api/holdings", holdings::router())
        .nest("/api/analysis", analysis::router())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
