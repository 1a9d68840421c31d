use axum::extract::{Path, State};
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use tracing::{error, info};
use uuid::Uuid;

use crate::db::holding_queries;
use crate::errors::AppError;
use crate::models::{CreateHolding, Holding, UpdateHolding};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(fetch_holdings).post(create_holding))
        .route("/:id", put(update_holding))
        .route("/:id", delete(delete_holding))
}

#[axum::debug_handler]
pub async fn create_holding(
    State(state): State<AppState>,
    Json(data): Json<CreateHolding>,
) -> Result<Json<Holding>, AppError> {
    info!("POST /api/holdings - Adding {}", data.symbol);

    if data.symbol.trim().is_empty() {
        return Err(AppError::Validation("symbol must not be empty".to_string()));
    }

    let holding = holding_queries::insert(&state.pool, data).await.map_err(|e| {
        error!("Failed to add holding: {}", e);
        AppError::Db(e)
    })?;

    Ok(Json(holding))
}

#[axum::debug_handler]
pub async fn fetch_holdings(
    State(state): State<AppState>,
) -> Result<Json<Vec<Holding>>, AppError> {
    info!("GET /api/holdings - Fetching all holdings");

    let holdings = holding_queries::fetch_all(&state.pool).await.map_err(|e| {
        error!("Failed to fetch holdings: {}", e);
        AppError::Db(e)
    })?;

    Ok(Json(holdings))
}

#[axum::debug_handler]
pub async fn update_holding(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateHolding>,
) -> Result<Json<Holding>, AppError> {
    info!("PUT /api/holdings/{} - Updating holding", id);

    let holding = holding_queries::update(&state.pool, id, data)
        .await
        .map_err(|e| {
            error!("Failed to update holding {}: {}", id, e);
            AppError::Db(e)
        })?;

    match holding {
        Some(holding) => Ok(Json(holding)),
        None => Err(AppError::NotFound),
    }
}

#[axum::debug_handler]
pub async fn delete_holding(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<()>, AppError> {
    info!("DELETE /api/holdings/{} - Removing holding", id);

    match holding_queries::delete(&state.pool, id).await {
        Ok(0) => {
            error!("Holding {} not found for deletion", id);
            Err(AppError::NotFound)
        }
        Ok(_) => Ok(Json(())),
        Err(e) => {
            error!("Failed to delete holding {}: {}", id, e);
            Err(AppError::Db(e))
        }
    }
}
