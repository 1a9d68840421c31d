use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A portfolio holding
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Holding {
    pub id: Uuid,
    pub symbol: String,
    pub name: String,
    pub quantity: BigDecimal,
    pub average_price: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateHolding {
    pub symbol: String,
    pub name: String,
    pub quantity: BigDecimal,
    pub average_price: BigDecimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateHolding {
    pub quantity: BigDecimal,
    pub average_price: BigDecimal,
}
