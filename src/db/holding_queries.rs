use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{CreateHolding, Holding, UpdateHolding};

pub async fn fetch_all(pool: &PgPool) -> Result<Vec<Holding>, sqlx::Error> {
    sqlx::query_as::<_, Holding>(
        "SELECT id, symbol, name, quantity, average_price, created_at
         FROM holdings
         ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await
}

pub async fn fetch_symbols(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT DISTINCT symbol FROM holdings")
        .fetch_all(pool)
        .await
}

pub async fn insert(pool: &PgPool, input: CreateHolding) -> Result<Holding, sqlx::Error> {
    sqlx::query_as::<_, Holding>(
        "INSERT INTO holdings (id, symbol, name, quantity, average_price)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id, symbol, name, quantity, average_price, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(input.symbol)
    .bind(input.name)
    .bind(input.quantity)
    .bind(input.average_price)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    input: UpdateHolding,
) -> Result<Option<Holding>, sqlx::Error> {
    sqlx::query_as::<_, Holding>(
        "UPDATE holdings
         SET quantity = $1, average_price = $2
         WHERE id = $3
         RETURNING id, symbol, name, quantity, average_price, created_at",
    )
    .bind(input.quantity)
    .bind(input.average_price)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM holdings WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
