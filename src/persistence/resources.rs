//! Resource persistence: bootstrap seed, hydration, and price write-through.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::types::resource::Resource;

#[derive(FromRow)]
pub struct ResourceRow {
    pub symbol: String,
    pub name: String,
    pub current_price: f64,
    pub volatility: f64,
    pub last_updated: DateTime<Utc>,
}

pub fn resource_row_to_resource(row: &ResourceRow) -> Resource {
    Resource {
        symbol: row.symbol.clone(),
        name: row.name.clone(),
        current_price: row.current_price,
        volatility: row.volatility,
        last_updated: row.last_updated,
    }
}

/// List all resources for hydration.
pub async fn list_resources(pool: &PgPool) -> Result<Vec<ResourceRow>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ResourceRow>(
        "SELECT symbol, name, current_price, volatility, last_updated FROM resources",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Seed a resource if it does not exist yet. Returns true when inserted.
pub async fn insert_resource_if_absent(
    pool: &PgPool,
    resource: &Resource,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO resources (symbol, name, current_price, volatility, last_updated) \
         VALUES ($1, $2, $3, $4, $5) ON CONFLICT (symbol) DO NOTHING",
    )
    .bind(&resource.symbol)
    .bind(&resource.name)
    .bind(resource.current_price)
    .bind(resource.volatility)
    .bind(resource.last_updated)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Price write-through after a tick or an explicit set.
pub async fn update_resource_price(
    pool: &PgPool,
    symbol: &str,
    new_price: f64,
    last_updated: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE resources SET current_price = $1, last_updated = $2 WHERE symbol = $3")
        .bind(new_price)
        .bind(last_updated)
        .bind(symbol)
        .execute(pool)
        .await?;
    Ok(())
}
