//! Position persistence: upsert/delete inside the trade transaction, list for hydration.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::types::position::Position;

#[derive(Debug, sqlx::FromRow)]
pub struct PositionRow {
    pub user_id: Uuid,
    pub symbol: String,
    pub quantity: f64,
    pub average_price: f64,
}

pub fn position_row_to_position(row: &PositionRow) -> Position {
    Position {
        user_id: row.user_id,
        symbol: row.symbol.clone(),
        quantity: row.quantity,
        average_price: row.average_price,
    }
}

/// Upsert a position (insert or update on conflict).
pub async fn upsert_position(
    conn: &mut PgConnection,
    position: &Position,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO positions (user_id, symbol, quantity, average_price) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (user_id, symbol) DO UPDATE SET quantity = $3, average_price = $4",
    )
    .bind(position.user_id)
    .bind(&position.symbol)
    .bind(position.quantity)
    .bind(position.average_price)
    .execute(conn)
    .await?;
    Ok(())
}

/// Remove a closed-out position: flat positions are never stored.
pub async fn delete_position(
    conn: &mut PgConnection,
    user_id: Uuid,
    symbol: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM positions WHERE user_id = $1 AND symbol = $2")
        .bind(user_id)
        .bind(symbol)
        .execute(conn)
        .await?;
    Ok(())
}

/// List all positions for hydration.
pub async fn list_positions(pool: &PgPool) -> Result<Vec<PositionRow>, sqlx::Error> {
    let rows = sqlx::query_as::<_, PositionRow>(
        "SELECT user_id, symbol, quantity, average_price FROM positions",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
