//! Transaction persistence: insert inside the trade transaction, list for hydration.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::types::transaction::{TradeSide, Transaction};

#[derive(Debug, FromRow)]
pub struct TransactionRow {
    pub id: i64,
    pub user_id: Uuid,
    pub symbol: String,
    pub side: String,
    pub quantity: f64,
    pub price: f64,
    pub total_value: f64,
    pub created_at: DateTime<Utc>,
}

pub fn transaction_row_to_transaction(row: &TransactionRow) -> Result<Transaction, sqlx::Error> {
    let side = match row.side.as_str() {
        "buy" => TradeSide::Buy,
        "sell" => TradeSide::Sell,
        other => {
            return Err(sqlx::Error::Decode(
                format!("unknown trade side '{other}' in transactions.id={}", row.id).into(),
            ));
        }
    };
    Ok(Transaction {
        id: row.id,
        user_id: row.user_id,
        symbol: row.symbol.clone(),
        side,
        quantity: row.quantity,
        price: row.price,
        total_value: row.total_value,
        timestamp: row.created_at,
    })
}

/// Insert one executed fill; joins the trade's transaction. Insert-only.
pub async fn insert_transaction(
    conn: &mut PgConnection,
    record: &Transaction,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO transactions (id, user_id, symbol, side, quantity, price, total_value, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(record.id)
    .bind(record.user_id)
    .bind(&record.symbol)
    .bind(record.side.as_str())
    .bind(record.quantity)
    .bind(record.price)
    .bind(record.total_value)
    .bind(record.timestamp)
    .execute(conn)
    .await?;
    Ok(())
}

/// List all transactions for hydration, oldest first.
pub async fn list_transactions(pool: &PgPool) -> Result<Vec<Transaction>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TransactionRow>(
        "SELECT id, user_id, symbol, side, quantity, price, total_value, created_at \
         FROM transactions ORDER BY id ASC",
    )
    .fetch_all(pool)
    .await?;
    rows.iter().map(transaction_row_to_transaction).collect()
}
