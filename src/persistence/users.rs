//! User persistence: registration, login lookup, and balance write-through.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::types::user::User;

/// Row returned from DB (username is stored lowercase).
#[derive(FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub balance: f64,
    pub created_at: DateTime<Utc>,
}

pub fn user_row_to_user(row: &UserRow) -> User {
    User {
        id: row.id,
        username: row.username.clone(),
        email: row.email.clone(),
        balance: row.balance,
        created_at: row.created_at,
    }
}

/// List all users for balance hydration.
pub async fn list_users(pool: &PgPool) -> Result<Vec<UserRow>, sqlx::Error> {
    let rows = sqlx::query_as::<_, UserRow>(
        "SELECT id, username, email, password_hash, balance, created_at FROM users",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Get a user by username (lowercase). For login.
pub async fn get_user_by_username(
    pool: &PgPool,
    username_lowercase: &str,
) -> Result<Option<UserRow>, sqlx::Error> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, username, email, password_hash, balance, created_at \
         FROM users WHERE username = $1",
    )
    .bind(username_lowercase)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn get_user_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserRow>, sqlx::Error> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, username, email, password_hash, balance, created_at \
         FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Insert a user. Username must already be lowercase.
pub async fn insert_user(
    pool: &PgPool,
    id: Uuid,
    username: &str,
    email: &str,
    password_hash: &str,
    balance: f64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO users (id, username, email, password_hash, balance) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id)
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(balance)
    .execute(pool)
    .await?;
    Ok(())
}

/// Balance write-through; takes a connection so it can join the trade's transaction.
pub async fn update_user_balance(
    conn: &mut PgConnection,
    user_id: Uuid,
    new_balance: f64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET balance = $1 WHERE id = $2")
        .bind(new_balance)
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}
