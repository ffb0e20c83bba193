//! Database pool and embedded migrations.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Bounded wait for a pool checkout; a saturated pool surfaces as a storage
/// error instead of stalling the request.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(3);

/// Connect with the configured pool size and bring the schema up to date
/// with the embedded migrations.
pub async fn create_pool_and_migrate(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}
