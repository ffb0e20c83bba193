//! Environment configuration, read once at startup (after dotenvy).

use std::env;
use std::time::Duration;

use crate::error::ExchangeError;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub port: u16,
    /// Interval of the background price random-walk job.
    pub price_tick: Duration,
    /// Size of the Postgres connection pool.
    pub db_max_connections: u32,
    /// Cash balance granted at registration.
    pub starting_balance: f64,
}

impl Config {
    pub fn from_env() -> Result<Self, ExchangeError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ExchangeError::Internal("DATABASE_URL is not set".into()))?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| ExchangeError::Internal("JWT_SECRET is not set".into()))?;
        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8000);
        let tick_secs = env::var("PRICE_TICK_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);
        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);
        Ok(Self {
            database_url,
            jwt_secret,
            port,
            price_tick: Duration::from_secs(tick_secs),
            db_max_connections,
            starting_balance: 10_000.0,
        })
    }
}
