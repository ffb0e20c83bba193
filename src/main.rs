use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use tracing::{error, info};

use resource_exchange::api::routes::{AppState, app_router, tick_and_persist};
use resource_exchange::config::Config;
use resource_exchange::engine::TradeEngine;
use resource_exchange::transactions::TransactionLog;
use resource_exchange::types::resource::Resource;
use resource_exchange::{ledger, persistence, positions, prices};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env().expect("configuration");
    let pool =
        persistence::create_pool_and_migrate(&config.database_url, config.db_max_connections)
            .await
            .expect("database connection and migrations");
    seed_default_resources(&pool).await.expect("resource bootstrap");

    // Hydrate the in-memory stores from durable state.
    let price_store = prices::new_store();
    let resource_rows = persistence::list_resources(&pool).await.expect("resources");
    for row in &resource_rows {
        prices::insert_resource(&price_store, persistence::resource_row_to_resource(row)).await;
    }

    let balances = ledger::new_store();
    let user_rows = persistence::list_users(&pool).await.expect("users");
    for row in &user_rows {
        ledger::set_balance(&balances, row.id, row.balance).await;
    }

    let position_store = positions::new_store();
    let position_rows = persistence::list_positions(&pool).await.expect("positions");
    for row in &position_rows {
        positions::insert_position(&position_store, persistence::position_row_to_position(row))
            .await;
    }

    let records = persistence::list_transactions(&pool)
        .await
        .expect("transactions");
    info!(
        resources = resource_rows.len(),
        users = user_rows.len(),
        positions = position_rows.len(),
        transactions = records.len(),
        "state hydrated"
    );
    let log = Arc::new(TransactionLog::hydrate(records));

    let engine = Arc::new(
        TradeEngine::new(
            price_store.clone(),
            balances.clone(),
            position_store.clone(),
            log.clone(),
        )
        .with_pool(pool.clone()),
    );

    let state = AppState {
        engine,
        prices: price_store.clone(),
        balances,
        positions: position_store,
        log,
        pool: pool.clone(),
        jwt_secret: config.jwt_secret.clone(),
        starting_balance: config.starting_balance,
    };

    // Periodic price job: random-walk every resource, written through to storage.
    let tick = config.price_tick;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(tick);
        ticker.tick().await; // first tick completes immediately
        loop {
            ticker.tick().await;
            if let Err(e) = tick_and_persist(&price_store, &pool).await {
                error!(error = %e, "price tick failed");
            }
        }
    });

    let app = app_router(state);
    let addr = format!("0.0.0.0:{}", config.port);
    info!(%addr, "resource exchange listening");
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

/// Seed the default resource set on first start; existing rows are left alone.
async fn seed_default_resources(pool: &PgPool) -> Result<(), sqlx::Error> {
    let defaults = [
        ("ENG", "Energy Units", 100.0, 0.03),
        ("DTA", "Digital Tokens", 50.0, 0.05),
        ("CRY", "Crypto Crystals", 200.0, 0.04),
        ("BIO", "Bio Materials", 75.0, 0.02),
        ("MET", "Rare Metals", 150.0, 0.025),
    ];
    for (symbol, name, price, volatility) in defaults {
        let resource = Resource {
            symbol: symbol.to_string(),
            name: name.to_string(),
            current_price: price,
            volatility,
            last_updated: Utc::now(),
        };
        if persistence::insert_resource_if_absent(pool, &resource).await? {
            info!(symbol, name, "seeded resource");
        }
    }
    Ok(())
}
