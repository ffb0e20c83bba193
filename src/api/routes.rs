//! HTTP surface: registration, login, quotes, trading, and history.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::auth::{AuthUser, create_token, hash_password, verify_password};
use crate::engine::{TradeEngine, TradeRequest};
use crate::error::ExchangeError;
use crate::ledger::{self, SharedBalances};
use crate::persistence;
use crate::positions::{self, SharedPositions};
use crate::prices::{self, SharedPrices};
use crate::transactions::SharedTransactionLog;
use crate::types::transaction::TradeSide;
use crate::types::user::User;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<TradeEngine>,
    pub prices: SharedPrices,
    pub balances: SharedBalances,
    pub positions: SharedPositions,
    pub log: SharedTransactionLog,
    pub pool: PgPool,
    pub jwt_secret: String,
    pub starting_balance: f64,
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/me", get(me))
        .route("/api/resources", get(list_resources))
        .route("/api/update-prices", post(update_prices))
        .route("/api/trade", post(execute_trade))
        .route("/api/positions", get(list_positions))
        .route("/api/transactions", get(list_transactions))
        .with_state(state)
}

async fn health() -> &'static str {
    "healthy"
}

#[derive(Deserialize)]
struct RegisterRequest {
    username: String,
    email: String,
    password: String,
}

async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<Value>, ExchangeError> {
    let username = body.username.trim().to_lowercase();
    let email = body.email.trim().to_string();
    if username.is_empty() || email.is_empty() || body.password.is_empty() {
        return Err(ExchangeError::InvalidArgument(
            "username, email, and password are required".into(),
        ));
    }

    if persistence::get_user_by_username(&state.pool, &username)
        .await?
        .is_some()
    {
        return Err(ExchangeError::Conflict("username already registered".into()));
    }

    let password_hash = hash_password(&body.password)?;
    let user_id = Uuid::new_v4();
    persistence::insert_user(
        &state.pool,
        user_id,
        &username,
        &email,
        &password_hash,
        state.starting_balance,
    )
    .await
    .map_err(|e| {
        // Email collisions are only caught by the unique constraint.
        if e.as_database_error()
            .is_some_and(|db| db.is_unique_violation())
        {
            ExchangeError::Conflict("username or email already registered".into())
        } else {
            ExchangeError::Storage(e)
        }
    })?;
    ledger::set_balance(&state.balances, user_id, state.starting_balance).await;

    let token = create_token(state.jwt_secret.as_bytes(), user_id)
        .map_err(|e| ExchangeError::Internal(format!("token creation failed: {e}")))?;
    let user = load_user(&state, user_id).await?;

    tracing::info!(%user_id, %username, "user registered");
    Ok(Json(json!({
        "message": "User created successfully",
        "token": token,
        "user": user,
    })))
}

#[derive(Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>, ExchangeError> {
    let username = body.username.trim().to_lowercase();
    let row = persistence::get_user_by_username(&state.pool, &username)
        .await?
        .ok_or(ExchangeError::Auth)?;
    if !verify_password(&body.password, &row.password_hash) {
        return Err(ExchangeError::Auth);
    }

    let token = create_token(state.jwt_secret.as_bytes(), row.id)
        .map_err(|e| ExchangeError::Internal(format!("token creation failed: {e}")))?;
    let user = load_user(&state, row.id).await?;

    Ok(Json(json!({
        "message": "Login successful",
        "access_token": token,
        "token_type": "bearer",
        "user": user,
    })))
}

async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, ExchangeError> {
    let user = load_user(&state, auth.user_id).await?;
    Ok(Json(json!({ "user": user })))
}

/// Profile from the users table with the live ledger balance. A valid token
/// for a missing row is a 404, not an auth failure.
async fn load_user(state: &AppState, user_id: Uuid) -> Result<User, ExchangeError> {
    let row = persistence::get_user_by_id(&state.pool, user_id)
        .await?
        .ok_or(ExchangeError::UserNotFound)?;
    let mut user = persistence::user_row_to_user(&row);
    user.balance = ledger::get_balance(&state.balances, user_id).await;
    Ok(user)
}

async fn list_resources(State(state): State<AppState>) -> Json<Value> {
    let resources = prices::list_resources(&state.prices).await;
    Json(json!(resources))
}

/// Random-walk tick over every resource, written through to storage.
/// Also called on a timer by the background price job.
async fn update_prices(State(state): State<AppState>) -> Result<Json<Value>, ExchangeError> {
    let updated = tick_and_persist(&state.prices, &state.pool).await?;
    Ok(Json(json!({
        "message": format!("Updated prices for {updated} resources"),
        "updated_count": updated,
    })))
}

pub async fn tick_and_persist(
    store: &SharedPrices,
    pool: &PgPool,
) -> Result<usize, ExchangeError> {
    let resources = prices::tick_prices(store).await;
    for resource in &resources {
        persistence::update_resource_price(
            pool,
            &resource.symbol,
            resource.current_price,
            resource.last_updated,
        )
        .await?;
    }
    tracing::info!(count = resources.len(), "updated resource prices");
    Ok(resources.len())
}

#[derive(Deserialize)]
struct TradeBody {
    trade_type: String,
    resource_symbol: String,
    quantity: f64,
}

async fn execute_trade(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<TradeBody>,
) -> Result<Json<Value>, ExchangeError> {
    let side = match body.trade_type.to_lowercase().as_str() {
        "buy" => TradeSide::Buy,
        "sell" => TradeSide::Sell,
        _ => {
            return Err(ExchangeError::InvalidArgument(
                "trade_type must be 'buy' or 'sell'".into(),
            ));
        }
    };
    let receipt = state
        .engine
        .execute(TradeRequest {
            user_id: auth.user_id,
            symbol: body.resource_symbol,
            side,
            quantity: body.quantity,
        })
        .await?;

    Ok(Json(json!({
        "message": "Trade executed successfully",
        "transaction_id": receipt.transaction_id,
        "balance": receipt.new_balance,
        "realized_pnl": receipt.realized_pnl,
    })))
}

#[derive(Serialize)]
struct PositionView {
    symbol: String,
    name: String,
    current_price: f64,
    quantity: f64,
    average_price: f64,
    current_value: f64,
    profit_loss: f64,
}

async fn list_positions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<PositionView>>, ExchangeError> {
    let held = positions::list_for_user(&state.positions, auth.user_id).await;
    let mut views = Vec::with_capacity(held.len());
    for pos in held {
        let resource = prices::get_resource(&state.prices, &pos.symbol)
            .await
            .ok_or_else(|| ExchangeError::ResourceNotFound(pos.symbol.clone()))?;
        views.push(PositionView {
            symbol: pos.symbol.clone(),
            name: resource.name,
            current_price: resource.current_price,
            quantity: pos.quantity,
            average_price: pos.average_price,
            current_value: pos.quantity * resource.current_price,
            profit_loss: positions::unrealized_pnl(&pos, resource.current_price),
        });
    }
    Ok(Json(views))
}

async fn list_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, ExchangeError> {
    let records = state.log.list_by_user(auth.user_id).await;
    Ok(Json(json!(records)))
}
