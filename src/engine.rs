//! Trade engine: executes one order against the price store, ledger, position
//! book, and transaction log as a single atomic unit.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::ExchangeError;
use crate::ledger::{self, SharedBalances};
use crate::persistence;
use crate::positions::{self, SharedPositions};
use crate::prices::{self, SharedPrices};
use crate::transactions::SharedTransactionLog;
use crate::types::transaction::{TradeSide, Transaction};
use crate::types::{Price, Qty};

/// One order, submitted with an already-authenticated user id.
#[derive(Debug, Clone)]
pub struct TradeRequest {
    pub user_id: Uuid,
    pub symbol: String,
    pub side: TradeSide,
    pub quantity: Qty,
}

/// Result of an executed trade.
#[derive(Debug, Clone, Serialize)]
pub struct TradeReceipt {
    pub transaction_id: i64,
    pub symbol: String,
    pub side: TradeSide,
    pub quantity: Qty,
    pub price: Price,
    pub total_value: f64,
    pub new_balance: f64,
    /// Fill price minus average cost, times quantity; only sells realize anything.
    pub realized_pnl: Option<f64>,
}

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

pub struct TradeEngine {
    prices: SharedPrices,
    balances: SharedBalances,
    positions: SharedPositions,
    log: SharedTransactionLog,
    /// When present, trades commit to Postgres before becoming visible in memory.
    pool: Option<PgPool>,
    lock_timeout: Duration,
    user_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl TradeEngine {
    pub fn new(
        prices: SharedPrices,
        balances: SharedBalances,
        positions: SharedPositions,
        log: SharedTransactionLog,
    ) -> Self {
        Self {
            prices,
            balances,
            positions,
            log,
            pool: None,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    async fn user_lock(&self, user_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.user_locks.lock().await;
        locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Execute one order. Either all of balance mutation, position mutation,
    /// and transaction append happen, or none do.
    pub async fn execute(&self, request: TradeRequest) -> Result<TradeReceipt, ExchangeError> {
        if !(request.quantity > 0.0) {
            return Err(ExchangeError::InvalidArgument(format!(
                "quantity must be positive, got {}",
                request.quantity
            )));
        }
        let symbol = request.symbol.to_uppercase();

        // Per-user serialization with a bounded wait. Trades for other users
        // take other locks and proceed in parallel.
        let lock = self.user_lock(request.user_id).await;
        let _guard = tokio::time::timeout(self.lock_timeout, lock.lock())
            .await
            .map_err(|_| ExchangeError::LockTimeout)?;

        let price = prices::get_price(&self.prices, &symbol).await?;
        let total_value = request.quantity * price;

        let balance = ledger::get_balance(&self.balances, request.user_id).await;
        let held = positions::get_position(&self.positions, request.user_id, &symbol).await;

        let (signed_qty, signed_value, realized_pnl) = match request.side {
            TradeSide::Buy => {
                if balance < total_value {
                    return Err(ExchangeError::InsufficientFunds {
                        required: total_value,
                        available: balance,
                    });
                }
                (request.quantity, -total_value, None)
            }
            TradeSide::Sell => {
                let held_qty = held.as_ref().map(|p| p.quantity).unwrap_or(0.0);
                if held_qty < request.quantity {
                    return Err(ExchangeError::InsufficientQuantity {
                        requested: request.quantity,
                        held: held_qty,
                    });
                }
                // held is Some here: held_qty >= quantity > 0.
                let avg = held.as_ref().map(|p| p.average_price).unwrap_or(price);
                let pnl = request.quantity * (price - avg);
                (-request.quantity, total_value, Some(pnl))
            }
        };

        let new_balance = balance + signed_value;
        let next_pos = positions::next_position(
            held.as_ref(),
            request.user_id,
            &symbol,
            signed_qty,
            price,
        )?;

        let record = Transaction {
            id: self.log.reserve_id(),
            user_id: request.user_id,
            symbol: symbol.clone(),
            side: request.side,
            quantity: request.quantity,
            price,
            total_value,
            timestamp: Utc::now(),
        };

        // Durable commit first: a storage failure rolls back the database
        // transaction while the in-memory stores are still untouched, so no
        // partial trade is ever observable.
        if let Some(pool) = &self.pool {
            let mut tx = pool.begin().await?;
            persistence::update_user_balance(&mut tx, request.user_id, new_balance).await?;
            match &next_pos {
                Some(pos) => persistence::upsert_position(&mut tx, pos).await?,
                None => persistence::delete_position(&mut tx, request.user_id, &symbol).await?,
            }
            persistence::insert_transaction(&mut tx, &record).await?;
            tx.commit().await?;
        }

        // Balance and position become visible before the log entry.
        ledger::apply_delta(&self.balances, request.user_id, signed_value).await?;
        positions::apply_fill(&self.positions, request.user_id, &symbol, signed_qty, price)
            .await?;
        self.log.append(record.clone()).await;

        tracing::info!(
            user_id = %request.user_id,
            side = record.side.as_str(),
            %symbol,
            quantity = request.quantity,
            price,
            total_value,
            transaction_id = record.id,
            "trade executed"
        );

        Ok(TradeReceipt {
            transaction_id: record.id,
            symbol,
            side: request.side,
            quantity: request.quantity,
            price,
            total_value,
            new_balance,
            realized_pnl,
        })
    }
}
