//! Account ledger: per-user cash balance with a non-negative invariant.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::ExchangeError;

pub type SharedBalances = Arc<RwLock<HashMap<Uuid, f64>>>;

pub fn new_store() -> SharedBalances {
    Arc::new(RwLock::new(HashMap::new()))
}

/// Balance for a user; unknown users read as zero.
pub async fn get_balance(store: &SharedBalances, user_id: Uuid) -> f64 {
    let guard = store.read().await;
    guard.get(&user_id).copied().unwrap_or(0.0)
}

/// Seed a user's balance (registration / hydration).
pub async fn set_balance(store: &SharedBalances, user_id: Uuid, balance: f64) {
    let mut guard = store.write().await;
    guard.insert(user_id, balance);
}

/// Apply a signed amount to a user's balance and return the new balance.
/// Fails without mutating if the result would be negative. The caller
/// serializes calls for one user, so check-then-apply cannot interleave.
pub async fn apply_delta(
    store: &SharedBalances,
    user_id: Uuid,
    signed_amount: f64,
) -> Result<f64, ExchangeError> {
    let mut guard = store.write().await;
    let balance = guard.entry(user_id).or_insert(0.0);
    let new_balance = *balance + signed_amount;
    if new_balance < 0.0 {
        return Err(ExchangeError::InsufficientFunds {
            required: -signed_amount,
            available: *balance,
        });
    }
    *balance = new_balance;
    Ok(new_balance)
}
