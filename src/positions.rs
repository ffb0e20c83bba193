//! Position book: apply_fill, get_position, unrealized_pnl.
//! Testable without HTTP or a database.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::ExchangeError;
use crate::types::position::Position;
use crate::types::{Price, Qty};

pub type SharedPositions = Arc<RwLock<HashMap<(Uuid, String), Position>>>;

pub fn new_store() -> SharedPositions {
    Arc::new(RwLock::new(HashMap::new()))
}

/// Compute the position that results from one fill, without touching any store.
///
/// Increasing fills blend the average price by volume, always at the fill price.
/// Decreasing fills leave the average untouched. A fill that brings the quantity
/// to zero (or below, which the trade engine has already ruled out) yields `None`:
/// flat positions are absent, never stored.
pub fn next_position(
    existing: Option<&Position>,
    user_id: Uuid,
    symbol: &str,
    signed_qty: Qty,
    fill_price: Price,
) -> Result<Option<Position>, ExchangeError> {
    match existing {
        None => {
            if signed_qty < 0.0 {
                return Err(ExchangeError::InsufficientQuantity {
                    requested: -signed_qty,
                    held: 0.0,
                });
            }
            Ok(Some(Position {
                user_id,
                symbol: symbol.to_uppercase(),
                quantity: signed_qty,
                average_price: fill_price,
            }))
        }
        Some(pos) => {
            let new_qty = pos.quantity + signed_qty;
            if new_qty <= 0.0 {
                return Ok(None);
            }
            let average_price = if signed_qty > 0.0 {
                (pos.quantity * pos.average_price + signed_qty * fill_price) / new_qty
            } else {
                pos.average_price
            };
            Ok(Some(Position {
                user_id,
                symbol: symbol.to_uppercase(),
                quantity: new_qty,
                average_price,
            }))
        }
    }
}

/// Apply one fill to the book and return the resulting position
/// (`None` when the fill closed it out).
pub async fn apply_fill(
    store: &SharedPositions,
    user_id: Uuid,
    symbol: &str,
    signed_qty: Qty,
    fill_price: Price,
) -> Result<Option<Position>, ExchangeError> {
    let mut guard = store.write().await;
    let key = (user_id, symbol.to_uppercase());
    let next = next_position(guard.get(&key), user_id, symbol, signed_qty, fill_price)?;
    match &next {
        Some(pos) => {
            guard.insert(key, pos.clone());
        }
        None => {
            guard.remove(&key);
        }
    }
    Ok(next)
}

/// Insert a persisted position as-is (startup hydration).
pub async fn insert_position(store: &SharedPositions, position: Position) {
    let mut guard = store.write().await;
    guard.insert(
        (position.user_id, position.symbol.to_uppercase()),
        position,
    );
}

pub async fn get_position(
    store: &SharedPositions,
    user_id: Uuid,
    symbol: &str,
) -> Option<Position> {
    let guard = store.read().await;
    guard.get(&(user_id, symbol.to_uppercase())).cloned()
}

/// All open positions for a user, sorted by symbol.
pub async fn list_for_user(store: &SharedPositions, user_id: Uuid) -> Vec<Position> {
    let guard = store.read().await;
    let mut positions: Vec<Position> = guard
        .iter()
        .filter(|((uid, _), _)| *uid == user_id)
        .map(|(_, pos)| pos.clone())
        .collect();
    positions.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    positions
}

/// Unrealized P&L: (current_price - average_price) * quantity.
pub fn unrealized_pnl(position: &Position, current_price: Price) -> f64 {
    (current_price - position.average_price) * position.quantity
}
