use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Price, Qty};

/// Position per (user, symbol). Quantity is always > 0: a flat position is
/// removed from the book rather than stored with zero quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub user_id: Uuid,
    pub symbol: String,
    pub quantity: Qty,
    /// Volume-weighted cost basis of the currently held quantity.
    pub average_price: Price,
}
