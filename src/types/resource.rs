use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Price;

/// A tradeable resource and its current quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub symbol: String,
    pub name: String,
    pub current_price: Price,
    /// Bounds the per-tick random price move; informational otherwise.
    pub volatility: f64,
    pub last_updated: DateTime<Utc>,
}
