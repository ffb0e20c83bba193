//! Price store: current quote per resource symbol.
//! Testable without HTTP or a database.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use tokio::sync::RwLock;

use crate::error::ExchangeError;
use crate::types::Price;
use crate::types::resource::Resource;

pub type SharedPrices = Arc<RwLock<HashMap<String, Resource>>>;

pub fn new_store() -> SharedPrices {
    Arc::new(RwLock::new(HashMap::new()))
}

/// Insert or replace a resource. Symbols are stored uppercase.
pub async fn insert_resource(store: &SharedPrices, resource: Resource) {
    let mut guard = store.write().await;
    guard.insert(resource.symbol.to_uppercase(), resource);
}

pub async fn get_resource(store: &SharedPrices, symbol: &str) -> Option<Resource> {
    let guard = store.read().await;
    guard.get(&symbol.to_uppercase()).cloned()
}

/// Current price for a symbol. Stale reads are fine: price is a market input,
/// not a ledger invariant.
pub async fn get_price(store: &SharedPrices, symbol: &str) -> Result<Price, ExchangeError> {
    let guard = store.read().await;
    guard
        .get(&symbol.to_uppercase())
        .map(|r| r.current_price)
        .ok_or_else(|| ExchangeError::ResourceNotFound(symbol.to_string()))
}

/// Set the current price for a symbol. The price must be positive.
pub async fn set_price(
    store: &SharedPrices,
    symbol: &str,
    new_price: Price,
) -> Result<(), ExchangeError> {
    if !(new_price > 0.0) {
        return Err(ExchangeError::InvalidArgument(format!(
            "price must be positive, got {new_price}"
        )));
    }
    let mut guard = store.write().await;
    let resource = guard
        .get_mut(&symbol.to_uppercase())
        .ok_or_else(|| ExchangeError::ResourceNotFound(symbol.to_string()))?;
    resource.current_price = new_price;
    resource.last_updated = Utc::now();
    Ok(())
}

/// All resources, sorted by symbol for stable API output.
pub async fn list_resources(store: &SharedPrices) -> Vec<Resource> {
    let guard = store.read().await;
    let mut resources: Vec<Resource> = guard.values().cloned().collect();
    resources.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    resources
}

/// Apply one random-walk tick to every resource: each price moves by a uniform
/// percentage in [-volatility, +volatility]. Returns the new quotes.
pub async fn tick_prices(store: &SharedPrices) -> Vec<Resource> {
    let mut guard = store.write().await;
    // ThreadRng is !Send, so it must not live across the await above.
    let mut rng = rand::thread_rng();
    let now = Utc::now();
    for resource in guard.values_mut() {
        // gen_range panics on an inverted range, so a bad volatility value
        // must never become a negative bound.
        let bound = resource.volatility.max(0.0);
        let change = rng.gen_range(-bound..=bound);
        resource.current_price *= 1.0 + change;
        resource.last_updated = now;
    }
    let mut resources: Vec<Resource> = guard.values().cloned().collect();
    resources.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    resources
}
