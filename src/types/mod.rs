pub mod position;
pub mod resource;
pub mod transaction;
pub mod user;

/// Prices and balances are plain f64: the simulator allows fractional quantities.
pub type Price = f64;
pub type Qty = f64;
