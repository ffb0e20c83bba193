//! Simulated resource market: users hold a cash balance and resource
//! positions, trade against stored quotes, and accumulate an append-only
//! transaction history. The trade engine executes each order atomically
//! against the price store, account ledger, position book, and transaction log.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod persistence;
pub mod positions;
pub mod prices;
pub mod transactions;
pub mod types;
