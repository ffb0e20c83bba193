//! Transaction log tests: id monotonicity, per-user listing, ordering.

use chrono::{Duration, Utc};
use uuid::Uuid;

use resource_exchange::transactions::TransactionLog;
use resource_exchange::types::transaction::{TradeSide, Transaction};

fn record(log: &TransactionLog, user_id: Uuid, side: TradeSide, quantity: f64) -> Transaction {
    let price = 100.0;
    Transaction {
        id: log.reserve_id(),
        user_id,
        symbol: "ENG".to_string(),
        side,
        quantity,
        price,
        total_value: quantity * price,
        timestamp: Utc::now(),
    }
}

#[tokio::test]
async fn ids_are_monotonic_and_unique() {
    let log = TransactionLog::new();
    let ids: Vec<i64> = (0..5).map(|_| log.reserve_id()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn listing_filters_by_user() {
    let log = TransactionLog::new();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    for _ in 0..3 {
        let r = record(&log, alice, TradeSide::Buy, 1.0);
        log.append(r).await;
    }
    let r = record(&log, bob, TradeSide::Buy, 2.0);
    log.append(r).await;

    assert_eq!(log.list_by_user(alice).await.len(), 3);
    assert_eq!(log.list_by_user(bob).await.len(), 1);
    assert_eq!(log.len().await, 4);
}

#[tokio::test]
async fn listing_is_timestamp_descending_with_id_tiebreak() {
    let log = TransactionLog::new();
    let user_id = Uuid::new_v4();
    let base = Utc::now();

    // Two records share a timestamp; the later insertion must come first.
    let mut first = record(&log, user_id, TradeSide::Buy, 1.0);
    first.timestamp = base;
    let mut second = record(&log, user_id, TradeSide::Sell, 1.0);
    second.timestamp = base;
    let mut older = record(&log, user_id, TradeSide::Buy, 2.0);
    older.timestamp = base - Duration::seconds(10);

    log.append(first.clone()).await;
    log.append(second.clone()).await;
    log.append(older.clone()).await;

    let listed = log.list_by_user(user_id).await;
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].id, first.id);
    assert_eq!(listed[2].id, older.id);
}

#[tokio::test]
async fn hydration_resumes_the_id_sequence() {
    let seeded = TransactionLog::new();
    let user_id = Uuid::new_v4();
    let mut entries = Vec::new();
    for _ in 0..3 {
        entries.push(record(&seeded, user_id, TradeSide::Buy, 1.0));
    }

    let log = TransactionLog::hydrate(entries);
    assert_eq!(log.len().await, 3);
    assert_eq!(log.reserve_id(), 4);
}

#[tokio::test]
async fn empty_hydration_starts_at_one() {
    let log = TransactionLog::hydrate(Vec::new());
    assert!(log.is_empty().await);
    assert_eq!(log.reserve_id(), 1);
}
