//! Price store tests: quotes, validation, and the random-walk tick.

use chrono::Utc;

use resource_exchange::error::ExchangeError;
use resource_exchange::prices::{
    SharedPrices, get_price, get_resource, insert_resource, list_resources, new_store, set_price,
    tick_prices,
};
use resource_exchange::types::resource::Resource;

fn resource(symbol: &str, price: f64, volatility: f64) -> Resource {
    Resource {
        symbol: symbol.to_string(),
        name: format!("{symbol} units"),
        current_price: price,
        volatility,
        last_updated: Utc::now(),
    }
}

async fn seeded() -> SharedPrices {
    let store = new_store();
    insert_resource(&store, resource("ENG", 100.0, 0.03)).await;
    insert_resource(&store, resource("DTA", 50.0, 0.05)).await;
    store
}

#[tokio::test]
async fn quotes_round_trip() {
    let store = seeded().await;
    assert_eq!(get_price(&store, "ENG").await.unwrap(), 100.0);
    assert_eq!(get_price(&store, "eng").await.unwrap(), 100.0);

    set_price(&store, "ENG", 123.5).await.unwrap();
    assert_eq!(get_price(&store, "ENG").await.unwrap(), 123.5);
}

#[tokio::test]
async fn unknown_symbol_is_not_found() {
    let store = seeded().await;
    assert!(matches!(
        get_price(&store, "XYZ").await.unwrap_err(),
        ExchangeError::ResourceNotFound(_)
    ));
    assert!(matches!(
        set_price(&store, "XYZ", 10.0).await.unwrap_err(),
        ExchangeError::ResourceNotFound(_)
    ));
}

#[tokio::test]
async fn non_positive_prices_are_rejected() {
    let store = seeded().await;
    for bad in [0.0, -5.0] {
        assert!(matches!(
            set_price(&store, "ENG", bad).await.unwrap_err(),
            ExchangeError::InvalidArgument(_)
        ));
    }
    // Unchanged.
    assert_eq!(get_price(&store, "ENG").await.unwrap(), 100.0);
}

#[tokio::test]
async fn set_price_refreshes_the_timestamp() {
    let store = seeded().await;
    let before = get_resource(&store, "ENG").await.unwrap().last_updated;
    set_price(&store, "ENG", 101.0).await.unwrap();
    let after = get_resource(&store, "ENG").await.unwrap().last_updated;
    assert!(after >= before);
}

#[tokio::test]
async fn listing_is_sorted_by_symbol() {
    let store = seeded().await;
    let listed = list_resources(&store).await;
    let symbols: Vec<&str> = listed.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["DTA", "ENG"]);
}

#[tokio::test]
async fn tick_tolerates_zero_and_negative_volatility() {
    let store = new_store();
    insert_resource(&store, resource("FIX", 80.0, 0.0)).await;
    insert_resource(&store, resource("BAD", 60.0, -0.5)).await;

    let updated = tick_prices(&store).await;
    assert_eq!(updated.len(), 2);
    // Neither a zero nor a (corrupt) negative volatility moves the price.
    assert_eq!(get_price(&store, "FIX").await.unwrap(), 80.0);
    assert_eq!(get_price(&store, "BAD").await.unwrap(), 60.0);
}

#[tokio::test]
async fn tick_moves_every_price_within_volatility_bounds() {
    let store = seeded().await;
    for _ in 0..50 {
        let updated = tick_prices(&store).await;
        assert_eq!(updated.len(), 2);
        for quote in &updated {
            assert!(quote.current_price > 0.0);
        }
    }
    // A 3% walk over 50 ticks stays well inside these bounds.
    let eng = get_price(&store, "ENG").await.unwrap();
    assert!(eng > 100.0 * 0.97f64.powi(50));
    assert!(eng < 100.0 * 1.03f64.powi(50));
}
