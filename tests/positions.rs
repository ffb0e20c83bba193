//! Position book tests: apply_fill, flat-position deletion, unrealized_pnl.

use uuid::Uuid;

use resource_exchange::error::ExchangeError;
use resource_exchange::positions::{
    SharedPositions, apply_fill, get_position, list_for_user, new_store, unrealized_pnl,
};

fn fresh_store() -> SharedPositions {
    new_store()
}

#[tokio::test]
async fn first_buy_opens_a_position_at_fill_price() {
    let store = fresh_store();
    let user_id = Uuid::new_v4();

    let pos = apply_fill(&store, user_id, "ENG", 10.0, 100.0)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pos.quantity, 10.0);
    assert_eq!(pos.average_price, 100.0);
    assert_eq!(pos.symbol, "ENG");
    assert_eq!(pos.user_id, user_id);
}

#[tokio::test]
async fn increasing_fill_blends_average_by_volume() {
    let store = fresh_store();
    let user_id = Uuid::new_v4();

    apply_fill(&store, user_id, "ENG", 10.0, 100.0).await.unwrap();
    let pos = apply_fill(&store, user_id, "ENG", 10.0, 120.0)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pos.quantity, 20.0);
    assert_eq!(pos.average_price, 110.0);

    // Uneven volumes weight accordingly: (20*110 + 5*150) / 25 = 118.
    let pos = apply_fill(&store, user_id, "ENG", 5.0, 150.0)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pos.quantity, 25.0);
    approx::assert_relative_eq!(pos.average_price, 118.0);
}

#[tokio::test]
async fn decreasing_fill_keeps_average_cost() {
    let store = fresh_store();
    let user_id = Uuid::new_v4();

    apply_fill(&store, user_id, "ENG", 20.0, 110.0).await.unwrap();
    let pos = apply_fill(&store, user_id, "ENG", -15.0, 130.0)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pos.quantity, 5.0);
    assert_eq!(pos.average_price, 110.0);
}

#[tokio::test]
async fn exact_offset_deletes_the_record() {
    let store = fresh_store();
    let user_id = Uuid::new_v4();

    apply_fill(&store, user_id, "ENG", 10.0, 100.0).await.unwrap();
    let result = apply_fill(&store, user_id, "ENG", -10.0, 120.0)
        .await
        .unwrap();
    assert!(result.is_none());
    assert!(get_position(&store, user_id, "ENG").await.is_none());
}

#[tokio::test]
async fn over_offset_also_flattens() {
    // The engine validates sell quantity beforehand; at this layer any fill
    // that takes the quantity to zero or below just flattens the position.
    let store = fresh_store();
    let user_id = Uuid::new_v4();

    apply_fill(&store, user_id, "ENG", 5.0, 100.0).await.unwrap();
    let result = apply_fill(&store, user_id, "ENG", -8.0, 100.0)
        .await
        .unwrap();
    assert!(result.is_none());
    assert!(get_position(&store, user_id, "ENG").await.is_none());
}

#[tokio::test]
async fn selling_into_nothing_is_an_error() {
    let store = fresh_store();
    let user_id = Uuid::new_v4();

    let err = apply_fill(&store, user_id, "ENG", -1.0, 100.0)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ExchangeError::InsufficientQuantity { held, .. } if held == 0.0
    ));
}

#[tokio::test]
async fn positions_are_keyed_per_user_and_symbol() {
    let store = fresh_store();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    apply_fill(&store, alice, "ENG", 5.0, 100.0).await.unwrap();
    apply_fill(&store, alice, "DTA", 3.0, 50.0).await.unwrap();
    apply_fill(&store, bob, "ENG", 7.0, 100.0).await.unwrap();

    let for_alice = list_for_user(&store, alice).await;
    assert_eq!(for_alice.len(), 2);
    // Sorted by symbol.
    assert_eq!(for_alice[0].symbol, "DTA");
    assert_eq!(for_alice[1].symbol, "ENG");

    let for_bob = list_for_user(&store, bob).await;
    assert_eq!(for_bob.len(), 1);
    assert_eq!(for_bob[0].quantity, 7.0);
}

#[tokio::test]
async fn symbols_are_case_insensitive() {
    let store = fresh_store();
    let user_id = Uuid::new_v4();

    apply_fill(&store, user_id, "eng", 5.0, 100.0).await.unwrap();
    let pos = get_position(&store, user_id, "ENG").await.unwrap();
    assert_eq!(pos.quantity, 5.0);
}

#[tokio::test]
async fn unrealized_pnl_is_marked_against_current_price() {
    let store = fresh_store();
    let user_id = Uuid::new_v4();

    let pos = apply_fill(&store, user_id, "ENG", 10.0, 100.0)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unrealized_pnl(&pos, 130.0), 300.0);
    assert_eq!(unrealized_pnl(&pos, 90.0), -100.0);
}
