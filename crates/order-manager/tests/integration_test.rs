//! Order Manager Integration Test
//!
//! Runs the tracker and the selector against the in-memory sandbox venue:
//! 1. Reconciliation adopts venue-known open orders, idempotently
//! 2. At most one in-flight order per instrument, even under concurrency
//! 3. Fill waits end in a price, a rejection, a cancellation or a timeout
//! 4. Random favorite selection filters to tradable shares

use chrono::Utc;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tradecycle_clock::{FixedClock, Shutdown, shutdown_channel};
use tradecycle_core::{Instrument, InstrumentId, InstrumentKind, OrderSpec, OrderStatus, Side};
use tradecycle_gateway::{FillBehavior, PriceFeed, SandboxVenue};
use tradecycle_order_manager::{
    Error, FillWait, OrderTracker, PositionSelector, RandomFavorite,
};
use tradecycle_ports::VenueGateway;

const WAIT: FillWait = FillWait {
    poll_interval: Duration::from_secs(3),
    timeout: Duration::from_secs(600),
};

async fn sandbox() -> Arc<SandboxVenue> {
    let _ = env_logger::builder().is_test(true).try_init();
    let venue = SandboxVenue::new(Arc::new(FixedClock::new(Utc::now())));
    venue
        .list_instrument(Instrument::share("SBER", 10, "TQBR"), PriceFeed::fixed(dec!(100)))
        .await;
    venue
        .list_instrument(Instrument::share("GAZP", 10, "TQBR"), PriceFeed::fixed(dec!(150)))
        .await;
    let mut bond = Instrument::share("OFZ", 1, "TQOB");
    bond.kind = InstrumentKind::Bond;
    venue.list_instrument(bond, PriceFeed::fixed(dec!(950))).await;
    venue.reset_account(dec!(1_000_000)).await;
    Arc::new(venue)
}

async fn tracker(venue: &Arc<SandboxVenue>) -> OrderTracker<Arc<SandboxVenue>> {
    let account = venue.get_accounts().await.unwrap().remove(0);
    OrderTracker::new(venue.clone(), account)
}

fn buy(id: &str, lots: u64) -> OrderSpec {
    OrderSpec::best_price(id, Side::Buy, lots)
}

#[tokio::test]
async fn test_reconcile_adopts_existing_buy_instead_of_placing_another() {
    let venue = sandbox().await;
    let tracker = tracker(&venue).await;

    // Left behind by a previous run
    venue.queue_fill_behavior(FillBehavior::Never).await;
    let existing = venue.place_order(tracker.account_id(), &buy("SBER", 2)).await.unwrap();

    let adopted = tracker.reconcile().await.unwrap();
    assert_eq!(adopted, vec![existing.clone()]);
    assert!(tracker.is_tracked(&InstrumentId::new("SBER")));

    let err = tracker.place(&buy("SBER", 2)).await.unwrap_err();
    match err {
        Error::DuplicateOrder { order_id, .. } => assert_eq!(order_id, Some(existing.order_id)),
        other => panic!("expected DuplicateOrder, got {other:?}"),
    }
    assert_eq!(venue.orders().await.len(), 1);
}

#[tokio::test]
async fn test_reconcile_is_idempotent() {
    let venue = sandbox().await;
    let tracker = tracker(&venue).await;
    venue.queue_fill_behavior(FillBehavior::Never).await;
    venue.queue_fill_behavior(FillBehavior::Never).await;
    venue.place_order(tracker.account_id(), &buy("SBER", 1)).await.unwrap();
    venue.place_order(tracker.account_id(), &buy("GAZP", 1)).await.unwrap();

    let first = tracker.reconcile().await.unwrap();
    let registry = tracker.in_flight();
    let second = tracker.reconcile().await.unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
    assert_eq!(registry, tracker.in_flight());
}

#[tokio::test]
async fn test_two_open_orders_for_one_instrument_conflict() {
    let venue = sandbox().await;
    let tracker = tracker(&venue).await;
    venue.queue_fill_behavior(FillBehavior::Never).await;
    venue.queue_fill_behavior(FillBehavior::Never).await;
    venue.place_order(tracker.account_id(), &buy("SBER", 1)).await.unwrap();
    venue.place_order(tracker.account_id(), &buy("SBER", 1)).await.unwrap();

    let err = tracker.reconcile().await.unwrap_err();
    match err {
        Error::ReconciliationConflict { instrument_id, order_ids } => {
            assert_eq!(instrument_id.as_str(), "SBER");
            assert_eq!(order_ids.len(), 2);
        }
        other => panic!("expected ReconciliationConflict, got {other:?}"),
    }
    // Neither merged nor cancelled
    assert!(tracker.in_flight().is_empty());
    assert_eq!(venue.get_open_orders(tracker.account_id()).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_concurrent_places_for_one_instrument() {
    let venue = sandbox().await;
    let tracker = tracker(&venue).await;
    let spec = buy("SBER", 1);

    let (a, b) = tokio::join!(tracker.place(&spec), tracker.place(&spec));

    let results = [a, b];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .any(|r| matches!(r, Err(Error::DuplicateOrder { .. })))
    );
    assert_eq!(venue.orders().await.len(), 1);
    assert_eq!(tracker.in_flight().len(), 1);
}

#[tokio::test]
async fn test_failed_placement_frees_the_instrument() {
    let venue = sandbox().await;
    let tracker = tracker(&venue).await;

    venue.fail_next_calls(1).await;
    assert!(matches!(
        tracker.place(&buy("SBER", 1)).await,
        Err(Error::Venue { .. })
    ));
    assert!(!tracker.is_tracked(&InstrumentId::new("SBER")));
    assert!(tracker.place(&buy("SBER", 1)).await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_wait_returns_fill_price_and_releases() {
    let venue = sandbox().await;
    let tracker = tracker(&venue).await;
    venue.queue_fill_behavior(FillBehavior::PartialThenFill(3)).await;

    let handle = tracker.place(&buy("SBER", 4)).await.unwrap();
    let price = tracker
        .wait_until_terminal(&handle, WAIT, &mut Shutdown::never())
        .await
        .unwrap();

    assert_eq!(price, dec!(100));
    assert!(tracker.in_flight().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_rejected_order() {
    let venue = sandbox().await;
    let tracker = tracker(&venue).await;
    venue.queue_fill_behavior(FillBehavior::Reject).await;

    let handle = tracker.place(&buy("GAZP", 1)).await.unwrap();
    let err = tracker
        .wait_until_terminal(&handle, WAIT, &mut Shutdown::never())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::OrderRejected { .. }));
    assert_eq!(err.order_id(), Some(&handle.order_id));
    assert!(!tracker.is_tracked(&handle.instrument_id));
}

#[tokio::test(start_paused = true)]
async fn test_venue_cancelled_order() {
    let venue = sandbox().await;
    let tracker = tracker(&venue).await;
    venue.queue_fill_behavior(FillBehavior::CancelAfterPolls(2)).await;

    let handle = tracker.place(&buy("GAZP", 1)).await.unwrap();
    let err = tracker
        .wait_until_terminal(&handle, WAIT, &mut Shutdown::never())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::OrderCancelled { lots_executed: 0, .. }));
    assert!(tracker.in_flight().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_unfilled_order_is_cancelled_after_timeout() {
    let venue = sandbox().await;
    let tracker = tracker(&venue).await;
    venue.queue_fill_behavior(FillBehavior::Never).await;
    let wait = FillWait {
        poll_interval: Duration::from_secs(3),
        timeout: Duration::from_secs(10),
    };

    let handle = tracker.place(&buy("SBER", 1)).await.unwrap();
    let err = tracker
        .wait_until_terminal(&handle, wait, &mut Shutdown::never())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::FillTimeout { .. }));
    assert!(tracker.in_flight().is_empty());
    assert_eq!(venue.orders().await[0].status, OrderStatus::Cancelled);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_interrupts_wait_and_keeps_tracking() {
    let venue = sandbox().await;
    let tracker = Arc::new(tracker(&venue).await);
    venue.queue_fill_behavior(FillBehavior::Never).await;
    let handle = tracker.place(&buy("SBER", 1)).await.unwrap();

    let (stop, mut shutdown) = shutdown_channel();
    let waiter = {
        let tracker = tracker.clone();
        let handle = handle.clone();
        tokio::spawn(async move { tracker.wait_until_terminal(&handle, WAIT, &mut shutdown).await })
    };
    tokio::time::sleep(Duration::from_secs(7)).await;
    stop.trigger();

    let err = waiter.await.unwrap().unwrap_err();
    assert!(matches!(err, Error::Interrupted(_)));
    assert!(tracker.is_tracked(&handle.instrument_id));
}

#[tokio::test]
async fn test_random_favorite_picks_tradable_share() {
    let venue = sandbox().await;
    let selector = RandomFavorite::with_seed(
        vec![
            InstrumentId::new("OFZ"),
            InstrumentId::new("SBER"),
            InstrumentId::new("DELISTED"),
        ],
        7,
    );

    for _ in 0..5 {
        let chosen = selector.choose_instrument(&*venue).await.unwrap();
        assert_eq!(chosen.as_str(), "SBER");
    }
}

#[tokio::test]
async fn test_random_favorite_without_candidates() {
    let venue = sandbox().await;
    let selector = RandomFavorite::new(vec![InstrumentId::new("OFZ")]);

    let err = selector.choose_instrument(&*venue).await.unwrap_err();
    assert!(matches!(err, Error::NoTradableInstrument { candidates: 1 }));
}
