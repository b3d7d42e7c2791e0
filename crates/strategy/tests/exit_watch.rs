//! Integration test: ExitWatcher <-> SandboxVenue
//!
//! Scripted price paths and session statuses drive the tick loop to a
//! take-profit or stop-loss exit.

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tradecycle_clock::{FixedClock, Shutdown};
use tradecycle_core::{Instrument, InstrumentId, SessionStatus};
use tradecycle_gateway::{PriceFeed, SandboxVenue};
use tradecycle_strategy::{
    Error, ExitReason, ExitWatcher, SessionGate, SignalEvaluator, SignalParams,
};

const TICK: Duration = Duration::from_secs(10);

async fn venue_with_path(path: Vec<Decimal>) -> SandboxVenue {
    let _ = env_logger::builder().is_test(true).try_init();
    let venue = SandboxVenue::new(Arc::new(FixedClock::new(Utc::now())));
    venue
        .list_instrument(Instrument::share("SBER", 10, "TQBR"), PriceFeed::scripted(path))
        .await;
    venue
}

fn watcher() -> ExitWatcher {
    ExitWatcher::new(
        SignalEvaluator::new(SignalParams::default()),
        SessionGate::new(Duration::from_secs(2000)),
        TICK,
    )
}

#[tokio::test(start_paused = true)]
async fn test_take_profit_after_several_holds() {
    let venue = venue_with_path(vec![dec!(100.3), dec!(99.5), dec!(100.9), dec!(101.5)]).await;
    let start = Instant::now();

    let exit = watcher()
        .watch(&venue, &InstrumentId::new("SBER"), dec!(100), &mut Shutdown::never())
        .await
        .unwrap();

    assert_eq!(exit.reason, ExitReason::TakeProfit);
    assert_eq!(exit.price, dec!(101.5));
    assert_eq!(exit.ticks, 4);
    assert!(start.elapsed() >= TICK * 3);
}

#[tokio::test(start_paused = true)]
async fn test_stop_loss_once_market_opens() {
    let venue = venue_with_path(vec![dec!(98.9)]).await;
    let sber = InstrumentId::new("SBER");
    venue
        .set_session_script(
            &sber,
            [SessionStatus::BreakInTrading],
            SessionStatus::NormalTrading,
        )
        .await;
    let start = Instant::now();

    let exit = watcher()
        .watch(&venue, &sber, dec!(100), &mut Shutdown::never())
        .await
        .unwrap();

    assert_eq!(exit.reason, ExitReason::StopLoss);
    assert_eq!(exit.ticks, 1);
    // One closed-session sleep before the first tick
    assert!(start.elapsed() >= Duration::from_secs(2000));
}

#[tokio::test]
async fn test_invalid_entry_price_fails_before_polling() {
    let venue = venue_with_path(vec![dec!(100)]).await;

    let err = watcher()
        .watch(&venue, &InstrumentId::new("SBER"), dec!(0), &mut Shutdown::never())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidEntryPrice { .. }));
}

#[tokio::test]
async fn test_unknown_instrument_is_a_venue_error() {
    let venue = venue_with_path(vec![dec!(100)]).await;

    let err = watcher()
        .watch(&venue, &InstrumentId::new("NOPE"), dec!(100), &mut Shutdown::never())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Venue { .. }));
}
