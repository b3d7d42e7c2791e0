//! Trading-session gate
//!
//! Blocks until the venue reports a normal trading session for the
//! instrument. The wait is unbounded unless a maximum is configured, and
//! always ends early on shutdown.

use log::{debug, info};
use std::time::Duration;
use tokio::time::Instant;
use tradecycle_clock::Shutdown;
use tradecycle_core::{InstrumentId, SessionStatus};
use tradecycle_ports::VenueGateway;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionGate {
    poll_interval: Duration,
    max_wait: Option<Duration>,
}

impl SessionGate {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            max_wait: None,
        }
    }

    /// Give up with [`Error::SessionWaitExceeded`] after `max_wait`
    pub fn with_max_wait(mut self, max_wait: Option<Duration>) -> Self {
        self.max_wait = max_wait;
        self
    }

    pub async fn await_open(
        &self,
        venue: &dyn VenueGateway,
        instrument_id: &InstrumentId,
        shutdown: &mut Shutdown,
    ) -> Result<SessionStatus> {
        let started = Instant::now();
        let deadline = self.max_wait.map(|max| started + max);

        loop {
            shutdown.check()?;

            let status = venue
                .get_trading_status(instrument_id)
                .await
                .map_err(|e| Error::venue(instrument_id, e))?;
            if status.is_open() {
                debug!("[SESSION] {} open: {:?}", instrument_id, status);
                return Ok(status);
            }

            let mut sleep_for = self.poll_interval;
            if let Some(deadline) = deadline {
                let now = Instant::now();
                if now >= deadline {
                    return Err(Error::SessionWaitExceeded {
                        instrument_id: instrument_id.clone(),
                        waited: now - started,
                        last_status: status,
                    });
                }
                sleep_for = sleep_for.min(deadline - now);
            }

            info!(
                "[SESSION] {} not trading ({:?}), sleeping {:?}",
                instrument_id, status, sleep_for
            );
            shutdown.sleep(sleep_for).await?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use tradecycle_clock::{FixedClock, shutdown_channel};
    use tradecycle_core::Instrument;
    use tradecycle_gateway::{PriceFeed, SandboxVenue};

    async fn venue(script: Vec<SessionStatus>, steady: SessionStatus) -> SandboxVenue {
        let venue = SandboxVenue::new(Arc::new(FixedClock::new(Utc::now())));
        venue
            .list_instrument(Instrument::share("SBER", 10, "TQBR"), PriceFeed::fixed(dec!(100)))
            .await;
        venue
            .set_session_script(&InstrumentId::new("SBER"), script, steady)
            .await;
        venue
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_through_closed_statuses() {
        let venue = venue(
            vec![
                SessionStatus::NotAvailableForTrading,
                SessionStatus::OpeningAuction,
            ],
            SessionStatus::NormalTrading,
        )
        .await;
        let gate = SessionGate::new(Duration::from_secs(2000));
        let start = Instant::now();

        let status = gate
            .await_open(&venue, &InstrumentId::new("SBER"), &mut Shutdown::never())
            .await
            .unwrap();

        assert_eq!(status, SessionStatus::NormalTrading);
        assert!(start.elapsed() >= Duration::from_secs(4000));
        assert!(start.elapsed() < Duration::from_secs(4001));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dealer_trading_counts_as_open() {
        let venue = venue(vec![], SessionStatus::DealerNormalTrading).await;
        let gate = SessionGate::new(Duration::from_secs(2000));

        let status = gate
            .await_open(&venue, &InstrumentId::new("SBER"), &mut Shutdown::never())
            .await
            .unwrap();
        assert_eq!(status, SessionStatus::DealerNormalTrading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_wait_gives_up() {
        let venue = venue(vec![], SessionStatus::BreakInTrading).await;
        let gate = SessionGate::new(Duration::from_secs(60))
            .with_max_wait(Some(Duration::from_secs(150)));

        let err = gate
            .await_open(&venue, &InstrumentId::new("SBER"), &mut Shutdown::never())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::SessionWaitExceeded {
                last_status: SessionStatus::BreakInTrading,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_ends_unbounded_wait() {
        let venue = Arc::new(venue(vec![], SessionStatus::ClosingAuction).await);
        let (stop, mut shutdown) = shutdown_channel();

        let waiter = {
            let venue = venue.clone();
            tokio::spawn(async move {
                SessionGate::new(Duration::from_secs(2000))
                    .await_open(&*venue, &InstrumentId::new("SBER"), &mut shutdown)
                    .await
            })
        };
        tokio::time::sleep(Duration::from_secs(5)).await;
        stop.trigger();

        assert!(matches!(waiter.await.unwrap(), Err(Error::Interrupted(_))));
    }
}
