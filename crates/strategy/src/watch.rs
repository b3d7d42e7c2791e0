//! Tick loop over one open position
//!
//! Each tick waits for an open session, reads the last price and evaluates
//! the exit rule. Hold sleeps one poll interval and re-enters watching.

use log::info;
use rust_decimal::Decimal;
use std::time::Duration;
use tradecycle_clock::Shutdown;
use tradecycle_core::{InstrumentId, Price};
use tradecycle_ports::VenueGateway;

use crate::error::{Error, Result};
use crate::session::SessionGate;
use crate::signal::{ExitDecision, ExitReason, SignalEvaluator};

/// Why and at what observed price a position should be closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitSignal {
    pub reason: ExitReason,
    pub price: Price,
    /// Ticks evaluated, including the one that signalled
    pub ticks: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct ExitWatcher {
    evaluator: SignalEvaluator,
    gate: SessionGate,
    poll_interval: Duration,
}

impl ExitWatcher {
    pub fn new(evaluator: SignalEvaluator, gate: SessionGate, poll_interval: Duration) -> Self {
        Self {
            evaluator,
            gate,
            poll_interval,
        }
    }

    /// Watch until the exit rule fires for a position entered at `entry_price`.
    ///
    /// The first tick is evaluated right away, with no initial sleep. The
    /// session gate runs before every tick, not once before the loop, so a
    /// session that closes mid-watch pauses evaluation until it reopens. A
    /// Hold sleeps one poll interval before the next tick.
    pub async fn watch(
        &self,
        venue: &dyn VenueGateway,
        instrument_id: &InstrumentId,
        entry_price: Price,
        shutdown: &mut Shutdown,
    ) -> Result<ExitSignal> {
        if entry_price <= Decimal::ZERO {
            return Err(Error::InvalidEntryPrice { entry_price });
        }

        let mut ticks = 0;
        loop {
            self.gate.await_open(venue, instrument_id, shutdown).await?;

            let quote = venue
                .get_last_price(instrument_id)
                .await
                .map_err(|e| Error::venue(instrument_id, e))?;
            ticks += 1;

            let eval = self.evaluator.evaluate(entry_price, quote.price())?;
            info!(
                "[SIGNAL] {} tick {}: entry {}, price {}, difference {}, margin {}%",
                instrument_id,
                ticks,
                eval.entry_price,
                eval.current_price,
                eval.profit,
                eval.margin_pct.round_dp(4)
            );

            if let ExitDecision::Sell(reason) = eval.decision {
                info!(
                    "[SIGNAL] {} sell signal ({:?}) at {} after {} ticks",
                    instrument_id, reason, eval.current_price, ticks
                );
                return Ok(ExitSignal {
                    reason,
                    price: eval.current_price,
                    ticks,
                });
            }

            shutdown.sleep(self.poll_interval).await?;
        }
    }
}
