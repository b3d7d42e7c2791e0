//! Strategy loop
//!
//! One cycle:
//!
//! ```text
//! reconcile ──► finish adopted orders ──► portfolio
//!                                            │
//!              held shares? ──── yes ────────┤
//!                   │ no                     │
//!   select ─► size ─► BUY ─► wait fill       │
//!                   │                        │
//!                   └──────► one monitor per position (JoinSet)
//!                              await_open ─► ticks ─► SELL ─► wait fill
//!                                            │
//!                            realized P&L, free capital old vs new
//! ```
//!
//! Cycles repeat until shutdown. Nothing carries over between cycles except
//! what the venue reports.

use log::{error, info, warn};
use rust_decimal::Decimal;
use std::time::Duration;
use tokio::task::JoinSet;
use tradecycle_core::{InstrumentId, OrderSpec, Side};
use tradecycle_order_manager::{FillWait, PositionSelector, RealizedPnl, lots_to_buy};
use tradecycle_strategy::{ExitWatcher, SignalEvaluator};

use crate::config::EngineConfig;
use crate::context::EngineContext;
use crate::error::{EngineError, Result};
use crate::monitor::{MonitoredPosition, PositionMonitor};

/// What one cycle did
#[derive(Debug)]
pub struct CycleReport {
    pub cycle_id: u64,
    /// Venue-known open orders adopted at the start of the cycle
    pub adopted_orders: usize,
    /// Entry made this cycle, if no position was held
    pub bought: Option<MonitoredPosition>,
    pub monitored: Vec<InstrumentId>,
    pub capital_before: Decimal,
    pub capital_after: Decimal,
    pub closed: Vec<RealizedPnl>,
    /// Monitors that ended in an error
    pub failed: Vec<EngineError>,
}

pub struct StrategyLoop {
    ctx: EngineContext,
    selector: Box<dyn PositionSelector>,
    watcher: ExitWatcher,
    allocation_fraction: Decimal,
    commission_rate: Decimal,
    fill_wait: FillWait,
    /// Pause after a failed cycle
    retry_delay: Duration,
    cycle_id: u64,
}

impl StrategyLoop {
    /// Build from a validated configuration
    pub fn new(ctx: EngineContext, config: &EngineConfig) -> Self {
        Self {
            ctx,
            selector: config.selection.build(),
            watcher: ExitWatcher::new(
                SignalEvaluator::new(config.signal_params()),
                config.session_gate(),
                config.poll_interval(),
            ),
            allocation_fraction: config.allocation_fraction,
            commission_rate: config.commission_rate,
            fill_wait: config.fill_wait(),
            retry_delay: config.poll_interval(),
            cycle_id: 0,
        }
    }

    pub fn with_selector(mut self, selector: Box<dyn PositionSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    /// Run cycles until shutdown or a fatal error
    pub async fn run(&mut self) -> Result<()> {
        info!(
            "[ENGINE] strategy loop started (selection: {})",
            self.selector.name()
        );

        loop {
            if self.ctx.shutdown.is_triggered() {
                info!("[ENGINE] shutdown requested, stopping");
                return Ok(());
            }

            let failed = match self.run_cycle().await {
                Ok(report) => {
                    for err in &report.failed {
                        error!("[CYCLE {}] monitor failed: {}", report.cycle_id, err);
                    }
                    if let Some(fatal) = report.failed.iter().position(EngineError::is_fatal) {
                        let mut failed = report.failed;
                        return Err(failed.swap_remove(fatal));
                    }
                    !report.failed.is_empty()
                }
                Err(e) if e.is_interrupted() => {
                    info!("[ENGINE] shutdown requested, stopping");
                    return Ok(());
                }
                Err(e) if e.is_fatal() => {
                    error!("[ENGINE] fatal: {}", e);
                    return Err(e);
                }
                Err(e) => {
                    error!("[ENGINE] {}", e);
                    true
                }
            };

            // A failed cycle backs off one tick before the next attempt
            if failed && self.ctx.shutdown.sleep(self.retry_delay).await.is_err() {
                info!("[ENGINE] shutdown requested, stopping");
                return Ok(());
            }
        }
    }

    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        self.cycle_id += 1;
        let cycle_id = self.cycle_id;
        self.ctx
            .shutdown
            .check()
            .map_err(|_| EngineError::Interrupted)?;

        let adopted = self
            .ctx
            .tracker
            .reconcile()
            .await
            .map_err(|e| EngineError::order(cycle_id, e))?;
        let mut closed = self.resume_adopted(cycle_id).await?;

        let portfolio = self
            .ctx
            .venue
            .get_portfolio(self.ctx.account_id())
            .await
            .map_err(|e| EngineError::venue(cycle_id, None, e))?;
        let capital_before = portfolio.free_capital;
        info!(
            "[CYCLE {}] free capital {} {}",
            cycle_id, capital_before, portfolio.currency
        );

        let held: Vec<_> = portfolio.open_share_positions().cloned().collect();
        let mut positions = Vec::with_capacity(held.len().max(1));
        let mut bought = None;
        if held.is_empty() {
            let position = self.enter(cycle_id, capital_before).await?;
            bought = Some(position.clone());
            positions.push(position);
        } else {
            for held in held {
                let instrument = self
                    .ctx
                    .venue
                    .get_instrument_metadata(&held.instrument_id)
                    .await
                    .map_err(|e| EngineError::venue(cycle_id, Some(&held.instrument_id), e))?;
                info!(
                    "[CYCLE {}] holding {} lots of {} @ {}, monitoring",
                    cycle_id, held.quantity_lots, held.instrument_id, held.average_price
                );
                positions.push(MonitoredPosition {
                    instrument,
                    lots: held.quantity_lots,
                    entry_price: held.average_price,
                });
            }
        }

        let monitored: Vec<InstrumentId> =
            positions.iter().map(|p| p.instrument.id.clone()).collect();
        let mut tasks = JoinSet::new();
        for position in positions {
            let monitor = PositionMonitor {
                cycle_id,
                position,
                watcher: self.watcher,
                fill_wait: self.fill_wait,
                commission_rate: self.commission_rate,
            };
            tasks.spawn(monitor.run(self.ctx.clone()));
        }

        let mut failed = Vec::new();
        let mut interrupted = false;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(pnl)) => closed.push(pnl),
                Ok(Err(e)) if e.is_interrupted() => interrupted = true,
                Ok(Err(e)) => failed.push(e),
                Err(e) => failed.push(EngineError::Task {
                    cycle_id,
                    message: e.to_string(),
                }),
            }
        }
        if interrupted {
            return Err(EngineError::Interrupted);
        }
        closed.sort_by(|a, b| a.instrument_id.cmp(&b.instrument_id));

        let capital_after = self
            .ctx
            .venue
            .get_portfolio(self.ctx.account_id())
            .await
            .map_err(|e| EngineError::venue(cycle_id, None, e))?
            .free_capital;
        info!(
            "[CYCLE {}] free capital: old {}, new {}",
            cycle_id, capital_before, capital_after
        );
        if !failed.is_empty() {
            warn!(
                "[CYCLE {}] {} of {} monitors failed",
                cycle_id,
                failed.len(),
                monitored.len()
            );
        }

        Ok(CycleReport {
            cycle_id,
            adopted_orders: adopted.len(),
            bought,
            monitored,
            capital_before,
            capital_after,
            closed,
            failed,
        })
    }

    /// Follow orders adopted by `reconcile` to a terminal state.
    ///
    /// A resumed SELL closes a held position, so its fill is recorded as
    /// realized P&L against the position's average price.
    async fn resume_adopted(&mut self, cycle_id: u64) -> Result<Vec<RealizedPnl>> {
        let resuming = self.ctx.tracker.in_flight();
        if resuming.is_empty() {
            return Ok(Vec::new());
        }

        let held = self
            .ctx
            .venue
            .get_portfolio(self.ctx.account_id())
            .await
            .map_err(|e| EngineError::venue(cycle_id, None, e))?;

        let mut closed = Vec::new();
        for handle in resuming {
            info!(
                "[CYCLE {}] resuming {} order {} for {}",
                cycle_id, handle.side, handle.order_id, handle.instrument_id
            );
            let entry_price = held
                .position(&handle.instrument_id)
                .map(|position| position.average_price);
            let fill_price = self
                .ctx
                .tracker
                .wait_until_terminal(&handle, self.fill_wait, &mut self.ctx.shutdown)
                .await
                .map_err(|e| EngineError::order(cycle_id, e))?;

            if handle.side != Side::Sell {
                continue;
            }
            let Some(entry_price) = entry_price else {
                warn!(
                    "[CYCLE {}] resumed SELL {} for {} filled @ {}, no held position to price it",
                    cycle_id, handle.order_id, handle.instrument_id, fill_price
                );
                continue;
            };
            let instrument = self
                .ctx
                .venue
                .get_instrument_metadata(&handle.instrument_id)
                .await
                .map_err(|e| EngineError::venue(cycle_id, Some(&handle.instrument_id), e))?;
            let pnl = RealizedPnl::new(
                handle.instrument_id.clone(),
                handle.lots,
                instrument.lot_size,
                entry_price,
                fill_price,
                self.commission_rate,
            );
            info!("[CYCLE {}] closed by resumed SELL: {}", cycle_id, pnl);
            closed.push(pnl);
        }
        Ok(closed)
    }

    /// Select, size and buy a new position
    async fn enter(&mut self, cycle_id: u64, free_capital: Decimal) -> Result<MonitoredPosition> {
        let venue = self.ctx.venue.clone();

        let instrument_id = self
            .selector
            .choose_instrument(&*venue)
            .await
            .map_err(|e| EngineError::order(cycle_id, e))?;
        let instrument = venue
            .get_instrument_metadata(&instrument_id)
            .await
            .map_err(|e| EngineError::venue(cycle_id, Some(&instrument_id), e))?;

        let quote = venue
            .get_last_price(&instrument_id)
            .await
            .map_err(|e| EngineError::venue(cycle_id, Some(&instrument_id), e))?;
        let price = quote.price();
        info!(
            "[CYCLE {}] {} last price {} at {}",
            cycle_id, instrument_id, price, quote.time
        );

        let lots = lots_to_buy(&instrument, free_capital, price, self.allocation_fraction)
            .map_err(|e| EngineError::order(cycle_id, e))?;
        info!(
            "[CYCLE {}] buying {} lots of {} (lot size {})",
            cycle_id, lots, instrument_id, instrument.lot_size
        );

        let handle = self
            .ctx
            .tracker
            .place(&OrderSpec::best_price(instrument_id, Side::Buy, lots))
            .await
            .map_err(|e| EngineError::order(cycle_id, e))?;
        let entry_price = self
            .ctx
            .tracker
            .wait_until_terminal(&handle, self.fill_wait, &mut self.ctx.shutdown)
            .await
            .map_err(|e| EngineError::order(cycle_id, e))?;

        Ok(MonitoredPosition {
            instrument,
            lots,
            entry_price,
        })
    }
}
