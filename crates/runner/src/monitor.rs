//! Per-position monitor task
//!
//! Owns one open position: watches it until the exit rule fires, sells the
//! whole position at best price and reports the realized P&L.

use log::info;
use rust_decimal::Decimal;
use tradecycle_core::{Instrument, Lots, OrderSpec, Price, Side};
use tradecycle_order_manager::{FillWait, RealizedPnl};
use tradecycle_strategy::ExitWatcher;

use crate::context::EngineContext;
use crate::error::{EngineError, Result};

/// An open position handed to a monitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoredPosition {
    pub instrument: Instrument,
    pub lots: Lots,
    pub entry_price: Price,
}

pub struct PositionMonitor {
    pub cycle_id: u64,
    pub position: MonitoredPosition,
    pub watcher: ExitWatcher,
    pub fill_wait: FillWait,
    pub commission_rate: Decimal,
}

impl PositionMonitor {
    pub async fn run(self, mut ctx: EngineContext) -> Result<RealizedPnl> {
        let cycle_id = self.cycle_id;
        let instrument = &self.position.instrument;

        let exit = self
            .watcher
            .watch(
                &*ctx.venue,
                &instrument.id,
                self.position.entry_price,
                &mut ctx.shutdown,
            )
            .await
            .map_err(|e| EngineError::strategy(cycle_id, &instrument.id, e))?;

        let spec = OrderSpec::best_price(instrument.id.clone(), Side::Sell, self.position.lots);
        let handle = ctx
            .tracker
            .place(&spec)
            .await
            .map_err(|e| EngineError::order(cycle_id, e))?;
        let sell_price = ctx
            .tracker
            .wait_until_terminal(&handle, self.fill_wait, &mut ctx.shutdown)
            .await
            .map_err(|e| EngineError::order(cycle_id, e))?;

        let pnl = RealizedPnl::new(
            instrument.id.clone(),
            self.position.lots,
            instrument.lot_size,
            self.position.entry_price,
            sell_price,
            self.commission_rate,
        );
        info!(
            "[CYCLE {}] closed on {:?} signal @ {}: {}",
            cycle_id, exit.reason, exit.price, pnl
        );
        Ok(pnl)
    }
}
