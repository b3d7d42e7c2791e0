//! Realized P&L of a closed position

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tradecycle_core::{InstrumentId, Lots, Price};

/// Outcome of one buy/sell round trip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealizedPnl {
    pub instrument_id: InstrumentId,
    pub lots: Lots,
    pub lot_size: Lots,
    pub buy_price: Price,
    pub sell_price: Price,
    /// `sell_price - buy_price`, per share
    pub price_delta: Decimal,
    pub gross: Decimal,
    /// Charged on both legs
    pub commission: Decimal,
    pub net: Decimal,
}

impl RealizedPnl {
    pub fn new(
        instrument_id: InstrumentId,
        lots: Lots,
        lot_size: Lots,
        buy_price: Price,
        sell_price: Price,
        commission_rate: Decimal,
    ) -> Self {
        let shares = Decimal::from(lots) * Decimal::from(lot_size);
        let price_delta = sell_price - buy_price;
        let gross = price_delta * shares;
        let commission = (buy_price + sell_price) * commission_rate * shares;
        Self {
            instrument_id,
            lots,
            lot_size,
            buy_price,
            sell_price,
            price_delta,
            gross,
            commission,
            net: gross - commission,
        }
    }
}

impl std::fmt::Display for RealizedPnl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} lots x {} bought @ {} sold @ {} (delta {}) gross {} commission {} net {}",
            self.instrument_id,
            self.lots,
            self.lot_size,
            self.buy_price,
            self.sell_price,
            self.price_delta,
            self.gross,
            self.commission,
            self.net
        )
    }
}
