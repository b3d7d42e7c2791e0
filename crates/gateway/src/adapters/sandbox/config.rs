use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tradecycle_core::Instrument;

use super::feed::PriceFeed;

/// How the sandbox seeds a fresh account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SandboxConfig {
    /// Money paid into the sandbox account on reset
    pub pay_in: Decimal,
    pub currency: String,
    /// Commission charged on each fill's notional
    pub commission_rate: Decimal,
    pub instruments: Vec<SandboxInstrumentConfig>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            pay_in: dec!(1_000_000),
            currency: "rub".to_string(),
            commission_rate: dec!(0.0004),
            instruments: Vec::new(),
        }
    }
}

/// One instrument listed on the sandbox venue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SandboxInstrumentConfig {
    #[serde(flatten)]
    pub instrument: Instrument,
    /// Starting last-trade price
    pub price: Decimal,
    /// Random-walk step size; fixed price when absent
    #[serde(default)]
    pub volatility: Option<Decimal>,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SandboxInstrumentConfig {
    pub fn feed(&self) -> PriceFeed {
        match self.volatility {
            Some(vol) if vol > Decimal::ZERO => PriceFeed::random_walk(self.price, vol, self.seed),
            _ => PriceFeed::fixed(self.price),
        }
    }
}
