use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Position;
use crate::instruments::{InstrumentId, InstrumentKind};

/// Brokerage account identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account state as reported by the venue at one instant
///
/// Always fetched fresh; never cached across ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub account_id: AccountId,
    /// Free capital in `currency` units
    pub free_capital: Decimal,
    pub currency: String,
    pub positions: Vec<Position>,
}

impl PortfolioSnapshot {
    /// Open position for an instrument, if any
    pub fn position(&self, instrument_id: &InstrumentId) -> Option<&Position> {
        self.positions
            .iter()
            .find(|p| &p.instrument_id == instrument_id && p.is_open())
    }

    /// Open share positions, the ones the strategy may work with
    pub fn open_share_positions(&self) -> impl Iterator<Item = &Position> {
        self.positions
            .iter()
            .filter(|p| p.is_open() && p.kind == InstrumentKind::Share)
    }
}
