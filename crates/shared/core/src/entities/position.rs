use serde::{Deserialize, Serialize};

use crate::instruments::{InstrumentId, InstrumentKind};
use crate::values::{Lots, Price};

/// An open holding of one instrument
///
/// Exists only while `quantity_lots > 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub instrument_id: InstrumentId,
    pub kind: InstrumentKind,
    pub quantity_lots: Lots,
    /// Average entry price per share
    pub average_price: Price,
    pub currency: String,
}

impl Position {
    pub fn is_open(&self) -> bool {
        self.quantity_lots > 0
    }
}
