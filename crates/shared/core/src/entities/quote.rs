use serde::{Deserialize, Serialize};

use crate::instruments::InstrumentId;
use crate::values::{Price, Quotation, Timestamp};

/// Last-trade price observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub instrument_id: InstrumentId,
    pub price: Quotation,
    pub time: Timestamp,
}

impl PriceQuote {
    pub fn price(&self) -> Price {
        self.price.to_decimal()
    }
}
