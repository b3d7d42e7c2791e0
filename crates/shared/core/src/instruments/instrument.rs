use serde::{Deserialize, Serialize};

use crate::values::Lots;

/// Unique identifier for an instrument
///
/// This provides a stable reference to an instrument that can be stored
/// in orders and used as map keys, without copying the full instrument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstrumentId(pub String);

impl InstrumentId {
    /// Create a new instrument ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for InstrumentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for InstrumentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Asset class of an instrument as reported by the venue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentKind {
    Share,
    Bond,
    Etf,
    Currency,
    Future,
    Option,
    Other,
}

/// Instrument metadata needed to size and place orders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub id: InstrumentId,
    /// Shares per lot
    pub lot_size: Lots,
    /// Venue board / class code (e.g. "TQBR")
    pub class_code: String,
    pub kind: InstrumentKind,
    /// Whether the venue accepts API orders for this instrument
    pub api_trade_available: bool,
}

impl Instrument {
    pub fn share(
        id: impl Into<InstrumentId>,
        lot_size: Lots,
        class_code: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            lot_size,
            class_code: class_code.into(),
            kind: InstrumentKind::Share,
            api_trade_available: true,
        }
    }

    pub fn is_share(&self) -> bool {
        self.kind == InstrumentKind::Share
    }

    /// A share the venue will accept API orders for
    pub fn is_tradable_share(&self) -> bool {
        self.is_share() && self.api_trade_available && self.lot_size > 0
    }
}
