use serde::{Deserialize, Serialize};

/// Trading-session status of an instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Unspecified,
    NotAvailableForTrading,
    OpeningPeriod,
    OpeningAuction,
    NormalTrading,
    BreakInTrading,
    ClosingPeriod,
    ClosingAuction,
    DiscreteAuction,
    DealerNormalTrading,
    DealerBreakInTrading,
    DealerNotAvailableForTrading,
}

impl SessionStatus {
    /// Normal trading, on the exchange or with the dealer
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            SessionStatus::NormalTrading | SessionStatus::DealerNormalTrading
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_normal_trading_is_open() {
        assert!(SessionStatus::NormalTrading.is_open());
        assert!(SessionStatus::DealerNormalTrading.is_open());
        assert!(!SessionStatus::BreakInTrading.is_open());
        assert!(!SessionStatus::ClosingAuction.is_open());
        assert!(!SessionStatus::Unspecified.is_open());
    }
}
