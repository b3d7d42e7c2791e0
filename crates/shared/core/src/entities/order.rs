use serde::{Deserialize, Serialize};

use super::{OrderStatus, OrderType, Side};
use crate::instruments::InstrumentId;
use crate::values::{Lots, Price, Timestamp};

/// Venue-assigned order identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// What to submit to the venue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSpec {
    pub instrument_id: InstrumentId,
    pub side: Side,
    pub order_type: OrderType,
    pub lots: Lots,
    /// Required for limit orders
    pub price: Option<Price>,
}

impl OrderSpec {
    /// Entry/exit order at the venue's best price
    pub fn best_price(instrument_id: impl Into<InstrumentId>, side: Side, lots: Lots) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            side,
            order_type: OrderType::BestPrice,
            lots,
            price: None,
        }
    }

    pub fn limit(
        instrument_id: impl Into<InstrumentId>,
        side: Side,
        lots: Lots,
        price: Price,
    ) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            side,
            order_type: OrderType::Limit,
            lots,
            price: Some(price),
        }
    }

    /// Validate the spec based on order type requirements
    pub fn validate(&self) -> bool {
        if self.lots == 0 {
            return false;
        }
        match self.order_type {
            OrderType::Market | OrderType::BestPrice => self.price.is_none(),
            OrderType::Limit => self.price.is_some_and(|p| p > Price::ZERO),
        }
    }
}

/// Reference to an order the venue has accepted
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderHandle {
    pub order_id: OrderId,
    pub instrument_id: InstrumentId,
    pub side: Side,
    pub lots: Lots,
}

/// Order as reported by the venue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub instrument_id: InstrumentId,
    pub side: Side,
    pub order_type: OrderType,
    /// Requested quantity in lots
    pub lots_requested: Lots,
    pub lots_executed: Lots,
    pub status: OrderStatus,
    /// Average executed price per share, once anything has executed
    pub executed_price: Option<Price>,
    pub created_at: Timestamp,
}

impl Order {
    /// A freshly accepted order
    pub fn accepted(id: OrderId, spec: &OrderSpec, created_at: Timestamp) -> Self {
        Self {
            id,
            instrument_id: spec.instrument_id.clone(),
            side: spec.side,
            order_type: spec.order_type,
            lots_requested: spec.lots,
            lots_executed: 0,
            status: OrderStatus::New,
            executed_price: None,
            created_at,
        }
    }

    pub fn handle(&self) -> OrderHandle {
        OrderHandle {
            order_id: self.id.clone(),
            instrument_id: self.instrument_id.clone(),
            side: self.side,
            lots: self.lots_requested,
        }
    }

    /// Move to `next` if the transition keeps status monotonic.
    ///
    /// Returns false and leaves the order untouched otherwise.
    pub fn transition(&mut self, next: OrderStatus) -> bool {
        if !self.status.can_transition_to(next) {
            return false;
        }
        self.status = next;
        true
    }

    /// Returns remaining lots to be filled
    pub fn remaining_lots(&self) -> Lots {
        self.lots_requested.saturating_sub(self.lots_executed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn test_spec_validation() {
        assert!(OrderSpec::best_price("A", Side::Buy, 1).validate());
        assert!(!OrderSpec::best_price("A", Side::Buy, 0).validate());
        assert!(OrderSpec::limit("A", Side::Sell, 2, dec!(10)).validate());
        assert!(!OrderSpec::limit("A", Side::Sell, 2, dec!(0)).validate());
    }

    #[test]
    fn test_filled_order_does_not_reopen() {
        let spec = OrderSpec::best_price("A", Side::Buy, 3);
        let mut order = Order::accepted(OrderId::new("o-1"), &spec, Utc::now());

        assert!(order.transition(OrderStatus::PartiallyFilled));
        assert!(order.transition(OrderStatus::Filled));
        assert!(!order.transition(OrderStatus::Cancelled));
        assert_eq!(order.status, OrderStatus::Filled);
    }
}
