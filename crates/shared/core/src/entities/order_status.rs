use serde::{Deserialize, Serialize};

/// Order lifecycle status
///
/// Status only moves forward: `New -> PartiallyFilled -> Filled`, or from
/// any active state to `Rejected` / `Cancelled`. Terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order has been accepted but nothing is executed yet
    New,
    /// Order has been partially filled
    PartiallyFilled,
    /// Order has been completely filled
    Filled,
    /// Order was rejected by the venue
    Rejected,
    /// Order has been cancelled
    Cancelled,
}

impl OrderStatus {
    /// Returns true if the order is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Rejected | OrderStatus::Cancelled
        )
    }

    /// Returns true if the order is still active
    pub fn is_active(&self) -> bool {
        matches!(self, OrderStatus::New | OrderStatus::PartiallyFilled)
    }

    /// Whether moving from `self` to `next` respects monotonic progression
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        match (*self, next) {
            (a, b) if a == b => !a.is_terminal(),
            (OrderStatus::New, _) => true,
            (OrderStatus::PartiallyFilled, OrderStatus::New) => false,
            (OrderStatus::PartiallyFilled, _) => true,
            _ => false,
        }
    }
}
