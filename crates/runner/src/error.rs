//! Engine errors
//!
//! Component failures are wrapped with the cycle they happened in, so every
//! report names the cycle, the instrument and the order (when known).

use thiserror::Error;
use tradecycle_core::{InstrumentId, OrderId};
use tradecycle_ports::VenueError;

/// What went wrong inside a cycle
#[derive(Error, Debug)]
pub enum CycleFailure {
    #[error(transparent)]
    Order(tradecycle_order_manager::Error),

    #[error(transparent)]
    Strategy(tradecycle_strategy::Error),

    #[error(transparent)]
    Venue(VenueError),
}

#[derive(Error, Debug)]
pub enum EngineError {
    /// Invalid configuration or instrument metadata; aborts startup
    #[error("Input error: {0}")]
    Input(String),

    #[error(
        "Cycle {cycle_id} failed ({}, order {}): {source}",
        display_or(.instrument_id, "-"),
        display_or(.order_id, "-")
    )]
    Cycle {
        cycle_id: u64,
        instrument_id: Option<InstrumentId>,
        order_id: Option<OrderId>,
        source: CycleFailure,
    },

    #[error("Monitor task in cycle {cycle_id} panicked: {message}")]
    Task { cycle_id: u64, message: String },

    #[error("Interrupted by shutdown")]
    Interrupted,
}

fn display_or<T: std::fmt::Display>(value: &Option<T>, fallback: &str) -> String {
    value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| fallback.to_string())
}

impl EngineError {
    pub fn order(cycle_id: u64, err: tradecycle_order_manager::Error) -> Self {
        if let tradecycle_order_manager::Error::Interrupted(_) = err {
            return EngineError::Interrupted;
        }
        EngineError::Cycle {
            cycle_id,
            instrument_id: err.instrument_id().cloned(),
            order_id: err.order_id().cloned(),
            source: CycleFailure::Order(err),
        }
    }

    pub fn strategy(
        cycle_id: u64,
        instrument_id: &InstrumentId,
        err: tradecycle_strategy::Error,
    ) -> Self {
        if let tradecycle_strategy::Error::Interrupted(_) = err {
            return EngineError::Interrupted;
        }
        EngineError::Cycle {
            cycle_id,
            instrument_id: Some(instrument_id.clone()),
            order_id: None,
            source: CycleFailure::Strategy(err),
        }
    }

    pub fn venue(cycle_id: u64, instrument_id: Option<&InstrumentId>, err: VenueError) -> Self {
        EngineError::Cycle {
            cycle_id,
            instrument_id: instrument_id.cloned(),
            order_id: None,
            source: CycleFailure::Venue(err),
        }
    }

    /// Whether the strategy loop must stop instead of starting another cycle
    pub fn is_fatal(&self) -> bool {
        match self {
            EngineError::Input(_) => true,
            EngineError::Cycle {
                source: CycleFailure::Order(err),
                ..
            } => matches!(
                err,
                tradecycle_order_manager::Error::ReconciliationConflict { .. }
                    | tradecycle_order_manager::Error::InvalidInput(_)
            ),
            _ => false,
        }
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, EngineError::Interrupted)
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use tradecycle_clock::Interrupted;

    #[test]
    fn test_cycle_error_names_cycle_instrument_and_order() {
        let err = EngineError::order(
            7,
            tradecycle_order_manager::Error::OrderRejected {
                instrument_id: InstrumentId::new("SBER"),
                order_id: OrderId::new("o-1"),
            },
        );
        let text = err.to_string();
        assert!(text.contains("Cycle 7"));
        assert!(text.contains("SBER"));
        assert!(text.contains("o-1"));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_reconciliation_conflict_is_fatal() {
        let err = EngineError::order(
            1,
            tradecycle_order_manager::Error::ReconciliationConflict {
                instrument_id: InstrumentId::new("SBER"),
                order_ids: vec![OrderId::new("a"), OrderId::new("b")],
            },
        );
        assert!(err.is_fatal());
        assert!(EngineError::Input("bad".into()).is_fatal());
    }

    #[test]
    fn test_interruption_is_not_a_cycle_failure() {
        let err = EngineError::strategy(
            3,
            &InstrumentId::new("SBER"),
            tradecycle_strategy::Error::Interrupted(Interrupted),
        );
        assert!(err.is_interrupted());
        assert!(!err.is_fatal());
    }
}
