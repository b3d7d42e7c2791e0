//! Order Manager errors

use std::time::Duration;
use thiserror::Error;
use tradecycle_clock::Interrupted;
use tradecycle_core::{InstrumentId, Lots, OrderId};
use tradecycle_ports::VenueError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Order already in flight for {instrument_id} (order {})", display_order(.order_id))]
    DuplicateOrder {
        instrument_id: InstrumentId,
        /// None while the other placement has not been acknowledged yet
        order_id: Option<OrderId>,
    },

    #[error("Order {order_id} for {instrument_id} rejected by venue")]
    OrderRejected {
        instrument_id: InstrumentId,
        order_id: OrderId,
    },

    #[error("Order {order_id} for {instrument_id} cancelled ({lots_executed} lots executed)")]
    OrderCancelled {
        instrument_id: InstrumentId,
        order_id: OrderId,
        lots_executed: Lots,
    },

    #[error("Order {order_id} for {instrument_id} not filled within {timeout:?}")]
    FillTimeout {
        instrument_id: InstrumentId,
        order_id: OrderId,
        timeout: Duration,
    },

    #[error("Order {order_id} for {instrument_id} filled without an executed price")]
    MissingFillPrice {
        instrument_id: InstrumentId,
        order_id: OrderId,
    },

    #[error(
        "Reconciliation conflict for {instrument_id}: {} non-terminal orders {order_ids:?}",
        .order_ids.len()
    )]
    ReconciliationConflict {
        instrument_id: InstrumentId,
        order_ids: Vec<OrderId>,
    },

    #[error("No tradable instrument among {candidates} candidates")]
    NoTradableInstrument { candidates: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Venue error: {source}")]
    Venue {
        instrument_id: Option<InstrumentId>,
        order_id: Option<OrderId>,
        source: VenueError,
    },

    #[error(transparent)]
    Interrupted(#[from] Interrupted),
}

fn display_order(order_id: &Option<OrderId>) -> String {
    order_id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "pending".to_string())
}

impl Error {
    pub fn venue(
        source: VenueError,
        instrument_id: Option<&InstrumentId>,
        order_id: Option<&OrderId>,
    ) -> Self {
        Error::Venue {
            instrument_id: instrument_id.cloned(),
            order_id: order_id.cloned(),
            source,
        }
    }

    /// Instrument the failure concerns, if any
    pub fn instrument_id(&self) -> Option<&InstrumentId> {
        match self {
            Error::DuplicateOrder { instrument_id, .. }
            | Error::OrderRejected { instrument_id, .. }
            | Error::OrderCancelled { instrument_id, .. }
            | Error::FillTimeout { instrument_id, .. }
            | Error::MissingFillPrice { instrument_id, .. }
            | Error::ReconciliationConflict { instrument_id, .. } => Some(instrument_id),
            Error::Venue { instrument_id, .. } => instrument_id.as_ref(),
            _ => None,
        }
    }

    /// Order the failure concerns, if any
    pub fn order_id(&self) -> Option<&OrderId> {
        match self {
            Error::OrderRejected { order_id, .. }
            | Error::OrderCancelled { order_id, .. }
            | Error::FillTimeout { order_id, .. }
            | Error::MissingFillPrice { order_id, .. } => Some(order_id),
            Error::DuplicateOrder { order_id, .. } | Error::Venue { order_id, .. } => {
                order_id.as_ref()
            }
            Error::ReconciliationConflict { order_ids, .. } => order_ids.first(),
            _ => None,
        }
    }
}

impl From<VenueError> for Error {
    fn from(source: VenueError) -> Self {
        Error::venue(source, None, None)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
