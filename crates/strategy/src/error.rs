//! Strategy errors

use std::time::Duration;
use thiserror::Error;
use tradecycle_clock::Interrupted;
use tradecycle_core::{InstrumentId, Price, SessionStatus};
use tradecycle_ports::VenueError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid entry price {entry_price}: must be positive")]
    InvalidEntryPrice { entry_price: Price },

    #[error("Session for {instrument_id} still {last_status:?} after {waited:?}")]
    SessionWaitExceeded {
        instrument_id: InstrumentId,
        waited: Duration,
        last_status: SessionStatus,
    },

    #[error("Venue error for {instrument_id}: {source}")]
    Venue {
        instrument_id: InstrumentId,
        source: VenueError,
    },

    #[error(transparent)]
    Interrupted(#[from] Interrupted),
}

impl Error {
    pub fn venue(instrument_id: &InstrumentId, source: VenueError) -> Self {
        Error::Venue {
            instrument_id: instrument_id.clone(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
