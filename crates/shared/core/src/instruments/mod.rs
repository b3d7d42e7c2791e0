//! Instrument definitions for tradeable assets
//!
//! Instruments are fetched from the venue once per selection and never
//! mutated afterwards.

mod instrument;

pub use instrument::{Instrument, InstrumentId, InstrumentKind};
