//! Tradecycle Ports
//!
//! Port definitions (traits) for the tradecycle engine.
//! These define the boundaries between the engine and the outside world:
//! the brokerage venue and the time source.

mod clock;
mod error;
mod venue;

pub use clock::Clock;
pub use error::{VenueError, VenueResult};
pub use venue::VenueGateway;
