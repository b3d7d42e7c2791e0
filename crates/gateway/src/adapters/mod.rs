//! Venue adapters
//!
//! Adapters implement [`tradecycle_ports::VenueGateway`] for a concrete
//! venue. Only the in-memory sandbox ships with this crate; a live client
//! plugs in behind the same trait.

pub mod sandbox;

pub use sandbox::{FillBehavior, PriceFeed, SandboxConfig, SandboxInstrumentConfig, SandboxVenue};
