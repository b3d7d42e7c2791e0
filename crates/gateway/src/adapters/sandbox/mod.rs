//! Sandbox venue
//!
//! Stands in for the brokerage's sandbox environment: accounts are reset
//! and paid in on start, prices come from per-instrument feeds and orders
//! progress as they are polled.

mod config;
mod feed;
mod venue;

pub use config::{SandboxConfig, SandboxInstrumentConfig};
pub use feed::PriceFeed;
pub use venue::{FillBehavior, SandboxVenue};
