//! Tradecycle Gateway
//!
//! Venue side of the tradecycle engine. Provides:
//! - An in-memory sandbox venue (accounts, price feeds, session status,
//!   orders that fill as they are polled)
//! - A retrying decorator that absorbs transient venue failures
//!
//! ## Architecture
//!
//! ```text
//!   Strategy / Order manager
//!            │ VenueGateway
//!    ┌───────▼───────┐
//!    │ RetryingVenue │  transient errors retried with backoff
//!    └───────┬───────┘
//!            │ VenueGateway
//!    ┌───────▼───────┐
//!    │ SandboxVenue  │  (or a live client)
//!    └───────────────┘
//! ```

pub mod adapters;
pub mod retry;

pub use adapters::{FillBehavior, PriceFeed, SandboxConfig, SandboxInstrumentConfig, SandboxVenue};
pub use retry::{RetryPolicy, RetryingVenue};
