//! Tradecycle Clock Infrastructure
//!
//! Time abstractions for production and tests, plus the shutdown signal
//! every polling wait in the engine suspends on.
//!
//! ## Usage
//!
//! ```ignore
//! use tradecycle_clock::{shutdown_channel, SystemClock};
//! use std::time::Duration;
//!
//! let (handle, mut shutdown) = shutdown_channel();
//!
//! // Any task: sleep, but wake early if shutdown is requested
//! if shutdown.sleep(Duration::from_secs(10)).await.is_err() {
//!     return; // interrupted
//! }
//!
//! // Elsewhere (e.g. ctrl-c handler)
//! handle.trigger();
//! ```

mod fixed;
mod shutdown;
mod system;

pub use fixed::FixedClock;
pub use shutdown::{Interrupted, Shutdown, ShutdownHandle, shutdown_channel};
pub use system::SystemClock;

// Re-export the Clock trait for convenience
pub use tradecycle_ports::Clock;
