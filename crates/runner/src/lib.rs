//! Tradecycle Runner - Trade Cycle Engine
//!
//! Orchestrates one instrument position at a time (or every held position
//! concurrently) through a buy/watch/sell cycle:
//!
//! - **Config**: JSON engine configuration with validated defaults
//! - **Context**: venue, account, order tracker and shutdown signal,
//!   passed explicitly into every component
//! - **Engine**: the repeating strategy loop
//! - **Monitor**: one task per open position
//!
//! ## Architecture
//!
//! ```text
//!                    ┌─────────────────┐
//!                    │  StrategyLoop   │  one cycle at a time
//!                    └────────┬────────┘
//!          select/size/buy    │    spawn per position
//!        ┌────────────────────┼────────────────────┐
//!        ▼                    ▼                    ▼
//! ┌──────────────┐   ┌─────────────────┐  ┌─────────────────┐
//! │ OrderTracker │◄──│ PositionMonitor │  │ PositionMonitor │
//! │  (registry)  │◄──│  ExitWatcher    │  │  ExitWatcher    │
//! └──────┬───────┘   └────────┬────────┘  └────────┬────────┘
//!        │                    │                    │
//!        ▼                    ▼                    ▼
//!   ┌──────────────────────────────────────────────────┐
//!   │        VenueGateway (RetryingVenue<...>)          │
//!   └──────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod monitor;

// Re-export main types
pub use config::{AccountMode, EngineConfig};
pub use context::{EngineContext, SharedVenue};
pub use engine::{CycleReport, StrategyLoop};
pub use error::{CycleFailure, EngineError, Result};
pub use monitor::{MonitoredPosition, PositionMonitor};
