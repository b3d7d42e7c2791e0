//! Tradecycle Strategy
//!
//! Exit side of the trade cycle:
//! - Signal evaluation: take-profit after commission, or stop-loss
//! - Session gate: wait for the instrument's normal trading session
//! - Exit watcher: the per-position tick loop combining both
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────── ExitWatcher::watch ─────────────┐
//!   │                                             │
//!   │  SessionGate::await_open ──► last price ──► SignalEvaluator
//!   │        ▲                                    │
//!   │        └──────── Hold (sleep) ◄─────────────┤
//!   │                                             │
//!   └──────────────── Sell(reason) ◄──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tradecycle_strategy::{ExitWatcher, SessionGate, SignalEvaluator, SignalParams};
//!
//! let watcher = ExitWatcher::new(
//!     SignalEvaluator::new(SignalParams::default()),
//!     SessionGate::new(Duration::from_secs(2000)),
//!     Duration::from_secs(10),
//! );
//! let exit = watcher.watch(&venue, &instrument_id, entry_price, &mut shutdown).await?;
//! ```

pub mod error;
pub mod session;
pub mod signal;
pub mod watch;

pub use error::{Error, Result};
pub use session::SessionGate;
pub use signal::{Evaluation, ExitDecision, ExitReason, SignalEvaluator, SignalParams};
pub use watch::{ExitSignal, ExitWatcher};
