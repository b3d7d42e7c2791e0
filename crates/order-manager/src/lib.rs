//! Tradecycle Order Manager
//!
//! The Order Manager sits between the strategy loop and the venue gateway,
//! responsible for:
//! - **Order Tracking**: at most one in-flight order per instrument, polled
//!   to a terminal state, adopted from the venue on startup
//! - **Position Selection**: which instrument the next entry buys
//! - **Sizing**: free capital and price to a lot count
//! - **Realized PnL**: the outcome of each buy/sell round trip
//!
//! ## Architecture
//!
//! ```text
//! Strategy loop ──► PositionSelector ──► lots_to_buy ──► OrderTracker::place
//!                                                              │
//!                                             in-flight registry (DashMap)
//!                                                              │
//! Venue ◄── place_order / get_order_state / cancel_order ◄─────┘
//!
//! Startup: OrderTracker::reconcile ◄── get_open_orders
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tradecycle_order_manager::{FillWait, OrderTracker};
//!
//! let tracker = OrderTracker::new(venue, account_id);
//! tracker.reconcile().await?;
//!
//! let handle = tracker.place(&OrderSpec::best_price(id, Side::Buy, lots)).await?;
//! let fill_price = tracker.wait_until_terminal(&handle, wait, &mut shutdown).await?;
//! ```

pub mod error;
pub mod pnl;
pub mod selector;
pub mod sizing;
pub mod tracker;

// Re-export main types
pub use error::{Error, Result};
pub use pnl::RealizedPnl;
pub use selector::{FixedInstrument, PositionSelector, RandomFavorite, SelectionPolicy};
pub use sizing::lots_to_buy;
pub use tracker::{FillWait, OrderTracker};
