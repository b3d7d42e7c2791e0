//! Tradecycle Core Domain
//!
//! Pure domain types for the tradecycle engine: instruments, quotes,
//! portfolio snapshots, orders and trading-session status.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod instruments;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    AccountId,
    // Orders
    Order,
    OrderHandle,
    OrderId,
    OrderSpec,
    OrderStatus,
    OrderType,
    // Portfolio
    PortfolioSnapshot,
    Position,
    PriceQuote,
    SessionStatus,
    Side,
};
pub use instruments::{Instrument, InstrumentId, InstrumentKind};
pub use values::{Lots, Price, Quotation, Timestamp};
