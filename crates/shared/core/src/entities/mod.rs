mod order;
mod order_status;
mod order_type;
mod portfolio;
mod position;
mod quote;
mod session;
mod side;

pub use order::{Order, OrderHandle, OrderId, OrderSpec};
pub use order_status::OrderStatus;
pub use order_type::OrderType;
pub use portfolio::{AccountId, PortfolioSnapshot};
pub use position::Position;
pub use quote::PriceQuote;
pub use session::SessionStatus;
pub use side::Side;
