use async_trait::async_trait;
use std::sync::Arc;
use tradecycle_core::{
    AccountId, Instrument, InstrumentId, Order, OrderHandle, OrderId, OrderSpec,
    PortfolioSnapshot, PriceQuote, SessionStatus,
};

use crate::error::VenueResult;

/// Port for the remote brokerage venue
///
/// Implementations wrap the wire-level client (or a simulator). Every call
/// reads or mutates venue state; nothing here is cached by the engine.
#[async_trait]
pub trait VenueGateway: Send + Sync {
    /// Accounts the credentials may trade
    async fn get_accounts(&self) -> VenueResult<Vec<AccountId>>;

    /// Last-trade price for an instrument
    async fn get_last_price(&self, instrument_id: &InstrumentId) -> VenueResult<PriceQuote>;

    /// Free capital and open positions of an account
    async fn get_portfolio(&self, account_id: &AccountId) -> VenueResult<PortfolioSnapshot>;

    /// Current trading-session status of an instrument
    async fn get_trading_status(&self, instrument_id: &InstrumentId) -> VenueResult<SessionStatus>;

    /// Submit a new order
    async fn place_order(&self, account_id: &AccountId, spec: &OrderSpec)
    -> VenueResult<OrderHandle>;

    /// Current state of one order
    async fn get_order_state(&self, account_id: &AccountId, order_id: &OrderId)
    -> VenueResult<Order>;

    /// All non-terminal orders the venue knows for an account
    async fn get_open_orders(&self, account_id: &AccountId) -> VenueResult<Vec<Order>>;

    /// Request cancellation of an active order
    async fn cancel_order(&self, account_id: &AccountId, order_id: &OrderId) -> VenueResult<()>;

    /// Static instrument metadata (lot size, class code, kind)
    async fn get_instrument_metadata(&self, instrument_id: &InstrumentId)
    -> VenueResult<Instrument>;

    /// Gateway name for logging
    fn name(&self) -> &str {
        "VenueGateway"
    }
}

#[async_trait]
impl<T: VenueGateway + ?Sized> VenueGateway for Arc<T> {
    async fn get_accounts(&self) -> VenueResult<Vec<AccountId>> {
        (**self).get_accounts().await
    }

    async fn get_last_price(&self, instrument_id: &InstrumentId) -> VenueResult<PriceQuote> {
        (**self).get_last_price(instrument_id).await
    }

    async fn get_portfolio(&self, account_id: &AccountId) -> VenueResult<PortfolioSnapshot> {
        (**self).get_portfolio(account_id).await
    }

    async fn get_trading_status(&self, instrument_id: &InstrumentId) -> VenueResult<SessionStatus> {
        (**self).get_trading_status(instrument_id).await
    }

    async fn place_order(
        &self,
        account_id: &AccountId,
        spec: &OrderSpec,
    ) -> VenueResult<OrderHandle> {
        (**self).place_order(account_id, spec).await
    }

    async fn get_order_state(
        &self,
        account_id: &AccountId,
        order_id: &OrderId,
    ) -> VenueResult<Order> {
        (**self).get_order_state(account_id, order_id).await
    }

    async fn get_open_orders(&self, account_id: &AccountId) -> VenueResult<Vec<Order>> {
        (**self).get_open_orders(account_id).await
    }

    async fn cancel_order(&self, account_id: &AccountId, order_id: &OrderId) -> VenueResult<()> {
        (**self).cancel_order(account_id, order_id).await
    }

    async fn get_instrument_metadata(
        &self,
        instrument_id: &InstrumentId,
    ) -> VenueResult<Instrument> {
        (**self).get_instrument_metadata(instrument_id).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
