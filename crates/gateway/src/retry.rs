//! Retrying venue decorator
//!
//! Wraps any [`VenueGateway`] and retries calls that fail with a transient
//! error. Order placement is never retried: a timed-out placement may still
//! have reached the venue, so resubmitting could double the position.
//! Reconciliation picks such orders up instead.
//!
//! Backoff sleeps observe the engine's [`Shutdown`]: a stop request ends the
//! retry chain with [`VenueError::Aborted`].

use async_trait::async_trait;
use log::warn;
use std::future::Future;
use std::time::Duration;
use tradecycle_clock::Shutdown;
use tradecycle_core::{
    AccountId, Instrument, InstrumentId, Order, OrderHandle, OrderId, OrderSpec,
    PortfolioSnapshot, PriceQuote, SessionStatus,
};
use tradecycle_ports::{VenueError, VenueGateway, VenueResult};

/// Bounded exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_backoff,
            max_backoff: base_backoff * 16,
        }
    }

    /// Single attempt, no retries
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Delay before retry number `retry` (1-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.base_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}

/// [`VenueGateway`] that retries transient failures of the inner venue
pub struct RetryingVenue<V> {
    inner: V,
    policy: RetryPolicy,
    shutdown: Shutdown,
}

impl<V: VenueGateway> RetryingVenue<V> {
    pub fn new(inner: V, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            shutdown: Shutdown::never(),
        }
    }

    /// Abandon retries once `shutdown` is triggered
    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn inner(&self) -> &V {
        &self.inner
    }

    async fn with_retry<T, F, Fut>(&self, op: &str, mut call: F) -> VenueResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = VenueResult<T>>,
    {
        let mut attempt = 1;
        loop {
            match call().await {
                Err(e) if e.is_transient() && attempt < self.policy.max_attempts => {
                    let delay = self.policy.backoff(attempt);
                    warn!(
                        "[{}] {} failed (attempt {}/{}): {}; retrying in {:?}",
                        self.inner.name(),
                        op,
                        attempt,
                        self.policy.max_attempts,
                        e,
                        delay
                    );
                    if self.shutdown.clone().sleep(delay).await.is_err() {
                        warn!("[{}] {} abandoned: shutdown requested", self.inner.name(), op);
                        return Err(VenueError::Aborted(format!(
                            "{} abandoned after {} attempt(s): {}",
                            op, attempt, e
                        )));
                    }
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

#[async_trait]
impl<V: VenueGateway> VenueGateway for RetryingVenue<V> {
    async fn get_accounts(&self) -> VenueResult<Vec<AccountId>> {
        self.with_retry("get_accounts", move || self.inner.get_accounts())
            .await
    }

    async fn get_last_price(&self, instrument_id: &InstrumentId) -> VenueResult<PriceQuote> {
        self.with_retry("get_last_price", move || {
            self.inner.get_last_price(instrument_id)
        })
        .await
    }

    async fn get_portfolio(&self, account_id: &AccountId) -> VenueResult<PortfolioSnapshot> {
        self.with_retry("get_portfolio", move || self.inner.get_portfolio(account_id))
            .await
    }

    async fn get_trading_status(&self, instrument_id: &InstrumentId) -> VenueResult<SessionStatus> {
        self.with_retry("get_trading_status", move || {
            self.inner.get_trading_status(instrument_id)
        })
        .await
    }

    async fn place_order(
        &self,
        account_id: &AccountId,
        spec: &OrderSpec,
    ) -> VenueResult<OrderHandle> {
        self.inner.place_order(account_id, spec).await
    }

    async fn get_order_state(
        &self,
        account_id: &AccountId,
        order_id: &OrderId,
    ) -> VenueResult<Order> {
        self.with_retry("get_order_state", move || {
            self.inner.get_order_state(account_id, order_id)
        })
        .await
    }

    async fn get_open_orders(&self, account_id: &AccountId) -> VenueResult<Vec<Order>> {
        self.with_retry("get_open_orders", move || {
            self.inner.get_open_orders(account_id)
        })
        .await
    }

    async fn cancel_order(&self, account_id: &AccountId, order_id: &OrderId) -> VenueResult<()> {
        self.with_retry("cancel_order", move || {
            self.inner.cancel_order(account_id, order_id)
        })
        .await
    }

    async fn get_instrument_metadata(
        &self,
        instrument_id: &InstrumentId,
    ) -> VenueResult<Instrument> {
        self.with_retry("get_instrument_metadata", move || {
            self.inner.get_instrument_metadata(instrument_id)
        })
        .await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::new(10, Duration::from_millis(100));
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(400));
        assert_eq!(policy.backoff(9), Duration::from_millis(1600));
    }

    #[test]
    fn test_at_least_one_attempt() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }
}
