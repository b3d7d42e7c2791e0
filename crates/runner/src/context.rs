//! Engine context
//!
//! Everything a cycle needs from the outside world, passed explicitly into
//! each component: the venue, the account being traded, the order tracker
//! and the shutdown signal.

use log::info;
use std::sync::Arc;
use tradecycle_clock::Shutdown;
use tradecycle_core::AccountId;
use tradecycle_order_manager::OrderTracker;
use tradecycle_ports::VenueGateway;

use crate::error::{EngineError, Result};

pub type SharedVenue = Arc<dyn VenueGateway>;

#[derive(Clone)]
pub struct EngineContext {
    pub venue: SharedVenue,
    pub tracker: Arc<OrderTracker<SharedVenue>>,
    pub shutdown: Shutdown,
}

impl EngineContext {
    /// Resolve the trading account (the first one the venue lists)
    pub async fn connect(venue: SharedVenue, shutdown: Shutdown) -> Result<Self> {
        let accounts = venue
            .get_accounts()
            .await
            .map_err(|e| EngineError::Input(format!("cannot list accounts: {}", e)))?;
        let account_id = accounts
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::Input(format!("{} lists no accounts", venue.name())))?;
        info!("[ENGINE] trading account {} on {}", account_id, venue.name());
        Ok(Self::new(venue, account_id, shutdown))
    }

    pub fn new(venue: SharedVenue, account_id: AccountId, shutdown: Shutdown) -> Self {
        let tracker = Arc::new(OrderTracker::new(venue.clone(), account_id));
        Self {
            venue,
            tracker,
            shutdown,
        }
    }

    pub fn account_id(&self) -> &AccountId {
        self.tracker.account_id()
    }
}
