//! In-memory sandbox venue
//!
//! Behaves like the brokerage's sandbox environment: one paid-in account,
//! instruments with price feeds and trading-session status, and orders that
//! progress on each state poll according to a [`FillBehavior`].

use async_trait::async_trait;
use log::{debug, info};
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;
use tradecycle_core::{
    AccountId, Instrument, InstrumentId, Lots, Order, OrderHandle, OrderId, OrderSpec,
    OrderStatus, PortfolioSnapshot, Position, PriceQuote, Quotation, SessionStatus, Side,
};
use tradecycle_ports::{Clock, VenueError, VenueGateway, VenueResult};

use super::config::SandboxConfig;
use super::feed::PriceFeed;

/// Terminal orders kept for `get_order_state` and [`SandboxVenue::orders`]
const DEFAULT_ORDER_HISTORY: usize = 1_000;

/// How a sandbox order progresses while it is polled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillBehavior {
    /// Fill completely on the n-th state poll (0 = at placement)
    AfterPolls(u32),
    /// Fill half the lots on the first poll, the rest on the n-th
    PartialThenFill(u32),
    /// Rejected on the first poll
    Reject,
    /// Cancelled by the venue on the n-th poll
    CancelAfterPolls(u32),
    /// Stays open until cancelled
    Never,
}

impl Default for FillBehavior {
    fn default() -> Self {
        FillBehavior::AfterPolls(0)
    }
}

struct Listing {
    instrument: Instrument,
    feed: PriceFeed,
    /// Statuses served once each before `session` becomes steady
    session_script: VecDeque<SessionStatus>,
    session: SessionStatus,
}

struct Account {
    id: AccountId,
    free_capital: Decimal,
    positions: HashMap<InstrumentId, Position>,
}

struct SandboxOrder {
    seq: u64,
    account_id: AccountId,
    order: Order,
    behavior: FillBehavior,
    polls: u32,
}

struct SandboxState {
    accounts: Vec<Account>,
    next_account: u64,
    listings: HashMap<InstrumentId, Listing>,
    orders: HashMap<OrderId, SandboxOrder>,
    next_order: u64,
    /// Terminal orders beyond this count are forgotten, oldest first
    order_history: usize,
    queued_behaviors: VecDeque<FillBehavior>,
    failures_remaining: u32,
    commission_rate: Decimal,
    currency: String,
}

impl SandboxState {
    fn take_failure(&mut self) -> VenueResult<()> {
        if self.failures_remaining > 0 {
            self.failures_remaining -= 1;
            return Err(VenueError::Unavailable("sandbox: injected failure".to_string()));
        }
        Ok(())
    }

    fn account(&self, account_id: &AccountId) -> VenueResult<&Account> {
        self.accounts
            .iter()
            .find(|a| &a.id == account_id)
            .ok_or_else(|| VenueError::NotFound(format!("account {}", account_id)))
    }

    fn listing(&self, instrument_id: &InstrumentId) -> VenueResult<&Listing> {
        self.listings
            .get(instrument_id)
            .ok_or_else(|| VenueError::NotFound(format!("instrument {}", instrument_id)))
    }

    /// Drop the oldest terminal orders beyond `order_history`; open orders stay
    fn prune_history(&mut self) {
        let mut terminal: Vec<(u64, OrderId)> = self
            .orders
            .values()
            .filter(|e| e.order.status.is_terminal())
            .map(|e| (e.seq, e.order.id.clone()))
            .collect();
        if terminal.len() <= self.order_history {
            return;
        }
        terminal.sort_unstable_by_key(|(seq, _)| *seq);
        let excess = terminal.len() - self.order_history;
        for (_, order_id) in terminal.into_iter().take(excess) {
            self.orders.remove(&order_id);
        }
        debug!("[SANDBOX] pruned {} terminal order(s)", excess);
    }

    /// Execute `lots` of an order at the instrument's current price
    fn fill(&mut self, order_id: &OrderId, lots: Lots) {
        let Some(entry) = self.orders.get_mut(order_id) else {
            return;
        };
        let Some(listing) = self.listings.get(&entry.order.instrument_id) else {
            return;
        };
        let Some(account) = self.accounts.iter_mut().find(|a| a.id == entry.account_id) else {
            return;
        };

        let lots = lots.min(entry.order.remaining_lots());
        if lots == 0 {
            return;
        }

        let price = listing.feed.current();
        let shares = Decimal::from(lots * listing.instrument.lot_size);
        let notional = price * shares;
        let commission = notional * self.commission_rate;

        let order = &mut entry.order;
        let prev_lots = Decimal::from(order.lots_executed);
        let prev_price = order.executed_price.unwrap_or(Decimal::ZERO);
        order.lots_executed += lots;
        let executed_value = prev_price * prev_lots + price * Decimal::from(lots);
        order.executed_price = Some(executed_value / Decimal::from(order.lots_executed));
        let next = if order.remaining_lots() == 0 {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        order.transition(next);

        match order.side {
            Side::Buy => {
                account.free_capital -= notional + commission;
                let position = account
                    .positions
                    .entry(order.instrument_id.clone())
                    .or_insert_with(|| Position {
                        instrument_id: order.instrument_id.clone(),
                        kind: listing.instrument.kind,
                        quantity_lots: 0,
                        average_price: Decimal::ZERO,
                        currency: self.currency.clone(),
                    });
                let held = Decimal::from(position.quantity_lots);
                let total = position.quantity_lots + lots;
                let held_value = position.average_price * held + price * Decimal::from(lots);
                position.average_price = held_value / Decimal::from(total);
                position.quantity_lots = total;
            }
            Side::Sell => {
                account.free_capital += notional - commission;
                if let Some(position) = account.positions.get_mut(&order.instrument_id) {
                    position.quantity_lots = position.quantity_lots.saturating_sub(lots);
                    if position.quantity_lots == 0 {
                        account.positions.remove(&order.instrument_id);
                    }
                }
            }
        }

        debug!(
            "[SANDBOX] {} {} lots of {} @ {} ({:?})",
            order.side, lots, order.instrument_id, price, order.status
        );
    }

    /// Advance an order by one poll according to its behavior
    fn poll(&mut self, order_id: &OrderId) {
        let Some(entry) = self.orders.get_mut(order_id) else {
            return;
        };
        if entry.order.status.is_terminal() {
            return;
        }
        entry.polls += 1;
        let polls = entry.polls;
        let requested = entry.order.lots_requested;
        let executed = entry.order.lots_executed;
        let behavior = entry.behavior;

        match behavior {
            FillBehavior::AfterPolls(n) => {
                if polls >= n {
                    self.fill(order_id, requested);
                }
            }
            FillBehavior::PartialThenFill(n) => {
                if polls >= n {
                    self.fill(order_id, requested);
                } else if executed == 0 && requested > 1 {
                    self.fill(order_id, requested / 2);
                }
            }
            FillBehavior::Reject => {
                entry.order.transition(OrderStatus::Rejected);
            }
            FillBehavior::CancelAfterPolls(n) => {
                if polls >= n {
                    entry.order.transition(OrderStatus::Cancelled);
                }
            }
            FillBehavior::Never => {}
        }
    }
}

/// In-memory venue used for `sandbox` account mode and in tests
pub struct SandboxVenue {
    state: Mutex<SandboxState>,
    clock: Arc<dyn Clock>,
}

impl SandboxVenue {
    /// Empty venue: no instruments, no accounts
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let defaults = SandboxConfig::default();
        Self {
            state: Mutex::new(SandboxState {
                accounts: Vec::new(),
                next_account: 0,
                listings: HashMap::new(),
                orders: HashMap::new(),
                next_order: 0,
                order_history: DEFAULT_ORDER_HISTORY,
                queued_behaviors: VecDeque::new(),
                failures_remaining: 0,
                commission_rate: defaults.commission_rate,
                currency: defaults.currency,
            }),
            clock,
        }
    }

    /// Venue with the configured instruments and a freshly paid-in account
    pub async fn from_config(config: &SandboxConfig, clock: Arc<dyn Clock>) -> Self {
        let venue = Self::new(clock);
        {
            let mut state = venue.state.lock().await;
            state.commission_rate = config.commission_rate;
            state.currency = config.currency.clone();
        }
        for listing in &config.instruments {
            venue
                .list_instrument(listing.instrument.clone(), listing.feed())
                .await;
        }
        venue.reset_account(config.pay_in).await;
        venue
    }

    /// List an instrument; its session starts in normal trading
    pub async fn list_instrument(&self, instrument: Instrument, feed: PriceFeed) {
        let mut state = self.state.lock().await;
        state.listings.insert(
            instrument.id.clone(),
            Listing {
                instrument,
                feed,
                session_script: VecDeque::new(),
                session: SessionStatus::NormalTrading,
            },
        );
    }

    /// Close every sandbox account, open a new one and pay `pay_in` into it
    pub async fn reset_account(&self, pay_in: Decimal) -> AccountId {
        let mut state = self.state.lock().await;
        let closed = state.accounts.len();
        state.accounts.clear();
        state.next_account += 1;
        let id = AccountId::new(format!("sandbox-{}", state.next_account));
        state.accounts.push(Account {
            id: id.clone(),
            free_capital: pay_in,
            positions: HashMap::new(),
        });
        info!(
            "[SANDBOX] closed {} account(s), opened {} with pay-in {} {}",
            closed, id, pay_in, state.currency
        );
        id
    }

    /// Put an existing holding into an account (a position bought earlier)
    pub async fn seed_position(
        &self,
        account_id: &AccountId,
        instrument_id: &InstrumentId,
        lots: Lots,
        average_price: Decimal,
    ) -> VenueResult<()> {
        let mut state = self.state.lock().await;
        let kind = state.listing(instrument_id)?.instrument.kind;
        let currency = state.currency.clone();
        let account = state
            .accounts
            .iter_mut()
            .find(|a| &a.id == account_id)
            .ok_or_else(|| VenueError::NotFound(format!("account {}", account_id)))?;
        account.positions.insert(
            instrument_id.clone(),
            Position {
                instrument_id: instrument_id.clone(),
                kind,
                quantity_lots: lots,
                average_price,
                currency,
            },
        );
        Ok(())
    }

    /// Serve `script` from the trading-status endpoint once each, then `steady`
    pub async fn set_session_script(
        &self,
        instrument_id: &InstrumentId,
        script: impl IntoIterator<Item = SessionStatus>,
        steady: SessionStatus,
    ) {
        let mut state = self.state.lock().await;
        if let Some(listing) = state.listings.get_mut(instrument_id) {
            listing.session_script = script.into_iter().collect();
            listing.session = steady;
        }
    }

    /// Replace an instrument's price feed
    pub async fn set_feed(&self, instrument_id: &InstrumentId, feed: PriceFeed) {
        let mut state = self.state.lock().await;
        if let Some(listing) = state.listings.get_mut(instrument_id) {
            listing.feed = feed;
        }
    }

    /// Behavior for the next placed order (FIFO); default fills at placement
    pub async fn queue_fill_behavior(&self, behavior: FillBehavior) {
        self.state.lock().await.queued_behaviors.push_back(behavior);
    }

    /// Change how an already placed order progresses
    pub async fn set_fill_behavior(&self, order_id: &OrderId, behavior: FillBehavior) {
        let mut state = self.state.lock().await;
        if let Some(entry) = state.orders.get_mut(order_id) {
            entry.behavior = behavior;
            entry.polls = 0;
        }
    }

    /// The next `count` venue calls fail with a transient error
    pub async fn fail_next_calls(&self, count: u32) {
        self.state.lock().await.failures_remaining = count;
    }

    /// Keep at most `limit` terminal orders
    pub async fn set_order_history(&self, limit: usize) {
        let mut state = self.state.lock().await;
        state.order_history = limit;
        state.prune_history();
    }

    /// Orders still remembered (every open one plus recent terminal ones),
    /// oldest first
    pub async fn orders(&self) -> Vec<Order> {
        let state = self.state.lock().await;
        let mut entries: Vec<_> = state.orders.values().collect();
        entries.sort_by_key(|e| e.seq);
        entries.into_iter().map(|e| e.order.clone()).collect()
    }
}

#[async_trait]
impl VenueGateway for SandboxVenue {
    async fn get_accounts(&self) -> VenueResult<Vec<AccountId>> {
        let mut state = self.state.lock().await;
        state.take_failure()?;
        Ok(state.accounts.iter().map(|a| a.id.clone()).collect())
    }

    async fn get_last_price(&self, instrument_id: &InstrumentId) -> VenueResult<PriceQuote> {
        let mut state = self.state.lock().await;
        state.take_failure()?;
        let listing = state
            .listings
            .get_mut(instrument_id)
            .ok_or_else(|| VenueError::NotFound(format!("instrument {}", instrument_id)))?;
        let price = listing.feed.tick();
        let price = Quotation::from_decimal(price).ok_or_else(|| VenueError::Api {
            code: "70001".to_string(),
            message: format!("price out of range: {}", price),
        })?;
        Ok(PriceQuote {
            instrument_id: instrument_id.clone(),
            price,
            time: self.clock.now(),
        })
    }

    async fn get_portfolio(&self, account_id: &AccountId) -> VenueResult<PortfolioSnapshot> {
        let mut state = self.state.lock().await;
        state.take_failure()?;
        let account = state.account(account_id)?;
        let mut positions: Vec<Position> = account.positions.values().cloned().collect();
        positions.sort_by(|a, b| a.instrument_id.cmp(&b.instrument_id));
        Ok(PortfolioSnapshot {
            account_id: account.id.clone(),
            free_capital: account.free_capital,
            currency: state.currency.clone(),
            positions,
        })
    }

    async fn get_trading_status(&self, instrument_id: &InstrumentId) -> VenueResult<SessionStatus> {
        let mut state = self.state.lock().await;
        state.take_failure()?;
        let listing = state
            .listings
            .get_mut(instrument_id)
            .ok_or_else(|| VenueError::NotFound(format!("instrument {}", instrument_id)))?;
        Ok(listing
            .session_script
            .pop_front()
            .unwrap_or(listing.session))
    }

    async fn place_order(
        &self,
        account_id: &AccountId,
        spec: &OrderSpec,
    ) -> VenueResult<OrderHandle> {
        let mut state = self.state.lock().await;
        state.take_failure()?;

        if !spec.validate() {
            return Err(VenueError::Api {
                code: "30001".to_string(),
                message: format!("invalid order: {:?}", spec),
            });
        }

        let listing = state.listing(&spec.instrument_id)?;
        if !listing.instrument.api_trade_available {
            return Err(VenueError::Api {
                code: "30052".to_string(),
                message: format!(
                    "instrument {} is not available for API trading",
                    spec.instrument_id
                ),
            });
        }
        let notional = listing.feed.current()
            * Decimal::from(spec.lots * listing.instrument.lot_size);
        let commission_rate = state.commission_rate;

        let account = state.account(account_id)?;
        match spec.side {
            Side::Buy => {
                if notional * (Decimal::ONE + commission_rate) > account.free_capital {
                    return Err(VenueError::Api {
                        code: "30042".to_string(),
                        message: "not enough assets for a margin trade".to_string(),
                    });
                }
            }
            Side::Sell => {
                let held = account
                    .positions
                    .get(&spec.instrument_id)
                    .map(|p| p.quantity_lots)
                    .unwrap_or(0);
                if held < spec.lots {
                    return Err(VenueError::Api {
                        code: "30034".to_string(),
                        message: format!("not enough lots: held {}, requested {}", held, spec.lots),
                    });
                }
            }
        }

        state.next_order += 1;
        let seq = state.next_order;
        let order_id = OrderId::new(format!("sbx-order-{}", seq));
        let behavior = state.queued_behaviors.pop_front().unwrap_or_default();
        let order = Order::accepted(order_id.clone(), spec, self.clock.now());
        let handle = order.handle();
        state.orders.insert(
            order_id.clone(),
            SandboxOrder {
                seq,
                account_id: account_id.clone(),
                order,
                behavior,
                polls: 0,
            },
        );

        if behavior == FillBehavior::AfterPolls(0) {
            state.fill(&order_id, spec.lots);
        }
        state.prune_history();

        info!(
            "[SANDBOX] accepted {} {} {} lots of {} ({:?})",
            order_id, spec.side, spec.lots, spec.instrument_id, behavior
        );
        Ok(handle)
    }

    async fn get_order_state(
        &self,
        account_id: &AccountId,
        order_id: &OrderId,
    ) -> VenueResult<Order> {
        let mut state = self.state.lock().await;
        state.take_failure()?;
        match state.orders.get(order_id) {
            Some(entry) if &entry.account_id == account_id => {}
            _ => return Err(VenueError::NotFound(format!("order {}", order_id))),
        }
        state.poll(order_id);
        state
            .orders
            .get(order_id)
            .map(|e| e.order.clone())
            .ok_or_else(|| VenueError::NotFound(format!("order {}", order_id)))
    }

    async fn get_open_orders(&self, account_id: &AccountId) -> VenueResult<Vec<Order>> {
        let mut state = self.state.lock().await;
        state.take_failure()?;
        state.account(account_id)?;
        let mut open: Vec<_> = state
            .orders
            .values()
            .filter(|e| &e.account_id == account_id && e.order.status.is_active())
            .collect();
        open.sort_by_key(|e| e.seq);
        Ok(open.into_iter().map(|e| e.order.clone()).collect())
    }

    async fn cancel_order(&self, account_id: &AccountId, order_id: &OrderId) -> VenueResult<()> {
        let mut state = self.state.lock().await;
        state.take_failure()?;
        let entry = state
            .orders
            .get_mut(order_id)
            .filter(|e| &e.account_id == account_id)
            .ok_or_else(|| VenueError::NotFound(format!("order {}", order_id)))?;

        match entry.order.status {
            OrderStatus::Cancelled => Ok(()),
            status if status.is_terminal() => Err(VenueError::Api {
                code: "30059".to_string(),
                message: format!("order {} is {:?} and cannot be cancelled", order_id, status),
            }),
            _ => {
                entry.order.transition(OrderStatus::Cancelled);
                info!("[SANDBOX] cancelled {}", order_id);
                Ok(())
            }
        }
    }

    async fn get_instrument_metadata(
        &self,
        instrument_id: &InstrumentId,
    ) -> VenueResult<Instrument> {
        let mut state = self.state.lock().await;
        state.take_failure()?;
        Ok(state.listing(instrument_id)?.instrument.clone())
    }

    fn name(&self) -> &str {
        "SandboxVenue"
    }
}
