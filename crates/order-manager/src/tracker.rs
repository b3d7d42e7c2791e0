//! In-flight order tracking
//!
//! The tracker owns the registry of non-terminal orders, keyed by
//! instrument. At most one order per instrument is in flight at any time:
//! a placement first reserves the instrument's slot, then talks to the
//! venue, then records the venue's handle. Nothing holds a registry guard
//! across an await.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::Instant;
use tradecycle_clock::Shutdown;
use tradecycle_core::{
    AccountId, InstrumentId, Order, OrderHandle, OrderId, OrderSpec, OrderStatus, Price,
};
use tradecycle_ports::VenueGateway;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
enum Slot {
    /// Placement submitted, venue has not answered yet
    Reserved,
    Tracked(OrderHandle),
}

impl Slot {
    fn order_id(&self) -> Option<&OrderId> {
        match self {
            Slot::Reserved => None,
            Slot::Tracked(handle) => Some(&handle.order_id),
        }
    }
}

/// Releases a reserved slot unless the placement completed
struct Reservation<'a> {
    registry: &'a DashMap<InstrumentId, Slot>,
    instrument_id: InstrumentId,
    armed: bool,
}

impl Reservation<'_> {
    fn commit(mut self, handle: OrderHandle) {
        self.registry
            .insert(self.instrument_id.clone(), Slot::Tracked(handle));
        self.armed = false;
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.registry
                .remove_if(&self.instrument_id, |_, slot| matches!(slot, Slot::Reserved));
        }
    }
}

/// How long and how often to poll an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillWait {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

/// Places orders and follows them to a terminal state
pub struct OrderTracker<V> {
    venue: V,
    account_id: AccountId,
    in_flight: DashMap<InstrumentId, Slot>,
}

impl<V: VenueGateway> OrderTracker<V> {
    pub fn new(venue: V, account_id: AccountId) -> Self {
        Self {
            venue,
            account_id,
            in_flight: DashMap::new(),
        }
    }

    pub fn venue(&self) -> &V {
        &self.venue
    }

    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    /// Submit a new order and register it as in flight.
    ///
    /// Fails with [`Error::DuplicateOrder`] if the instrument already has a
    /// tracked or reserved order.
    pub async fn place(&self, spec: &OrderSpec) -> Result<OrderHandle> {
        if !spec.validate() {
            return Err(Error::InvalidInput(format!("invalid order spec: {:?}", spec)));
        }

        let reservation = match self.in_flight.entry(spec.instrument_id.clone()) {
            Entry::Occupied(existing) => {
                return Err(Error::DuplicateOrder {
                    instrument_id: spec.instrument_id.clone(),
                    order_id: existing.get().order_id().cloned(),
                });
            }
            Entry::Vacant(slot) => {
                slot.insert(Slot::Reserved);
                Reservation {
                    registry: &self.in_flight,
                    instrument_id: spec.instrument_id.clone(),
                    armed: true,
                }
            }
        };

        let handle = self
            .venue
            .place_order(&self.account_id, spec)
            .await
            .map_err(|e| Error::venue(e, Some(&spec.instrument_id), None))?;

        info!(
            "[TRACKER] placed {} {} {} lots of {} ({:?})",
            handle.order_id, spec.side, spec.lots, spec.instrument_id, spec.order_type
        );
        reservation.commit(handle.clone());
        Ok(handle)
    }

    /// Adopt every non-terminal order the venue knows about.
    ///
    /// Must run before any new order is placed. Running it again without new
    /// venue activity leaves the registry unchanged. More than one open order
    /// for an instrument, or a venue order that disagrees with the local
    /// entry, is a [`Error::ReconciliationConflict`]; nothing is merged or
    /// cancelled.
    pub async fn reconcile(&self) -> Result<Vec<OrderHandle>> {
        let open = self
            .venue
            .get_open_orders(&self.account_id)
            .await
            .map_err(Error::from)?;

        let mut by_instrument: BTreeMap<InstrumentId, Vec<Order>> = BTreeMap::new();
        for order in open.into_iter().filter(|o| o.status.is_active()) {
            by_instrument
                .entry(order.instrument_id.clone())
                .or_default()
                .push(order);
        }

        for (instrument_id, orders) in &by_instrument {
            if orders.len() > 1 {
                return Err(Error::ReconciliationConflict {
                    instrument_id: instrument_id.clone(),
                    order_ids: orders.iter().map(|o| o.id.clone()).collect(),
                });
            }
        }

        let mut adopted = Vec::with_capacity(by_instrument.len());
        for (instrument_id, orders) in by_instrument {
            let Some(order) = orders.into_iter().next() else {
                continue;
            };
            match self.in_flight.entry(instrument_id.clone()) {
                Entry::Occupied(existing) => match existing.get() {
                    Slot::Tracked(handle) if handle.order_id == order.id => {}
                    slot => {
                        let mut order_ids: Vec<OrderId> =
                            slot.order_id().cloned().into_iter().collect();
                        order_ids.push(order.id.clone());
                        return Err(Error::ReconciliationConflict {
                            instrument_id,
                            order_ids,
                        });
                    }
                },
                Entry::Vacant(slot) => {
                    info!(
                        "[TRACKER] adopted open {} order {} for {} ({}/{} lots executed)",
                        order.side,
                        order.id,
                        order.instrument_id,
                        order.lots_executed,
                        order.lots_requested
                    );
                    slot.insert(Slot::Tracked(order.handle()));
                }
            }
            adopted.push(order.handle());
        }

        debug!("[TRACKER] reconciled {} open order(s)", adopted.len());
        Ok(adopted)
    }

    /// Poll the order until it reaches a terminal state.
    ///
    /// Returns the executed price on FILLED. REJECTED and CANCELLED end in an
    /// error. Every terminal outcome removes the order from the registry.
    /// When `wait.timeout` expires the order is cancelled at the venue and
    /// [`Error::FillTimeout`] is returned.
    pub async fn wait_until_terminal(
        &self,
        handle: &OrderHandle,
        wait: FillWait,
        shutdown: &mut Shutdown,
    ) -> Result<Price> {
        let deadline = Instant::now() + wait.timeout;

        loop {
            shutdown.check()?;

            let order = self
                .venue
                .get_order_state(&self.account_id, &handle.order_id)
                .await
                .map_err(|e| Error::venue(e, Some(&handle.instrument_id), Some(&handle.order_id)))?;

            match order.status {
                OrderStatus::Filled => {
                    self.release(handle);
                    let price = order.executed_price.ok_or_else(|| Error::MissingFillPrice {
                        instrument_id: handle.instrument_id.clone(),
                        order_id: handle.order_id.clone(),
                    })?;
                    info!(
                        "[TRACKER] order {} for {} filled: {} {} lots @ {}",
                        handle.order_id,
                        handle.instrument_id,
                        order.side,
                        order.lots_executed,
                        price
                    );
                    return Ok(price);
                }
                OrderStatus::Rejected => {
                    self.release(handle);
                    warn!(
                        "[TRACKER] order {} for {} rejected",
                        handle.order_id, handle.instrument_id
                    );
                    return Err(Error::OrderRejected {
                        instrument_id: handle.instrument_id.clone(),
                        order_id: handle.order_id.clone(),
                    });
                }
                OrderStatus::Cancelled => {
                    self.release(handle);
                    warn!(
                        "[TRACKER] order {} for {} cancelled with {} lots executed",
                        handle.order_id, handle.instrument_id, order.lots_executed
                    );
                    return Err(Error::OrderCancelled {
                        instrument_id: handle.instrument_id.clone(),
                        order_id: handle.order_id.clone(),
                        lots_executed: order.lots_executed,
                    });
                }
                OrderStatus::New | OrderStatus::PartiallyFilled => {
                    debug!(
                        "[TRACKER] order {} for {} {:?}: {}/{} lots",
                        handle.order_id,
                        handle.instrument_id,
                        order.status,
                        order.lots_executed,
                        order.lots_requested
                    );
                }
            }

            let now = Instant::now();
            if now >= deadline {
                self.cancel_stale(handle).await;
                return Err(Error::FillTimeout {
                    instrument_id: handle.instrument_id.clone(),
                    order_id: handle.order_id.clone(),
                    timeout: wait.timeout,
                });
            }
            shutdown
                .sleep(wait.poll_interval.min(deadline - now))
                .await?;
        }
    }

    /// Cancel an in-flight order at the venue and stop tracking it
    pub async fn cancel(&self, handle: &OrderHandle) -> Result<()> {
        self.venue
            .cancel_order(&self.account_id, &handle.order_id)
            .await
            .map_err(|e| Error::venue(e, Some(&handle.instrument_id), Some(&handle.order_id)))?;
        self.release(handle);
        info!(
            "[TRACKER] cancelled order {} for {}",
            handle.order_id, handle.instrument_id
        );
        Ok(())
    }

    /// Handles of every acknowledged in-flight order, ordered by instrument
    pub fn in_flight(&self) -> Vec<OrderHandle> {
        let mut handles: Vec<OrderHandle> = self
            .in_flight
            .iter()
            .filter_map(|entry| match entry.value() {
                Slot::Tracked(handle) => Some(handle.clone()),
                Slot::Reserved => None,
            })
            .collect();
        handles.sort_by(|a, b| a.instrument_id.cmp(&b.instrument_id));
        handles
    }

    pub fn is_tracked(&self, instrument_id: &InstrumentId) -> bool {
        self.in_flight.contains_key(instrument_id)
    }

    async fn cancel_stale(&self, handle: &OrderHandle) {
        match self.cancel(handle).await {
            Ok(()) => warn!(
                "[TRACKER] order {} for {} not filled in time, cancelled",
                handle.order_id, handle.instrument_id
            ),
            // Probably filled in the meantime; the next reconcile picks it up
            Err(e) => warn!(
                "[TRACKER] order {} for {} not filled in time, cancel failed: {}",
                handle.order_id, handle.instrument_id, e
            ),
        }
    }

    fn release(&self, handle: &OrderHandle) {
        self.in_flight.remove_if(&handle.instrument_id, |_, slot| {
            slot.order_id() == Some(&handle.order_id)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropped_reservation_frees_slot() {
        let registry: DashMap<InstrumentId, Slot> = DashMap::new();
        let id = InstrumentId::new("SBER");
        registry.insert(id.clone(), Slot::Reserved);

        drop(Reservation {
            registry: &registry,
            instrument_id: id.clone(),
            armed: true,
        });
        assert!(!registry.contains_key(&id));
    }

    #[test]
    fn test_committed_reservation_keeps_handle() {
        let registry: DashMap<InstrumentId, Slot> = DashMap::new();
        let id = InstrumentId::new("SBER");
        registry.insert(id.clone(), Slot::Reserved);

        let reservation = Reservation {
            registry: &registry,
            instrument_id: id.clone(),
            armed: true,
        };
        reservation.commit(OrderHandle {
            order_id: OrderId::new("o-1"),
            instrument_id: id.clone(),
            side: tradecycle_core::Side::Buy,
            lots: 1,
        });

        let slot = registry.get(&id).unwrap();
        assert_eq!(slot.order_id().map(|o| o.as_str()), Some("o-1"));
    }
}
