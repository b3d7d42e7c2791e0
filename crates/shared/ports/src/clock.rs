use tradecycle_core::Timestamp;

/// Source of timestamps for quotes and orders.
///
/// Only stamps data. Waiting is done on tokio's timer so tests can pause it.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;

    fn name(&self) -> &str {
        "clock"
    }
}
