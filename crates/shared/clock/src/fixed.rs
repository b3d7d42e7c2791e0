use chrono::Duration;
use std::sync::RwLock;
use tradecycle_core::Timestamp;
use tradecycle_ports::Clock;

/// Clock that only moves when told to
///
/// Used by tests and the sandbox venue for reproducible timestamps.
pub struct FixedClock {
    current: RwLock<Timestamp>,
}

impl FixedClock {
    pub fn new(at: Timestamp) -> Self {
        Self {
            current: RwLock::new(at),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self.current.read().unwrap_or_else(|e| e.into_inner())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}
