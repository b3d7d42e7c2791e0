use chrono::Utc;
use tradecycle_core::Timestamp;
use tradecycle_ports::Clock;

/// Wall-clock time, used to stamp sandbox quotes and orders in a live run
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }

    fn name(&self) -> &str {
        "system"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracks_utc_now() {
        let before = Utc::now();
        let stamped = SystemClock::new().now();
        let after = Utc::now();

        assert!(before <= stamped && stamped <= after);
    }
}
