//! Shutdown signal for cancellable suspension points
//!
//! Every polling loop in the engine (order fulfillment, session gate,
//! signal ticks) sleeps through [`Shutdown::sleep`], so an external stop
//! request ends the wait promptly instead of after the full interval.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;

/// Returned by a wait that ended because shutdown was requested
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("interrupted by shutdown")]
pub struct Interrupted;

/// Sender side: requests shutdown for every linked [`Shutdown`]
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    pub fn trigger(&self) {
        // send_replace never fails, even with no receivers left
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// A new receiver linked to this handle
    pub fn subscribe(&self) -> Shutdown {
        Shutdown {
            rx: self.tx.subscribe(),
        }
    }
}

/// Receiver side, cloned into every task that waits
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

/// Create a linked handle/receiver pair
pub fn shutdown_channel() -> (ShutdownHandle, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownHandle { tx: Arc::new(tx) }, Shutdown { rx })
}

impl Shutdown {
    /// A receiver that is never triggered
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once shutdown is requested; pends forever if the handle is gone
    pub async fn triggered(&mut self) {
        if self.rx.wait_for(|stop| *stop).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Sleep for `duration` unless shutdown is requested first
    pub async fn sleep(&mut self, duration: Duration) -> Result<(), Interrupted> {
        if self.is_triggered() {
            return Err(Interrupted);
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => Ok(()),
            _ = self.triggered() => Err(Interrupted),
        }
    }

    /// Fail fast if shutdown was already requested
    pub fn check(&self) -> Result<(), Interrupted> {
        if self.is_triggered() {
            Err(Interrupted)
        } else {
            Ok(())
        }
    }
}
