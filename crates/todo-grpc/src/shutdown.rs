//! Broadcast-once cancellation signal
//!
//! The governing context of a server. Anyone holding a clone can fire it or
//! wait for it; once fired it stays fired.

use std::sync::Arc;
use tokio::sync::watch;

/// Cloneable handle on a one-shot cancellation
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    /// A signal that has not fired
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Fire the signal; firing again is a no-op
    pub fn cancel(&self) {
        self.tx.send_if_modified(|cancelled| {
            let first = !*cancelled;
            *cancelled = true;
            first
        });
    }

    /// Whether the signal has fired
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once the signal has fired
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // the sender lives in `self`, so this only returns once the value is true
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}
