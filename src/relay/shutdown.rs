//! Once-only shutdown signal shared by the two directions of a session

use tokio::sync::watch;

/// Fired by whichever relay direction finishes first
///
/// Firing is idempotent: only the first [`trigger`](Self::trigger) returns
/// `true`, later calls are no-ops.
#[derive(Debug)]
pub struct SessionShutdown {
    tx: watch::Sender<bool>,
}

impl Default for SessionShutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionShutdown {
    /// Create an unfired signal
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        SessionShutdown { tx }
    }

    /// Fire the signal; returns `true` only for the call that fired it
    pub fn trigger(&self) -> bool {
        self.tx.send_if_modified(|fired| {
            if *fired {
                false
            } else {
                *fired = true;
                true
            }
        })
    }

    /// Wait until the signal fires; returns immediately if it already has
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}
