//! Session-wide traffic clock
//!
//! Both relay directions refresh the same clock, so a session is idle only
//! when neither direction has moved data.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Last time any direction of a session moved data
#[derive(Debug)]
pub struct Activity {
    start: Instant,
    last_ms: AtomicU64,
}

impl Default for Activity {
    fn default() -> Self {
        Self::new()
    }
}

impl Activity {
    /// Start the clock at "now"
    pub fn new() -> Self {
        Activity {
            start: Instant::now(),
            last_ms: AtomicU64::new(0),
        }
    }

    /// Record that data just moved
    pub fn touch(&self) {
        let now = self.start.elapsed().as_millis() as u64;
        self.last_ms.fetch_max(now, Ordering::Relaxed);
    }

    /// Time since data last moved in either direction
    pub fn quiet_for(&self) -> Duration {
        let now = self.start.elapsed().as_millis() as u64;
        let last = self.last_ms.load(Ordering::Relaxed);
        Duration::from_millis(now.saturating_sub(last))
    }

    /// Resolve once the session has been quiet for `limit`
    pub async fn expired(&self, limit: Duration) {
        loop {
            let quiet = self.quiet_for();
            if quiet >= limit {
                return;
            }
            tokio::time::sleep(limit - quiet).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_quiet_grows_until_touched() {
        let activity = Activity::new();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(activity.quiet_for() >= Duration::from_millis(49));

        activity.touch();
        assert!(activity.quiet_for() < Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_expired_waits_for_silence() {
        let activity = Arc::new(Activity::new());
        let limit = Duration::from_millis(100);

        let toucher = {
            let activity = activity.clone();
            tokio::spawn(async move {
                for _ in 0..5 {
                    tokio::time::sleep(Duration::from_millis(60)).await;
                    activity.touch();
                }
            })
        };

        let started = Instant::now();
        activity.expired(limit).await;
        toucher.await.unwrap();

        // Last touch lands at 300ms or later
        assert!(started.elapsed() >= Duration::from_millis(380));
    }
}
