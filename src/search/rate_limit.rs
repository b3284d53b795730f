//! Minimum-interval throttle shared by every search call in the process.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;

use crate::clock::Clock;

/// Default spacing between search calls: ten calls per minute.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(6);

/// Spaces consecutive calls at least `min_interval` apart, measured
/// call-start to call-start.
///
/// Construct one per process and share it via `Arc`. The last-call
/// timestamp is guarded by an async mutex held across the wait, so
/// callers from concurrent flows are strictly serialized.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Creates a limiter with an explicit minimum interval.
    #[must_use]
    pub fn new(min_interval: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
            clock,
        }
    }

    /// Configured minimum interval.
    #[must_use]
    pub const fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits until a call may start, records the start, and returns it.
    pub async fn acquire(&self) -> Instant {
        let mut last_call = self.last_call.lock().await;

        if let Some(previous) = *last_call {
            let elapsed = self.clock.now().saturating_duration_since(previous);
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!(wait_ms = wait.as_millis(), "search throttled");
                self.clock.sleep(wait).await;
            }
        }

        let started = self.clock.now();
        *last_call = Some(started);
        started
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn limiter(clock: &Arc<ManualClock>) -> RateLimiter {
        RateLimiter::new(DEFAULT_MIN_INTERVAL, Arc::clone(clock) as Arc<dyn Clock>)
    }

    #[test]
    fn test_default_interval() {
        let clock = Arc::new(ManualClock::new());
        assert_eq!(limiter(&clock).min_interval(), Duration::from_secs(6));
    }

    #[tokio::test]
    async fn test_first_call_is_not_delayed() {
        let clock = Arc::new(ManualClock::new());
        limiter(&clock).acquire().await;
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_back_to_back_calls_are_spaced() {
        let clock = Arc::new(ManualClock::new());
        let limiter = limiter(&clock);

        let mut starts = Vec::new();
        for _ in 0..4 {
            starts.push(limiter.acquire().await);
        }

        for pair in starts.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_secs(6));
        }
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(6); 3]);
    }

    #[tokio::test]
    async fn test_only_remaining_interval_is_waited() {
        let clock = Arc::new(ManualClock::new());
        let limiter = limiter(&clock);

        limiter.acquire().await;
        clock.advance(Duration::from_secs(4));
        limiter.acquire().await;

        assert_eq!(clock.sleeps(), vec![Duration::from_secs(2)]);
    }

    #[tokio::test]
    async fn test_no_wait_after_interval_passed() {
        let clock = Arc::new(ManualClock::new());
        let limiter = limiter(&clock);

        limiter.acquire().await;
        clock.advance(Duration::from_secs(7));
        limiter.acquire().await;

        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_callers_are_serialized() {
        let clock = Arc::new(ManualClock::new());
        let limiter = Arc::new(limiter(&clock));

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move { limiter.acquire().await })
            })
            .collect();

        let mut starts = Vec::new();
        for handle in handles {
            starts.push(handle.await.unwrap_or_else(|e| unreachable!("{e}")));
        }
        starts.sort();

        for pair in starts.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_secs(6));
        }
    }
}
