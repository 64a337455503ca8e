use log::trace;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Minimum interval Nominatim's usage policy allows between requests.
pub const NOMINATIM_MIN_INTERVAL: Duration = Duration::from_millis(1100);

/// Serializes callers so that consecutive permits are at least `interval` apart.
///
/// The lock is held across the wait, so concurrent callers queue up and each one observes
/// the timestamp written by its predecessor.
pub struct RateLimiter {
    interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_call: Mutex::new(None),
        }
    }

    pub fn nominatim() -> Self {
        Self::new(NOMINATIM_MIN_INTERVAL)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until a request is permitted, then record it.
    pub async fn acquire(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(previous) = *last_call {
            let elapsed = previous.elapsed();
            if elapsed < self.interval {
                let wait = self.interval - elapsed;
                trace!("Rate limiter waiting: wait_ms={}", wait.as_millis());
                tokio::time::sleep(wait).await;
            }
        }
        *last_call = Some(Instant::now());
    }

    pub async fn reset(&self) {
        *self.last_call.lock().await = None;
    }
}
