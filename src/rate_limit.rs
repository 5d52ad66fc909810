//! Client-side throttling of bridge requests.
//!
//! The bridge drops requests that arrive too quickly even though it never
//! says so. Two limits apply to every request: at most `max_requests` inside
//! any sliding `window`, and at least `min_spacing` between two requests.

use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};

/// Throughput limits for one bridge.
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimit {
    /// Burst ceiling inside one window.
    pub max_requests: usize,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub window: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub min_spacing: Duration,
}

impl RateLimit {
    pub const MAX_UPDATES_PER_SECOND: usize = 10;
    pub const MIN_TIME_BETWEEN_UPDATES: Duration = Duration::from_millis(150);
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            max_requests: Self::MAX_UPDATES_PER_SECOND,
            window: Duration::from_secs(1),
            min_spacing: Self::MIN_TIME_BETWEEN_UPDATES,
        }
    }
}

/// Gate that admits one action at a time under a [`RateLimit`].
///
/// The timestamp window is guarded by a single mutex which stays locked for
/// the whole admission, including the wrapped action, so concurrent callers
/// are served strictly one after another.
#[derive(Debug)]
pub struct RateLimiter {
    limit: RateLimit,
    window: Mutex<VecDeque<Instant>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimit::default())
    }
}

impl RateLimiter {
    pub fn new(limit: RateLimit) -> Self {
        let limit = RateLimit {
            max_requests: limit.max_requests.max(1),
            ..limit
        };
        Self {
            limit,
            window: Mutex::new(VecDeque::with_capacity(limit.max_requests)),
        }
    }

    pub fn limit(&self) -> &RateLimit {
        &self.limit
    }

    /// Wait until the limits allow another request, then run `action`.
    pub async fn admit<F, Fut, R>(&self, action: F) -> R
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = R>,
    {
        let mut window = self.window.lock().await;

        if window.len() >= self.limit.max_requests {
            self.wait_for_oldest(&window).await;
        }

        loop {
            let now = Instant::now();
            while window
                .front()
                .is_some_and(|oldest| now.duration_since(*oldest) >= self.limit.window)
            {
                window.pop_front();
            }
            if window.len() < self.limit.max_requests {
                break;
            }
            self.wait_for_oldest(&window).await;
        }

        if let Some(latest) = window.back() {
            let diff = Instant::now().duration_since(*latest);
            if diff < self.limit.min_spacing {
                let wait = self.limit.min_spacing - diff;
                debug!("spacing requests, sleeping {:?}", wait);
                sleep(wait).await;
            }
        }

        let output = action().await;

        window.push_back(Instant::now());
        output
    }

    async fn wait_for_oldest(&self, window: &VecDeque<Instant>) {
        let Some(oldest) = window.front() else {
            return;
        };
        let elapsed = Instant::now().duration_since(*oldest);
        if let Some(wait) = self.limit.window.checked_sub(elapsed).filter(|d| !d.is_zero()) {
            debug!(
                "{} requests in the last {:?}, sleeping {:?}",
                window.len(),
                self.limit.window,
                wait
            );
            sleep(wait).await;
        }
    }
}
