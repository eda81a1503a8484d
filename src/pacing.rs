//! Request pacing using Governor (GCRA algorithm)
//!
//! Every network call awaits [`RequestPacer::ready`] first, which spaces calls
//! at least one configured interval apart. Business logic never sleeps itself.

use governor::{
    clock::DefaultClock,
    middleware::NoOpMiddleware,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorLimiter,
};
use std::time::Duration;
use tracing::trace;

/// Fixed-interval scheduler shared by all network collaborators
pub struct RequestPacer {
    /// None when pacing is disabled
    limiter: Option<GovernorLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
    interval: Duration,
}

impl RequestPacer {
    /// One permit per `interval`, burst of one. A zero interval disables pacing.
    pub fn new(interval: Duration) -> Self {
        let limiter = Quota::with_period(interval).map(GovernorLimiter::direct);
        Self { limiter, interval }
    }

    /// Pacer that never waits
    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Wait until the next call may be issued
    pub async fn ready(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
            trace!(interval_ms = self.interval.as_millis() as u64, "Pacer permit granted");
        }
    }

    fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }
}

impl std::fmt::Debug for RequestPacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPacer")
            .field("interval", &self.interval)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

/// Wait between ticks that found nothing new
pub async fn idle(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
