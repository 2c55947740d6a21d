//! Retry policy for the optimistic strategy
//!
//! Without a bound, a compare-and-swap loop can spin forever when writers keep
//! invalidating each other's reads. `RetryPolicy` caps the number of attempts
//! and spaces retries with capped exponential backoff and full jitter.

use rand::Rng;
use std::time::Duration;

/// Default cap on compare-and-swap attempts per logical increment
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10_000;

/// Default ceiling on a single backoff pause
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_millis(1);

/// Bound and pacing of optimistic retries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts allowed per increment; 0 means unbounded
    pub max_attempts: u32,
    /// Backoff before the first retry (doubles on each further retry)
    pub base_backoff: Duration,
    /// Ceiling on any single backoff
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_backoff: Duration::ZERO,
            max_backoff: DEFAULT_MAX_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// Retry forever, without pausing between attempts
    pub fn unbounded() -> Self {
        Self {
            max_attempts: 0,
            base_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Cap attempts at `max_attempts` (0 = unbounded)
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set base and ceiling of the exponential backoff
    pub fn with_backoff(mut self, base: Duration, max: Duration) -> Self {
        self.base_backoff = base;
        self.max_backoff = max;
        self
    }

    /// True once `attempts` attempts have been made and no more are allowed
    pub fn is_exhausted(&self, attempts: u32) -> bool {
        self.max_attempts != 0 && attempts >= self.max_attempts
    }

    /// Upper bound of the pause before retry number `retry` (1-based)
    ///
    /// `min(base * 2^(retry - 1), max)`
    pub fn backoff_ceiling(&self, retry: u32) -> Duration {
        if self.base_backoff.is_zero() || retry == 0 {
            return Duration::ZERO;
        }
        let shift = (retry - 1).min(31);
        self.base_backoff
            .checked_mul(1u32 << shift)
            .map_or(self.max_backoff, |d| d.min(self.max_backoff))
    }

    /// Pause before retry number `retry`
    ///
    /// Sleeps a uniformly random duration in `[0, backoff_ceiling(retry)]`.
    /// With no backoff configured the thread only yields.
    pub fn pause(&self, retry: u32) {
        let ceiling = self.backoff_ceiling(retry);
        if ceiling.is_zero() {
            std::thread::yield_now();
            return;
        }
        let nanos = rand::thread_rng().gen_range(0..=ceiling.as_nanos() as u64);
        std::thread::sleep(Duration::from_nanos(nanos));
    }
}
