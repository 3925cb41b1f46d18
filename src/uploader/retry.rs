//! Exponential backoff schedule for artifact uploads.

use std::time::Duration;

/// Retries granted to each artifact after its first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 4;

/// Delay before the first retry; doubles on each following retry
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(8);

/// Maximum backoff (1 hour)
const MAX_BACKOFF: Duration = Duration::from_secs(3600);

/// Retry budget and backoff base for one artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Number of retries after the first attempt (0 = try once)
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: DEFAULT_INITIAL_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Create a policy
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
        }
    }

    /// Single attempt, no retries
    pub fn no_retry() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Start a fresh backoff for one artifact
    pub fn backoff(&self) -> Backoff {
        Backoff {
            retries_left: self.max_retries,
            delay: self.initial_delay.min(MAX_BACKOFF),
        }
    }

    /// Full delay schedule, e.g. 8s, 16s, 32s, 64s for the default policy
    pub fn delays(&self) -> Vec<Duration> {
        let mut backoff = self.backoff();
        std::iter::from_fn(|| backoff.next_delay()).collect()
    }
}

/// Backoff state for one artifact
#[derive(Debug, Clone)]
pub struct Backoff {
    retries_left: u32,
    delay: Duration,
}

impl Backoff {
    /// Consume one retry and return how long to wait before it.
    ///
    /// Returns `None` once the budget is spent.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.retries_left == 0 {
            return None;
        }
        self.retries_left -= 1;
        let delay = self.delay;
        self.delay = delay.saturating_mul(2).min(MAX_BACKOFF);
        Some(delay)
    }

    /// Retries still available
    pub fn retries_left(&self) -> u32 {
        self.retries_left
    }
}
