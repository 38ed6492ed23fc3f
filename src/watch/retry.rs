//! Bounded linear backoff for re-subscribing after a removal.

use std::time::Duration;

/// Default number of re-subscription attempts.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default backoff step between attempts.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(500);

/// Retry limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_RETRIES,
            base_interval: DEFAULT_RETRY_INTERVAL,
        }
    }
}

/// Attempt counter for one removal episode.
///
/// The wait before attempt `n` (0-based) is `base_interval * n`, so the first
/// attempt runs immediately and later ones back off linearly. Once
/// `max_attempts` have been recorded [`next_delay`](Self::next_delay)
/// returns `None` and no further attempt may be made.
#[derive(Debug, Clone)]
pub struct RetryState {
    policy: RetryPolicy,
    attempts: u32,
}

impl RetryState {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            attempts: 0,
        }
    }

    /// Attempts recorded so far in this episode.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.policy.max_attempts
    }

    /// How long to wait before the next attempt, or `None` when exhausted.
    pub fn next_delay(&self) -> Option<Duration> {
        if self.is_exhausted() {
            return None;
        }
        Some(self.policy.base_interval.saturating_mul(self.attempts))
    }

    /// Count an attempt and return its 1-based number.
    pub fn record_attempt(&mut self) -> u32 {
        self.attempts = self.attempts.saturating_add(1);
        self.attempts
    }

    /// Start a fresh episode.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}
