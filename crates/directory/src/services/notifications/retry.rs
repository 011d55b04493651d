//! Retry policy for the notification run.

use std::time::Duration;

use rand::Rng;

/// How a failed notification run is retried.
///
/// Backoff doubles per attempt up to a ceiling, and the actual delay is
/// drawn uniformly from zero to the computed backoff (full jitter) so
/// concurrent workers do not retry in lockstep.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries allowed after the first failed attempt.
    pub max_retries: u32,
    /// Backoff before the first retry.
    pub initial_backoff: Duration,
    /// Ceiling for any single backoff.
    pub max_backoff: Duration,
    /// Wall-clock budget for one attempt; an attempt past this is failed.
    pub run_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(600),
            run_timeout: Duration::from_secs(30 * 60),
        }
    }
}

impl RetryPolicy {
    /// The deterministic backoff for retry `attempt` (1-based).
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let doublings = attempt.saturating_sub(1).min(20);
        let factor = 2u32.saturating_pow(doublings);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// The jittered delay to sleep before retry `attempt`: uniform over
    /// `0..=backoff_for(attempt)`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let backoff_ms = u64::try_from(self.backoff_for(attempt).as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(rand::rng().random_range(0..=backoff_ms))
    }
}
