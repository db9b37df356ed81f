//! Per-call retry bookkeeping.

use std::time::Duration;

/// Transient state of one retried call.
///
/// Created fresh for every call to [`BackoffStrategy::execute`](super::BackoffStrategy::execute)
/// and handed by value to each attempt. Nothing here outlives the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    /// Current attempt, 0-based. Ranges over `0..=max_retries`.
    pub attempt: u32,
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    /// Sum of all backoff waits taken so far in this call.
    pub elapsed_backoff: Duration,
}

impl RetryState {
    /// State for the first attempt of a call.
    pub fn new(max_retries: u32) -> Self {
        Self {
            attempt: 0,
            max_retries,
            elapsed_backoff: Duration::ZERO,
        }
    }

    /// Total attempts the call may make (`max_retries + 1`).
    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Whether this is the last allowed attempt.
    pub fn is_last(&self) -> bool {
        self.attempt >= self.max_retries
    }

    /// State for the next attempt after waiting `delay`.
    #[must_use]
    pub fn advance(self, delay: Duration) -> Self {
        Self {
            attempt: self.attempt + 1,
            max_retries: self.max_retries,
            elapsed_backoff: self.elapsed_backoff.saturating_add(delay),
        }
    }
}
