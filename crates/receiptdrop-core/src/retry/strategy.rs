//! The retry strategy trait.

use super::state::RetryState;
use async_trait::async_trait;
use std::error::Error;
use std::future::Future;
use std::time::Duration;

/// A strategy for retrying failed operations with backoff.
///
/// Implementations decide how long to wait between attempts and which
/// errors are worth another attempt. The loop itself is bounded: an
/// operation runs at most `max_retries() + 1` times.
///
/// # Examples
///
/// ```rust
/// use receiptdrop_core::retry::{BackoffStrategy, ExponentialBackoff};
/// use std::time::Duration;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backoff = ExponentialBackoff::builder()
///     .max_retries(3)
///     .initial_delay(Duration::from_millis(10))
///     .build();
///
/// let calls = Arc::new(AtomicU32::new(0));
/// let result = backoff.execute(|_state| {
///     let calls = Arc::clone(&calls);
///     async move {
///         if calls.fetch_add(1, Ordering::SeqCst) < 2 {
///             Err(std::io::Error::other("retry me"))
///         } else {
///             Ok(42)
///         }
///     }
/// }).await?;
/// assert_eq!(result, 42);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait BackoffStrategy: Send + Sync {
    /// Execute an operation with retry logic.
    ///
    /// The operation receives the [`RetryState`] of the attempt it is
    /// running as. It is called until it succeeds, fails with an error
    /// [`should_retry`](Self::should_retry) rejects, or fails on the last
    /// allowed attempt. The returned error is always the one produced by
    /// the final attempt.
    async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, E>
    where
        F: Fn(RetryState) -> Fut + Send + Sync,
        Fut: Future<Output = Result<T, E>> + Send,
        T: Send,
        E: Error + Send + Sync + 'static;

    /// Determine if an error is retryable.
    ///
    /// Default implementation retries every error.
    ///
    /// # Parameters
    /// - `error`: The error to evaluate
    /// - `attempt`: The attempt that produced it (0-indexed)
    fn should_retry(&self, error: &(dyn Error + 'static), attempt: u32) -> bool {
        let _ = (error, attempt);
        true
    }

    /// Delay to wait after a failed `attempt` (0-indexed) before the next one.
    ///
    /// Returns `None` when the strategy has no delay to offer; callers treat
    /// that as "retry immediately".
    fn next_delay(&self, attempt: u32) -> Option<Duration>;

    /// Number of retries allowed after the initial attempt.
    ///
    /// With `max_retries() == 1` an operation runs at most twice.
    fn max_retries(&self) -> u32;
}
