//! Capped exponential backoff.

use super::state::RetryState;
use super::strategy::BackoffStrategy;
use async_trait::async_trait;
use std::error::Error;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Predicate deciding whether an error from a given attempt is retried.
pub type RetryPredicate = Arc<dyn Fn(&(dyn Error + 'static), u32) -> bool + Send + Sync>;

/// Exponential backoff strategy with a ceiling and optional jitter.
///
/// # Formula
///
/// For a failed attempt `n` (0-indexed):
/// ```text
/// base_delay   = initial_delay * (multiplier ^ n)
/// capped_delay = min(base_delay, max_delay)
/// final_delay  = min(capped_delay ± capped_delay * jitter, max_delay)
/// ```
///
/// The defaults reproduce the upload schedule: one retry, 2 s base delay,
/// 10 s ceiling, doubling, no jitter. That yields waits of 2 s, 4 s, 8 s,
/// 10 s, 10 s, ...
///
/// # Examples
///
/// ```rust
/// use receiptdrop_core::retry::{BackoffStrategy, ExponentialBackoff};
/// use std::time::Duration;
///
/// let backoff = ExponentialBackoff::default();
/// assert_eq!(backoff.next_delay(0), Some(Duration::from_millis(2000)));
/// assert_eq!(backoff.next_delay(3), Some(Duration::from_millis(10000)));
/// ```
#[derive(Clone)]
pub struct ExponentialBackoff {
    max_retries: u32,
    initial_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
    jitter: f64,
    predicate: Option<RetryPredicate>,
}

const DEFAULT_MAX_RETRIES: u32 = 1;
const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(2000);
const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(10000);
const DEFAULT_MULTIPLIER: f64 = 2.0;

impl ExponentialBackoff {
    /// Create a new builder for configuring exponential backoff.
    pub fn builder() -> ExponentialBackoffBuilder {
        ExponentialBackoffBuilder::default()
    }

    /// Same schedule with a different retry bound.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Attach a predicate consulted by [`BackoffStrategy::should_retry`].
    ///
    /// Errors the predicate rejects are returned immediately, without
    /// waiting and regardless of how many attempts remain.
    #[must_use]
    pub fn with_predicate<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&(dyn Error + 'static), u32) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Base delay before the first retry.
    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Upper bound on any single delay.
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for ExponentialBackoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExponentialBackoff")
            .field("max_retries", &self.max_retries)
            .field("initial_delay", &self.initial_delay)
            .field("max_delay", &self.max_delay)
            .field("multiplier", &self.multiplier)
            .field("jitter", &self.jitter)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

#[async_trait]
impl BackoffStrategy for ExponentialBackoff {
    async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, E>
    where
        F: Fn(RetryState) -> Fut + Send + Sync,
        Fut: Future<Output = Result<T, E>> + Send,
        T: Send,
        E: Error + Send + Sync + 'static,
    {
        let mut state = RetryState::new(self.max_retries);
        loop {
            match operation(state).await {
                Ok(result) => return Ok(result),
                Err(err) if !self.should_retry(&err, state.attempt) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        attempt = state.attempt + 1,
                        error = %err,
                        "error is not retryable"
                    );
                    return Err(err);
                }
                Err(err) if state.is_last() => return Err(err),
                Err(err) => {
                    let delay = self.next_delay(state.attempt).unwrap_or(Duration::ZERO);
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        attempt = state.attempt + 1,
                        total = state.total_attempts(),
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "attempt failed, backing off"
                    );
                    #[cfg(not(feature = "tracing"))]
                    let _ = err;
                    tokio::time::sleep(delay).await;
                    state = state.advance(delay);
                }
            }
        }
    }

    fn should_retry(&self, error: &(dyn Error + 'static), attempt: u32) -> bool {
        self.predicate
            .as_ref()
            .is_none_or(|predicate| predicate(error, attempt))
    }

    fn next_delay(&self, attempt: u32) -> Option<Duration> {
        let max_nanos = self.max_delay.as_nanos() as f64;
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let base = self.initial_delay.as_nanos() as f64 * self.multiplier.powi(exponent);
        let capped = base.min(max_nanos);

        let jittered = if self.jitter > 0.0 {
            // Uniform in [capped * (1 - jitter), capped * (1 + jitter)].
            let jitter_amount = capped * self.jitter * (rand::random::<f64>() - 0.5) * 2.0;
            (capped + jitter_amount).min(max_nanos)
        } else {
            capped
        };

        Some(Duration::from_nanos(jittered.max(0.0).round() as u64))
    }

    fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

/// Builder for configuring `ExponentialBackoff`.
///
/// # Examples
///
/// ```rust
/// use receiptdrop_core::retry::ExponentialBackoff;
/// use std::time::Duration;
///
/// let backoff = ExponentialBackoff::builder()
///     .max_retries(5)
///     .initial_delay(Duration::from_millis(100))
///     .max_delay(Duration::from_secs(30))
///     .multiplier(2.0)
///     .jitter(0.1)
///     .build();
/// ```
#[derive(Debug, Default)]
pub struct ExponentialBackoffBuilder {
    max_retries: Option<u32>,
    initial_delay: Option<Duration>,
    max_delay: Option<Duration>,
    multiplier: Option<f64>,
    jitter: Option<f64>,
}

impl ExponentialBackoffBuilder {
    /// Set the number of retries after the first attempt. Default: 1
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Set the delay before the first retry. Default: 2000ms
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = Some(delay);
        self
    }

    /// Set the maximum delay between retries. Default: 10s
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = Some(delay);
        self
    }

    /// Set the exponential multiplier. Default: 2.0
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = Some(multiplier);
        self
    }

    /// Set the jitter factor, clamped to `0.0..=1.0`. Default: 0.0
    ///
    /// A jitter of 0.1 lets each delay vary by ±10%.
    pub fn jitter(mut self, jitter: f64) -> Self {
        self.jitter = Some(jitter.clamp(0.0, 1.0));
        self
    }

    /// Build the `ExponentialBackoff`, defaulting any unset parameter.
    pub fn build(self) -> ExponentialBackoff {
        ExponentialBackoff {
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            initial_delay: self.initial_delay.unwrap_or(DEFAULT_INITIAL_DELAY),
            max_delay: self.max_delay.unwrap_or(DEFAULT_MAX_DELAY),
            multiplier: self.multiplier.unwrap_or(DEFAULT_MULTIPLIER),
            jitter: self.jitter.unwrap_or(0.0),
            predicate: None,
        }
    }
}
