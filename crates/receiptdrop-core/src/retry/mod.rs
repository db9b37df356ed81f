//! Retry strategies and backoff implementations.
//!
//! # Key Types
//!
//! - [`BackoffStrategy`] - Core trait for retry strategies
//! - [`ExponentialBackoff`] - Capped exponential backoff, optional jitter
//! - [`RetryState`] - Attempt counter and accumulated backoff for one call
//!
//! # Examples
//!
//! ```rust
//! use receiptdrop_core::retry::{BackoffStrategy, ExponentialBackoff};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backoff = ExponentialBackoff::builder()
//!     .max_retries(3)
//!     .initial_delay(Duration::from_millis(100))
//!     .build();
//!
//! let result = backoff.execute(|state| async move {
//!     println!("attempt {}/{}", state.attempt + 1, state.total_attempts());
//!     Ok::<_, std::io::Error>(42)
//! }).await?;
//! # Ok(())
//! # }
//! ```

mod exponential;
mod state;
mod strategy;

pub use exponential::{ExponentialBackoff, ExponentialBackoffBuilder, RetryPredicate};
pub use state::RetryState;
pub use strategy::BackoffStrategy;
