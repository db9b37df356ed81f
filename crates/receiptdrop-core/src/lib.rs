#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Core retry primitives for the receiptdrop crates.
//!
//! The upload client and any other network-facing code share one retry
//! abstraction:
//!
//! - **`BackoffStrategy`**: bounded retry loop with a pluggable delay
//!   schedule and retry predicate
//! - **`ExponentialBackoff`**: `min(initial * multiplier^n, max)` delays,
//!   optional jitter
//! - **`RetryState`**: per-call attempt bookkeeping handed to every attempt
//!
//! # Examples
//!
//! ```rust
//! use receiptdrop_core::prelude::*;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backoff = ExponentialBackoff::builder()
//!     .max_retries(1)
//!     .initial_delay(Duration::from_millis(2000))
//!     .max_delay(Duration::from_secs(10))
//!     .build();
//!
//! let result = backoff.execute(|_state| async {
//!     Ok::<_, std::io::Error>(42)
//! }).await?;
//! # Ok(())
//! # }
//! ```

pub mod retry;

/// Convenient re-exports of commonly used items.
///
/// ```rust
/// use receiptdrop_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::retry::{
        BackoffStrategy, ExponentialBackoff, ExponentialBackoffBuilder, RetryState,
    };
}
