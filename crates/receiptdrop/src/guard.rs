//! Gate that allows one submission at a time.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Result};

/// Shared "submission in progress" flag.
///
/// Clones share the same flag. Holding a [`SubmissionGuard`] marks the gate
/// busy; dropping it clears the flag on every exit path, including `?`
/// returns and panics.
#[derive(Debug, Clone, Default)]
pub struct SubmissionGate {
    busy: Arc<AtomicBool>,
}

impl SubmissionGate {
    /// Create an idle gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the gate busy for as long as the returned guard lives.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SubmissionInProgress`] if a guard is already held.
    pub fn try_acquire(&self) -> Result<SubmissionGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::SubmissionInProgress)?;
        Ok(SubmissionGuard {
            busy: Arc::clone(&self.busy),
        })
    }

    /// Whether a submission currently holds the gate.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Clears the gate when dropped.
#[derive(Debug)]
#[must_use = "the gate is released as soon as the guard is dropped"]
pub struct SubmissionGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for SubmissionGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
