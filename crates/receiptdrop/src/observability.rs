//! Structured logging for uploads
//!
//! Every attempt and its result go through this layer so the fields stay
//! consistent across the uploader and the submitter.

use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::types::UploadOutcome;

/// What is being uploaded, for log fields.
#[derive(Debug, Clone)]
pub struct UploadMetadata {
    /// Endpoint URL
    pub url: String,
    /// Name of the uploaded file
    pub filename: String,
    /// Payload size in bytes
    pub size: usize,
}

impl UploadMetadata {
    /// Create new upload metadata
    pub fn new(url: impl Into<String>, filename: impl Into<String>, size: usize) -> Self {
        Self {
            url: url.into(),
            filename: filename.into(),
            size,
        }
    }

    /// Log an attempt being sent
    pub fn log_attempt(&self, attempt: u32, total_attempts: u32) {
        info!(
            url = %self.url,
            filename = %self.filename,
            size = self.size,
            attempt = attempt + 1,
            total_attempts,
            "Uploading receipt"
        );
    }

    /// Log a completed upload
    pub fn log_outcome(&self, outcome: &UploadOutcome, attempts: u32, elapsed: Duration) {
        match outcome {
            UploadOutcome::Success(receipt) => info!(
                url = %self.url,
                receipt_id = %receipt.receipt_id,
                attempts,
                elapsed_ms = elapsed.as_millis(),
                "Receipt uploaded"
            ),
            UploadOutcome::Failure { message } => warn!(
                url = %self.url,
                error = %message,
                attempts,
                elapsed_ms = elapsed.as_millis(),
                "Server reported processing failure"
            ),
        }
    }

    /// Log the final failure after every attempt is spent
    pub fn log_exhausted(&self, error: &str, attempts: u32, elapsed: Duration) {
        warn!(
            url = %self.url,
            error = %error,
            attempts,
            elapsed_ms = elapsed.as_millis(),
            "Upload failed"
        );
    }
}

/// Log a single failed attempt
pub fn log_attempt_failed(attempt: u32, elapsed: Duration, error: &str) {
    debug!(
        attempt = attempt + 1,
        elapsed_ms = elapsed.as_millis(),
        error = %error,
        "Upload attempt failed"
    );
}

/// Log a request rejected before any attempt
pub fn log_validation_error(filename: &str, reason: &str) {
    debug!(
        filename = %filename,
        reason = %reason,
        "Upload validation failed"
    );
}

/// Timer for measuring upload duration
///
/// Runs on the tokio clock so paused-time tests see virtual durations.
pub struct UploadTimer {
    start: Instant,
}

impl UploadTimer {
    /// Start a new timer
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
