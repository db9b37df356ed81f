//! One-shot receipt submission
//!
//! [`Submitter`] is what a form handler calls: it refuses overlapping
//! submissions, uploads with the configured retry budget, and tells the
//! caller where to go next.

use receiptdrop_transport::{HttpTransport, UploadTransport};
use tracing::info;

use crate::config::UploaderConfig;
use crate::error::Result;
use crate::guard::SubmissionGate;
use crate::types::{Receipt, UploadOutcome, UploadRequest};
use crate::uploader::Uploader;

/// Result of a submission the server answered.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// The receipt was stored.
    Accepted {
        /// The stored receipt
        receipt: Receipt,
        /// Path of the receipt's page, `/receipt/{receipt_id}`
        location: String,
    },
    /// The server could not process the receipt.
    Rejected {
        /// Server-provided reason
        message: String,
    },
}

impl From<UploadOutcome> for Submission {
    fn from(outcome: UploadOutcome) -> Self {
        match outcome {
            UploadOutcome::Success(receipt) => Submission::Accepted {
                location: receipt.location(),
                receipt,
            },
            UploadOutcome::Failure { message } => Submission::Rejected { message },
        }
    }
}

/// Submits receipts one at a time.
#[derive(Debug, Clone)]
pub struct Submitter<T: UploadTransport = HttpTransport> {
    uploader: Uploader<T>,
    gate: SubmissionGate,
}

impl Submitter<HttpTransport> {
    /// Create a submitter that talks HTTP.
    ///
    /// # Errors
    ///
    /// See [`Uploader::new`].
    pub fn new(config: UploaderConfig) -> Result<Self> {
        Ok(Self::with_uploader(Uploader::new(config)?))
    }
}

impl<T: UploadTransport> Submitter<T> {
    /// Wrap an existing uploader with a fresh gate.
    pub fn with_uploader(uploader: Uploader<T>) -> Self {
        Self {
            uploader,
            gate: SubmissionGate::new(),
        }
    }

    /// Share `gate` with other submitters.
    #[must_use]
    pub fn with_gate(mut self, gate: SubmissionGate) -> Self {
        self.gate = gate;
        self
    }

    /// The gate this submitter holds while uploading.
    pub fn gate(&self) -> &SubmissionGate {
        &self.gate
    }

    /// The wrapped uploader.
    pub fn uploader(&self) -> &Uploader<T> {
        &self.uploader
    }

    /// Submit a receipt.
    ///
    /// Makes up to `max_retries + 1` attempts, using the configured
    /// `max_retries`. The gate is held for the whole call and released
    /// however it ends.
    ///
    /// # Errors
    ///
    /// - [`Error::SubmissionInProgress`](crate::Error::SubmissionInProgress)
    ///   if another submission holds the gate
    /// - Validation errors, before any attempt
    /// - The final attempt's error; its message is suitable for display
    pub async fn submit(&self, request: &UploadRequest) -> Result<Submission> {
        let _guard = self.gate.try_acquire()?;

        let max_retries = self.uploader.config().max_retries;
        let submission = Submission::from(self.uploader.upload(request, max_retries).await?);

        if let Submission::Accepted { location, .. } = &submission {
            info!(location = %location, "Receipt accepted");
        }
        Ok(submission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn receipt(id: &str) -> Receipt {
        Receipt {
            receipt_id: id.to_string(),
            db_integration: Some(false),
            transaction_id: None,
            client_id: None,
            storage_type: Some("local".to_string()),
        }
    }

    #[test]
    fn test_success_maps_to_location() {
        let submission = Submission::from(UploadOutcome::Success(receipt("R42")));
        assert_eq!(
            submission,
            Submission::Accepted {
                receipt: receipt("R42"),
                location: "/receipt/R42".to_string(),
            }
        );
    }

    #[test]
    fn test_failure_maps_to_rejected() {
        let submission = Submission::from(UploadOutcome::Failure {
            message: "OCR failed".to_string(),
        });
        assert_eq!(
            submission,
            Submission::Rejected {
                message: "OCR failed".to_string()
            }
        );
    }

    #[test]
    fn test_submitters_can_share_a_gate() {
        let gate = SubmissionGate::new();
        let submitter = Submitter::new(UploaderConfig::default())
            .unwrap()
            .with_gate(gate.clone());

        let _held = gate.try_acquire().unwrap();
        assert!(submitter.gate().is_busy());
    }
}
