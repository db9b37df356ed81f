//! # receiptdrop
//!
//! Upload client for receipt images:
//! - Multipart POST of one image plus a processing-mode tag
//! - Per-attempt timeout with cancellation of the in-flight request
//! - Classification of the server's JSON reply
//! - Capped exponential-backoff retries (`RetryOn::Any` or `RetryOn::Transient`)
//! - A submission gate that rejects overlapping uploads
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use receiptdrop::{Submission, Submitter, UploaderConfig, UploadRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = UploaderConfig::builder()
//!         .base_url("http://localhost:5000")
//!         .session_cookie("session=...")
//!         .build();
//!     let submitter = Submitter::new(config)?;
//!
//!     let request = UploadRequest::from_path("receipt.jpg").await?;
//!     match submitter.submit(&request).await? {
//!         Submission::Accepted { location, .. } => println!("see {location}"),
//!         Submission::Rejected { message } => eprintln!("rejected: {message}"),
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// Re-export commonly used types
pub use config::{RetryOn, UploaderConfig, UploaderConfigBuilder};
pub use error::{Error, Result};
pub use guard::{SubmissionGate, SubmissionGuard};
pub use submit::{Submission, Submitter};
pub use types::{ProcessingMethod, Receipt, UploadOutcome, UploadRequest, UploadResponse};
pub use uploader::Uploader;

// Module declarations
pub mod classify;
pub mod config;
pub mod error;
pub mod guard;
pub mod observability;
pub mod submit;
pub mod types;
pub mod uploader;

// Re-export the layers underneath for custom transports and strategies
pub use receiptdrop_core::retry;
pub use receiptdrop_transport as transport;

/// Prelude module for common imports
///
/// # Examples
///
/// ```rust
/// use receiptdrop::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Error, ProcessingMethod, Receipt, Result, RetryOn, Submission, SubmissionGate, Submitter,
        UploadOutcome, UploadRequest, Uploader, UploaderConfig,
    };
}

/// Crate version, automatically updated from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
