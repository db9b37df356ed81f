//! Error types for receipt uploads
//!
//! Every way an upload can fail, from pre-flight validation through the last
//! network attempt, is one variant of [`Error`]. Retry decisions are made on
//! this type via [`Error::is_transient`].

use receiptdrop_transport::TransportError;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for upload operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for receipt uploads.
#[derive(Debug, Error)]
pub enum Error {
    /// The attempt did not produce a response within the per-attempt timeout.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The server answered with a non-success status code.
    #[error("HTTP error {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, verbatim
        body: String,
    },

    /// The server could not be reached.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A success status carried a body that is not a valid upload response.
    #[error("Invalid server response: {0}")]
    Protocol(String),

    /// No file content was provided.
    #[error("No file selected: select a file or take a photo first")]
    EmptyPayload,

    /// The file is not an image.
    #[error("Unsupported file type '{0}': please upload an image")]
    UnsupportedMediaType(String),

    /// The file exceeds the server's upload limit.
    #[error("File is {size} bytes, over the {limit} byte upload limit")]
    PayloadTooLarge {
        /// Payload size in bytes
        size: usize,
        /// Configured limit in bytes
        limit: usize,
    },

    /// The request is malformed in some other way.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Another submission holds the gate.
    #[error("An upload is already in progress")]
    SubmissionInProgress,

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error (e.g. reading the file to upload).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other transport failure.
    #[error(transparent)]
    Transport(TransportError),
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Connection(msg) => Error::Connection(msg),
            TransportError::InvalidRequest(msg) => Error::InvalidRequest(msg),
            TransportError::Io(e) => Error::Io(e),
            other => Error::Transport(other),
        }
    }
}

impl Error {
    /// Whether another attempt could plausibly succeed.
    ///
    /// Timeouts, connection failures, 5xx, 408, 429 and malformed responses
    /// are transient. Other 4xx statuses and every pre-flight error are
    /// permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Timeout(_) | Error::Connection(_) | Error::Protocol(_) => true,
            Error::Status { status, .. } => *status >= 500 || *status == 408 || *status == 429,
            Error::Transport(e) => !matches!(e, TransportError::InvalidRequest(_)),
            _ => false,
        }
    }

    /// Whether this error was raised before any network attempt.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::EmptyPayload
                | Error::UnsupportedMediaType(_)
                | Error::PayloadTooLarge { .. }
                | Error::InvalidRequest(_)
        )
    }

    /// HTTP status code, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
