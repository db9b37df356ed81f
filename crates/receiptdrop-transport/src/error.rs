//! Transport error types

use thiserror::Error;

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors that can occur while delivering a request.
///
/// Non-success status codes are not errors at this layer: they arrive as an
/// [`HttpResponse`](crate::HttpResponse) for the caller to classify.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Could not reach the server (DNS, refused, reset)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Request was sent but the exchange failed mid-way
    #[error("HTTP error: {0}")]
    Http(String),

    /// The HTTP client's own timeout fired
    #[error("Timeout")]
    Timeout,

    /// The caller cancelled the request
    #[error("Request cancelled")]
    Cancelled,

    /// Invalid request description (bad URL, bad header, bad MIME type)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Response body was not the expected JSON
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else if err.is_builder() {
            Self::InvalidRequest(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
