//! HTTP transport implementation
//!
//! Provides a reqwest-based client implementing [`UploadTransport`](crate::UploadTransport).
//! Retries live one layer up; this client makes exactly one exchange per call.

pub mod client;

pub use client::{HttpTransport, HttpTransportConfig};
