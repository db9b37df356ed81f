//! Transport layer for receiptdrop
//!
//! Provides the boundary between the retrying uploader and the network: a
//! trait for "POST this multipart form, give me the raw response", and a
//! reqwest-backed implementation of it.
//!
//! # Architecture
//!
//! - **UploadTransport trait**: one multipart POST per call, cancellable
//! - **HTTP transport**: reqwest client with multipart bodies
//! - **Error handling**: transport-level failures only; status codes and
//!   body decoding are left to the caller

//!
//! # Usage
//!
//! ```ignore
//! use receiptdrop_transport::{HttpTransport, UploadForm, UploadTransport};
//! use tokio_util::sync::CancellationToken;
//!
//! let transport = HttpTransport::new()?;
//! let form = UploadForm::new("file", "receipt.jpg", "image/jpeg", bytes)
//!     .with_text("processing_method", "combined");
//! let response = transport
//!     .send("http://localhost:5000/upload", &form, CancellationToken::new())
//!     .await?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod form;
pub mod http;
pub mod traits;

// Re-export commonly used types
pub use error::{Result, TransportError};
pub use form::{FilePart, UploadForm};
pub use http::{HttpTransport, HttpTransportConfig};
pub use tokio_util::sync::CancellationToken;
pub use traits::{HttpResponse, UploadTransport};
