//! Transport trait and response type
//!
//! Defines the `UploadTransport` trait implemented by the HTTP client and by
//! test doubles.

use crate::error::Result;
use crate::form::UploadForm;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

/// HTTP response
///
/// Status, headers and the fully buffered body of one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,

    /// Response headers
    pub headers: HashMap<String, String>,

    /// Response body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a new HTTP response
    pub fn new(status: u16, headers: HashMap<String, String>, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Response with no headers, handy for test doubles
    pub fn from_body(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status, HashMap::new(), body.into())
    }

    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, replacing invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse response body as JSON
    ///
    /// # Errors
    ///
    /// Returns an error if the response body cannot be parsed as valid JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Get a header value by name (case-insensitive)
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Sends one multipart upload and returns the raw response.
///
/// Implementations must stop work promptly once `cancel` fires and return
/// [`TransportError::Cancelled`](crate::TransportError::Cancelled). A
/// non-2xx status is a successful delivery and is returned as `Ok`.
#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// POST `form` to `url`
    async fn send(
        &self,
        url: &str,
        form: &UploadForm,
        cancel: CancellationToken,
    ) -> Result<HttpResponse>;
}

#[async_trait]
impl<T: UploadTransport + ?Sized> UploadTransport for std::sync::Arc<T> {
    async fn send(
        &self,
        url: &str,
        form: &UploadForm,
        cancel: CancellationToken,
    ) -> Result<HttpResponse> {
        (**self).send(url, form, cancel).await
    }
}
