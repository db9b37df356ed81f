//! HTTP transport client implementation
//!
//! Implements `UploadTransport` on top of a pooled reqwest client. Each call
//! performs a single multipart POST and races it against the caller's
//! cancellation token.

use crate::error::{Result, TransportError};
use crate::form::UploadForm;
use crate::traits::{HttpResponse, UploadTransport};
use async_trait::async_trait;
use http::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client as ReqwestClient;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// HTTP transport implementation
///
/// Handles:
/// - Multipart request construction
/// - Connection pooling
/// - Connect timeout
/// - Cooperative cancellation of the in-flight request
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Arc<ReqwestClient>,
}

impl HttpTransport {
    /// Create a new HTTP transport with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpTransportConfig::default())
    }

    /// Create a new HTTP transport with custom configuration
    pub fn with_config(config: HttpTransportConfig) -> Result<Self> {
        let client = ReqwestClient::builder()
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .default_headers(config.default_headers)
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| TransportError::InvalidRequest(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    async fn exchange(&self, url: &str, form: &UploadForm) -> Result<HttpResponse> {
        let multipart = form.to_multipart()?;

        debug!(
            url = %url,
            filename = %form.file.filename,
            body_size = form.content_len(),
            "Sending multipart upload"
        );

        let response = self.client.post(url).multipart(multipart).send().await?;

        let status = response.status().as_u16();
        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(key.to_string(), v.to_string());
            }
        }

        let body = response.bytes().await?.to_vec();

        debug!(status, body_size = body.len(), "Received upload response");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl UploadTransport for HttpTransport {
    async fn send(
        &self,
        url: &str,
        form: &UploadForm,
        cancel: CancellationToken,
    ) -> Result<HttpResponse> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(url = %url, "Upload cancelled");
                Err(TransportError::Cancelled)
            }
            result = self.exchange(url, form) => result,
        }
    }
}

/// HTTP transport configuration
#[derive(Clone, Debug)]
pub struct HttpTransportConfig {
    /// Connection timeout
    pub connect_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Headers sent with every request (e.g. a session cookie)
    pub default_headers: HeaderMap,

    /// User-Agent header value
    pub user_agent: String,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            pool_max_idle_per_host: 2,
            default_headers: HeaderMap::new(),
            user_agent: format!("receiptdrop/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpTransportConfig {
    /// Add a header sent with every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let name: HeaderName = name
            .parse()
            .map_err(|_| TransportError::InvalidRequest(format!("header name {name:?}")))?;
        let mut value: HeaderValue = value.parse().map_err(|_| {
            TransportError::InvalidRequest(format!("header value for {}", name.as_str()))
        })?;
        if name == http::header::COOKIE || name == http::header::AUTHORIZATION {
            value.set_sensitive(true);
        }
        self.default_headers.insert(name, value);
        Ok(self)
    }
}
