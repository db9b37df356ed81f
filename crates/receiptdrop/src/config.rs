//! Configuration for the upload client

use receiptdrop_core::retry::ExponentialBackoff;
use receiptdrop_transport::HttpTransportConfig;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::error::{Error, Result};
use crate::types::DEFAULT_MAX_PAYLOAD_BYTES;

/// Default server address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Path of the upload endpoint.
pub const DEFAULT_UPLOAD_PATH: &str = "/upload";

/// Which failed attempts are retried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetryOn {
    /// Retry every failure: timeouts, any non-success status, malformed bodies.
    #[default]
    Any,
    /// Retry only failures that may resolve on their own; fail fast on
    /// permanent ones such as 400/401/404.
    Transient,
}

impl fmt::Display for RetryOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryOn::Any => f.write_str("any"),
            RetryOn::Transient => f.write_str("transient"),
        }
    }
}

impl FromStr for RetryOn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" | "all" => Ok(RetryOn::Any),
            "transient" => Ok(RetryOn::Transient),
            other => Err(Error::Config(format!(
                "retry mode must be 'any' or 'transient', got '{other}'"
            ))),
        }
    }
}

/// Configuration for the upload client.
#[derive(Debug, Clone)]
pub struct UploaderConfig {
    /// Server origin, e.g. `http://localhost:5000`; must not carry a path
    pub base_url: String,

    /// Path of the upload endpoint
    pub upload_path: String,

    /// Time allowed for each attempt before it is cancelled
    pub attempt_timeout: Duration,

    /// Time allowed to establish a connection
    pub connect_timeout: Duration,

    /// Retries after the first attempt
    pub max_retries: u32,

    /// Wait before the first retry; doubled for each later one
    pub base_delay: Duration,

    /// Ceiling on any single wait
    pub max_delay: Duration,

    /// Which failures are retried
    pub retry_on: RetryOn,

    /// Largest payload accepted before any attempt is made
    pub max_payload_bytes: usize,

    /// Session cookie proving the user is logged in
    pub session_cookie: Option<SecretString>,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            upload_path: DEFAULT_UPLOAD_PATH.to_string(),
            attempt_timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            max_retries: 1,
            base_delay: Duration::from_millis(2000),
            max_delay: Duration::from_millis(10000),
            retry_on: RetryOn::Any,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            session_cookie: None,
        }
    }
}

impl UploaderConfig {
    /// Create a builder.
    pub fn builder() -> UploaderConfigBuilder {
        UploaderConfigBuilder::default()
    }

    /// Load configuration from environment variables.
    ///
    /// This will look for:
    /// - `RECEIPTDROP_BASE_URL` for the server base URL
    /// - `RECEIPTDROP_TIMEOUT` for the per-attempt timeout (in seconds)
    /// - `RECEIPTDROP_MAX_RETRIES` for retries after the first attempt
    /// - `RECEIPTDROP_RETRY_ON` for the retry mode (`any` or `transient`)
    /// - `RECEIPTDROP_SESSION_COOKIE` for the session cookie
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a variable is set but cannot be parsed.
    #[cfg(feature = "env")]
    pub fn from_env() -> Result<Self> {
        use std::env;

        let mut config = Self::default();

        if let Ok(base_url) = env::var("RECEIPTDROP_BASE_URL") {
            config.base_url = base_url;
        }

        if let Ok(timeout) = env::var("RECEIPTDROP_TIMEOUT") {
            let secs = timeout.trim().parse::<u64>().map_err(|_| {
                Error::Config(format!("RECEIPTDROP_TIMEOUT must be seconds, got '{timeout}'"))
            })?;
            config.attempt_timeout = Duration::from_secs(secs);
        }

        if let Ok(max_retries) = env::var("RECEIPTDROP_MAX_RETRIES") {
            config.max_retries = max_retries.trim().parse::<u32>().map_err(|_| {
                Error::Config(format!(
                    "RECEIPTDROP_MAX_RETRIES must be a non-negative integer, got '{max_retries}'"
                ))
            })?;
        }

        if let Ok(retry_on) = env::var("RECEIPTDROP_RETRY_ON") {
            config.retry_on = retry_on.parse()?;
        }

        if let Ok(cookie) = env::var("RECEIPTDROP_SESSION_COOKIE") {
            config.session_cookie = Some(SecretString::new(cookie.into_boxed_str()));
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can produce a working client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an unparsable URL, a zero timeout, or a
    /// base delay above the ceiling.
    pub fn validate(&self) -> Result<()> {
        self.upload_url()?;
        if self.attempt_timeout.is_zero() {
            return Err(Error::Config("attempt timeout must be non-zero".to_string()));
        }
        if self.base_delay > self.max_delay {
            return Err(Error::Config(format!(
                "base delay {:?} exceeds max delay {:?}",
                self.base_delay, self.max_delay
            )));
        }
        Ok(())
    }

    /// Absolute URL of the upload endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the base URL is not an http(s) origin.
    /// A base URL with a path such as `https://host/app` is rejected, since
    /// the upload path replaces it; use `upload_path` for a prefixed mount.
    pub fn upload_url(&self) -> Result<String> {
        let base = Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("invalid base URL '{}': {e}", self.base_url)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "base URL must be http or https, got '{}'",
                base.scheme()
            )));
        }
        if base.path() != "/" {
            return Err(Error::Config(format!(
                "base URL must be an origin without a path, got '{}'; set the upload path instead",
                self.base_url
            )));
        }
        let url = base
            .join(&self.upload_path)
            .map_err(|e| Error::Config(format!("invalid upload path '{}': {e}", self.upload_path)))?;
        Ok(url.to_string())
    }

    /// Backoff schedule for this configuration.
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff::builder()
            .max_retries(self.max_retries)
            .initial_delay(self.base_delay)
            .max_delay(self.max_delay)
            .multiplier(2.0)
            .jitter(0.0)
            .build()
    }

    /// Transport settings for this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the session cookie is not a valid header value.
    pub fn transport_config(&self) -> Result<HttpTransportConfig> {
        let mut transport = HttpTransportConfig {
            connect_timeout: self.connect_timeout,
            ..Default::default()
        };
        if let Some(cookie) = &self.session_cookie {
            transport = transport
                .with_header("cookie", cookie.expose_secret())
                .map_err(|_| Error::Config("session cookie is not a valid header value".to_string()))?;
        }
        Ok(transport)
    }
}

/// Builder for creating `UploaderConfig` with a fluent API.
#[derive(Debug, Default)]
pub struct UploaderConfigBuilder {
    config: UploaderConfig,
}

impl UploaderConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the server base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Set the upload endpoint path.
    pub fn upload_path(mut self, path: impl Into<String>) -> Self {
        self.config.upload_path = path.into();
        self
    }

    /// Set the per-attempt timeout.
    pub fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.config.attempt_timeout = timeout;
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the number of retries after the first attempt.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Set the wait before the first retry.
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.config.base_delay = delay;
        self
    }

    /// Set the ceiling on any single wait.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.config.max_delay = delay;
        self
    }

    /// Set which failures are retried.
    pub fn retry_on(mut self, retry_on: RetryOn) -> Self {
        self.config.retry_on = retry_on;
        self
    }

    /// Set the largest accepted payload.
    pub fn max_payload_bytes(mut self, limit: usize) -> Self {
        self.config.max_payload_bytes = limit;
        self
    }

    /// Set the session cookie (e.g. `session=...`).
    pub fn session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.config.session_cookie = Some(SecretString::new(cookie.into().into_boxed_str()));
        self
    }

    /// Build the configuration.
    pub fn build(self) -> UploaderConfig {
        self.config
    }
}

/// Load a `.env` file from the current directory or its parents, if present.
///
/// Returns `true` when a file was loaded.
#[cfg(feature = "env")]
pub fn load_dotenv() -> bool {
    dotenvy::dotenv().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use receiptdrop_core::retry::BackoffStrategy;
    use rstest::rstest;

    #[test]
    fn test_default_config() {
        let config = UploaderConfig::default();
        assert_eq!(config.attempt_timeout, Duration::from_secs(60));
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.base_delay, Duration::from_millis(2000));
        assert_eq!(config.max_delay, Duration::from_millis(10000));
        assert_eq!(config.retry_on, RetryOn::Any);
        assert_eq!(config.max_payload_bytes, 16 * 1024 * 1024);
        assert!(config.session_cookie.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = UploaderConfig::builder()
            .base_url("https://receipts.example.com")
            .attempt_timeout(Duration::from_secs(30))
            .max_retries(3)
            .retry_on(RetryOn::Transient)
            .session_cookie("session=abc")
            .build();

        assert_eq!(config.base_url, "https://receipts.example.com");
        assert_eq!(config.attempt_timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_on, RetryOn::Transient);
        assert_eq!(
            config.session_cookie.as_ref().map(|c| c.expose_secret()),
            Some("session=abc")
        );
    }

    #[test]
    fn test_upload_url() {
        let config = UploaderConfig::builder()
            .base_url("http://127.0.0.1:8080")
            .build();
        assert_eq!(config.upload_url().unwrap(), "http://127.0.0.1:8080/upload");

        let config = UploaderConfig::builder().base_url("ftp://example.com").build();
        assert_matches!(config.upload_url(), Err(Error::Config(_)));

        let config = UploaderConfig::builder().base_url("not a url").build();
        assert_matches!(config.validate(), Err(Error::Config(_)));
    }

    #[rstest]
    #[case("https://host/app")]
    #[case("https://host/app/")]
    #[case("http://127.0.0.1:5000/api/v1")]
    fn test_base_url_with_path_is_rejected(#[case] base_url: &str) {
        let config = UploaderConfig::builder().base_url(base_url).build();
        assert_matches!(config.upload_url(), Err(Error::Config(msg)) if msg.contains("without a path"));
        assert_matches!(config.validate(), Err(Error::Config(_)));
    }

    #[test]
    fn test_prefixed_mount_uses_upload_path() {
        let config = UploaderConfig::builder()
            .base_url("https://host/")
            .upload_path("/app/upload")
            .build();
        assert_eq!(config.upload_url().unwrap(), "https://host/app/upload");
    }

    #[test]
    fn test_validate_rejects_bad_timing() {
        let config = UploaderConfig::builder()
            .attempt_timeout(Duration::ZERO)
            .build();
        assert_matches!(config.validate(), Err(Error::Config(_)));

        let config = UploaderConfig::builder()
            .base_delay(Duration::from_secs(20))
            .build();
        assert_matches!(config.validate(), Err(Error::Config(_)));
    }

    #[test]
    fn test_backoff_matches_config() {
        let backoff = UploaderConfig::default().backoff();
        assert_eq!(backoff.max_retries(), 1);
        assert_eq!(backoff.next_delay(0), Some(Duration::from_millis(2000)));
        assert_eq!(backoff.next_delay(5), Some(Duration::from_millis(10000)));
    }

    #[test]
    fn test_transport_config_carries_cookie() {
        let config = UploaderConfig::builder().session_cookie("session=xyz").build();
        let transport = config.transport_config().unwrap();
        assert!(transport.default_headers.get("cookie").unwrap().is_sensitive());

        let config = UploaderConfig::builder().session_cookie("bad\ncookie").build();
        assert_matches!(config.transport_config(), Err(Error::Config(_)));
    }

    #[test]
    fn test_retry_on_parse() {
        assert_eq!("ANY".parse::<RetryOn>().unwrap(), RetryOn::Any);
        assert_eq!("transient".parse::<RetryOn>().unwrap(), RetryOn::Transient);
        assert_matches!("sometimes".parse::<RetryOn>(), Err(Error::Config(_)));
    }

    #[cfg(feature = "env")]
    #[test]
    fn test_config_from_env_variables() {
        temp_env::with_vars(
            [
                ("RECEIPTDROP_BASE_URL", Some("https://env.example.com")),
                ("RECEIPTDROP_TIMEOUT", Some("120")),
                ("RECEIPTDROP_MAX_RETRIES", Some("4")),
                ("RECEIPTDROP_RETRY_ON", Some("transient")),
                ("RECEIPTDROP_SESSION_COOKIE", Some("session=env")),
            ],
            || {
                let config = UploaderConfig::from_env().expect("config should load");
                assert_eq!(config.base_url, "https://env.example.com");
                assert_eq!(config.attempt_timeout, Duration::from_secs(120));
                assert_eq!(config.max_retries, 4);
                assert_eq!(config.retry_on, RetryOn::Transient);
                assert!(config.session_cookie.is_some());
            },
        );
    }

    #[cfg(feature = "env")]
    #[test]
    fn test_config_from_env_rejects_garbage() {
        temp_env::with_vars(
            [
                ("RECEIPTDROP_BASE_URL", None),
                ("RECEIPTDROP_TIMEOUT", None),
                ("RECEIPTDROP_MAX_RETRIES", Some("-1")),
                ("RECEIPTDROP_RETRY_ON", None),
                ("RECEIPTDROP_SESSION_COOKIE", None),
            ],
            || {
                assert_matches!(UploaderConfig::from_env(), Err(Error::Config(_)));
            },
        );
    }
}
