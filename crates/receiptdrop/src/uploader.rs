//! Retrying receipt uploader

use std::sync::atomic::{AtomicU32, Ordering};

use receiptdrop_core::retry::{BackoffStrategy, ExponentialBackoff};
use receiptdrop_transport::{CancellationToken, HttpTransport, UploadForm, UploadTransport};

use crate::classify::classify_response;
use crate::config::{RetryOn, UploaderConfig};
use crate::error::{Error, Result};
use crate::observability::{self, UploadMetadata, UploadTimer};
use crate::types::{UploadOutcome, UploadRequest};

/// Uploads receipt images, retrying failed attempts with capped exponential
/// backoff.
///
/// Each attempt is one multipart POST under its own timeout. A response the
/// server meant (a processed receipt, or a reported processing failure) ends
/// the call; anything else is a failed attempt.
///
/// # Examples
///
/// ```rust,no_run
/// use receiptdrop::{Uploader, UploaderConfig, UploadRequest};
///
/// # async fn example() -> receiptdrop::Result<()> {
/// let uploader = Uploader::new(UploaderConfig::default())?;
/// let request = UploadRequest::from_path("receipt.jpg").await?;
///
/// let outcome = uploader.upload(&request, 1).await?;
/// if let Some(id) = outcome.receipt_id() {
///     println!("stored as {id}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Uploader<T: UploadTransport = HttpTransport> {
    config: UploaderConfig,
    upload_url: String,
    transport: T,
}

impl Uploader<HttpTransport> {
    /// Create an uploader that talks HTTP.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an invalid configuration, or a transport
    /// error if the HTTP client cannot be built.
    pub fn new(config: UploaderConfig) -> Result<Self> {
        let transport = HttpTransport::with_config(config.transport_config()?)?;
        Self::with_transport(config, transport)
    }

    /// Create an uploader configured from the environment.
    ///
    /// See [`UploaderConfig::from_env`].
    #[cfg(feature = "env")]
    pub fn from_env() -> Result<Self> {
        Self::new(UploaderConfig::from_env()?)
    }
}

impl<T: UploadTransport> Uploader<T> {
    /// Create an uploader over a custom transport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an invalid configuration.
    pub fn with_transport(config: UploaderConfig, transport: T) -> Result<Self> {
        config.validate()?;
        let upload_url = config.upload_url()?;
        Ok(Self {
            config,
            upload_url,
            transport,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &UploaderConfig {
        &self.config
    }

    /// Absolute URL every attempt is sent to.
    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    /// Underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Upload a receipt, making at most `max_retries + 1` attempts.
    ///
    /// Returns `Ok` as soon as one attempt yields a classified outcome,
    /// which includes a failure the server reports with a reason. Failed
    /// attempts wait `min(base_delay * 2^attempt, max_delay)` before the next
    /// one.
    ///
    /// # Errors
    ///
    /// - A validation error, before any attempt is made
    /// - The last attempt's error once every attempt has failed
    /// - Under [`RetryOn::Transient`], the first permanent error
    pub async fn upload(&self, request: &UploadRequest, max_retries: u32) -> Result<UploadOutcome> {
        if let Err(err) = request.validate(self.config.max_payload_bytes) {
            observability::log_validation_error(request.filename(), &err.to_string());
            return Err(err);
        }

        let form = request.to_form();
        let meta = UploadMetadata::new(&self.upload_url, request.filename(), request.content().len());
        let timer = UploadTimer::start();
        let attempts = AtomicU32::new(0);

        let result = {
            let (form, meta, attempts) = (&form, &meta, &attempts);
            self.backoff(max_retries)
                .execute(|state| async move {
                    attempts.store(state.attempt.saturating_add(1), Ordering::Relaxed);
                    meta.log_attempt(state.attempt, state.total_attempts());

                    let started = UploadTimer::start();
                    let result = self.attempt(form).await;
                    if let Err(err) = &result {
                        observability::log_attempt_failed(
                            state.attempt,
                            started.elapsed(),
                            &err.to_string(),
                        );
                    }
                    result
                })
                .await
        };

        let attempts = attempts.load(Ordering::Relaxed);
        match &result {
            Ok(outcome) => meta.log_outcome(outcome, attempts, timer.elapsed()),
            Err(err) => meta.log_exhausted(&err.to_string(), attempts, timer.elapsed()),
        }
        result
    }

    /// One request under the per-attempt timeout.
    async fn attempt(&self, form: &UploadForm) -> Result<UploadOutcome> {
        let timeout = self.config.attempt_timeout;
        let cancel = CancellationToken::new();

        let sent = tokio::time::timeout(
            timeout,
            self.transport.send(&self.upload_url, form, cancel.clone()),
        )
        .await;

        match sent {
            Ok(response) => classify_response(&response?),
            Err(_elapsed) => {
                cancel.cancel();
                Err(Error::Timeout(timeout))
            }
        }
    }

    fn backoff(&self, max_retries: u32) -> ExponentialBackoff {
        let backoff = self.config.backoff().with_max_retries(max_retries);
        match self.config.retry_on {
            RetryOn::Any => backoff,
            RetryOn::Transient => backoff.with_predicate(|err, _attempt| {
                err.downcast_ref::<Error>().is_none_or(Error::is_transient)
            }),
        }
    }
}
