//! Common test utilities and helpers

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use receiptdrop::transport::{
    CancellationToken, HttpResponse, TransportError, UploadForm, UploadTransport,
};
use receiptdrop::{UploadRequest, Uploader, UploaderConfig};
use tokio::time::Instant;

/// What the scripted server does for one attempt.
#[allow(dead_code)]
#[derive(Debug)]
pub enum Step {
    /// Answer with a status and body.
    Respond(u16, String),
    /// Never answer; the attempt only ends by timeout.
    Hang,
    /// Fail to deliver.
    Fail(TransportError),
}

#[allow(dead_code)]
impl Step {
    pub fn ok(body: &str) -> Self {
        Step::Respond(200, body.to_string())
    }

    pub fn status(status: u16, body: &str) -> Self {
        Step::Respond(status, body.to_string())
    }

    pub fn receipt(id: &str) -> Self {
        Step::ok(&format!(r#"{{"success": true, "receipt_id": "{id}"}}"#))
    }
}

/// Record of one call the uploader made.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Call {
    /// Time since the transport was created
    pub at: Duration,
    pub url: String,
    pub form: UploadForm,
    pub cancel: CancellationToken,
}

/// Transport that replays a script and records every call.
///
/// Once the script runs out every further call fails with a connection
/// error.
#[derive(Debug)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<Call>>,
    started: Instant,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new(script: impl IntoIterator<Item = Step>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
            started: Instant::now(),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Start offsets of every attempt, in milliseconds.
    pub fn call_times_ms(&self) -> Vec<u128> {
        self.calls().iter().map(|c| c.at.as_millis()).collect()
    }
}

#[async_trait]
impl UploadTransport for ScriptedTransport {
    async fn send(
        &self,
        url: &str,
        form: &UploadForm,
        cancel: CancellationToken,
    ) -> receiptdrop::transport::Result<HttpResponse> {
        self.calls.lock().unwrap().push(Call {
            at: self.started.elapsed(),
            url: url.to_string(),
            form: form.clone(),
            cancel: cancel.clone(),
        });

        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(Step::Respond(status, body)) => Ok(HttpResponse::from_body(status, body)),
            Some(Step::Hang) => {
                cancel.cancelled().await;
                Err(TransportError::Cancelled)
            }
            Some(Step::Fail(err)) => Err(err),
            None => Err(TransportError::Connection("script exhausted".into())),
        }
    }
}

/// Uploader over a script, with default timing.
#[allow(dead_code)]
pub fn scripted_uploader(script: impl IntoIterator<Item = Step>) -> Uploader<ScriptedTransport> {
    scripted_uploader_with(UploaderConfig::default(), script)
}

/// Uploader over a script, with custom configuration.
#[allow(dead_code)]
pub fn scripted_uploader_with(
    config: UploaderConfig,
    script: impl IntoIterator<Item = Step>,
) -> Uploader<ScriptedTransport> {
    Uploader::with_transport(config, ScriptedTransport::new(script))
        .expect("Failed to build uploader")
}

/// A small JPEG-tagged request.
#[allow(dead_code)]
pub fn receipt_image() -> UploadRequest {
    UploadRequest::image(b"fake-jpeg-bytes".to_vec(), "receipt.jpg")
}

/// Install a test subscriber so `RUST_LOG` shows upload logs.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
