//! Request and response types for the upload endpoint.

use bytes::Bytes;
use receiptdrop_transport::UploadForm;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Multipart field carrying the image.
pub const FILE_FIELD: &str = "file";

/// Multipart field carrying the processing-mode tag.
pub const PROCESSING_METHOD_FIELD: &str = "processing_method";

/// Server-side upload limit (16 MiB).
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 16 * 1024 * 1024;

/// How the server should extract text from the receipt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMethod {
    /// Run every extractor and merge the results
    #[default]
    Combined,
    /// Hosted receipt-OCR service only
    Veryfi,
    /// Local Tesseract OCR only
    Tesseract,
}

impl ProcessingMethod {
    /// Wire value of the tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingMethod::Combined => "combined",
            ProcessingMethod::Veryfi => "veryfi",
            ProcessingMethod::Tesseract => "tesseract",
        }
    }
}

impl fmt::Display for ProcessingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessingMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "combined" => Ok(ProcessingMethod::Combined),
            "veryfi" => Ok(ProcessingMethod::Veryfi),
            "tesseract" => Ok(ProcessingMethod::Tesseract),
            other => Err(Error::InvalidRequest(format!(
                "unknown processing method '{other}'"
            ))),
        }
    }
}

/// An image to upload plus its form fields.
///
/// The uploader treats the content as opaque and never modifies it. Content
/// is held in [`Bytes`], so cloning a request does not copy the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    content: Bytes,
    filename: String,
    content_type: String,
    fields: Vec<(String, String)>,
}

impl UploadRequest {
    /// Create a request tagged with the default processing method.
    pub fn new(
        content: impl Into<Bytes>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            filename: filename.into(),
            content_type: content_type.into(),
            fields: vec![(
                PROCESSING_METHOD_FIELD.to_string(),
                ProcessingMethod::default().as_str().to_string(),
            )],
        }
    }

    /// Create a request whose content type is inferred from `filename`.
    ///
    /// Unknown extensions get `application/octet-stream`, which
    /// [`validate`](Self::validate) then rejects.
    pub fn image(content: impl Into<Bytes>, filename: impl Into<String>) -> Self {
        let filename = filename.into();
        let content_type = image_content_type(&filename).unwrap_or("application/octet-stream");
        Self::new(content, filename, content_type)
    }

    /// Read a file from disk into a request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and
    /// [`Error::InvalidRequest`] if the path has no file name.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::InvalidRequest(format!("no file name in {}", path.display())))?
            .to_string();
        let content = tokio::fs::read(path).await?;
        Ok(Self::image(content, filename))
    }

    /// Replace the processing-mode tag.
    pub fn with_processing_method(self, method: ProcessingMethod) -> Self {
        self.with_field(PROCESSING_METHOD_FIELD, method.as_str())
    }

    /// Set a form field, replacing any existing field of the same name.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(field) => field.1 = value,
            None => self.fields.push((name, value)),
        }
        self
    }

    /// Raw content.
    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// Filename sent to the server.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// MIME type of the content.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Value of a form field.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Check the request before spending an attempt on it.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyPayload`] when there is no content
    /// - [`Error::InvalidRequest`] when the filename is blank
    /// - [`Error::UnsupportedMediaType`] when the content type is not `image/*`
    /// - [`Error::PayloadTooLarge`] when the content exceeds `max_bytes`
    pub fn validate(&self, max_bytes: usize) -> Result<()> {
        if self.content.is_empty() {
            return Err(Error::EmptyPayload);
        }
        if self.filename.trim().is_empty() {
            return Err(Error::InvalidRequest("filename is empty".to_string()));
        }
        if !self.content_type.starts_with("image/") {
            return Err(Error::UnsupportedMediaType(self.content_type.clone()));
        }
        if self.content.len() > max_bytes {
            return Err(Error::PayloadTooLarge {
                size: self.content.len(),
                limit: max_bytes,
            });
        }
        Ok(())
    }

    /// Multipart description sent on every attempt.
    pub fn to_form(&self) -> UploadForm {
        self.fields.iter().fold(
            UploadForm::new(
                FILE_FIELD,
                self.filename.clone(),
                self.content_type.clone(),
                self.content.clone(),
            ),
            |form, (name, value)| form.with_text(name.clone(), value.clone()),
        )
    }
}

/// Infer an image MIME type from a file name's extension.
pub fn image_content_type(filename: &str) -> Option<&'static str> {
    let extension = Path::new(filename).extension()?.to_str()?.to_ascii_lowercase();
    let content_type = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",
        _ => return None,
    };
    Some(content_type)
}

/// JSON body returned by the upload endpoint.
///
/// `success`, `receipt_id` and `error` must have their documented types. The
/// extras are informational: a value of the wrong type reads as absent rather
/// than failing the whole reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Whether the server processed the receipt
    pub success: bool,

    /// Identifier of the stored receipt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_id: Option<String>,

    /// Failure detail when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Whether the receipt was linked to a loyalty account
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub db_integration: Option<bool>,

    /// Loyalty transaction created for the receipt
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub transaction_id: Option<i64>,

    /// Loyalty client the receipt was linked to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<serde_json::Value>,

    /// Where the server stored the image
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub storage_type: Option<String>,
}

/// Decode an optional field, treating a value of the wrong type as missing.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// A successfully processed receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    /// Identifier of the stored receipt
    pub receipt_id: String,
    /// Whether the receipt was linked to a loyalty account
    pub db_integration: Option<bool>,
    /// Loyalty transaction created for the receipt
    pub transaction_id: Option<i64>,
    /// Loyalty client the receipt was linked to
    pub client_id: Option<serde_json::Value>,
    /// Where the server stored the image
    pub storage_type: Option<String>,
}

impl Receipt {
    /// Path of the receipt's detail page on the server.
    pub fn location(&self) -> String {
        format!("/receipt/{}", self.receipt_id)
    }
}

/// Result of one upload call, returned exactly once.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    /// The server processed the receipt.
    Success(Receipt),
    /// The server answered definitively that processing failed.
    Failure {
        /// Server-provided reason
        message: String,
    },
}

impl UploadOutcome {
    /// Whether the upload succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Success(_))
    }

    /// The receipt, on success.
    pub fn receipt(&self) -> Option<&Receipt> {
        match self {
            UploadOutcome::Success(receipt) => Some(receipt),
            UploadOutcome::Failure { .. } => None,
        }
    }

    /// Identifier of the stored receipt, on success.
    pub fn receipt_id(&self) -> Option<&str> {
        self.receipt().map(|r| r.receipt_id.as_str())
    }
}
