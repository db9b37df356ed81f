//! Multipart form description.
//!
//! The form is kept as plain data so one description can be turned into a
//! fresh `reqwest::multipart::Form` for every attempt (reqwest forms are
//! consumed by `send`).

use bytes::Bytes;

/// The single file part of an upload form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Form field name, e.g. `file`
    pub field: String,
    /// Filename reported to the server
    pub filename: String,
    /// MIME type of the content
    pub content_type: String,
    /// Raw content; cloning is cheap
    pub content: Bytes,
}

/// A multipart upload: one file part plus text fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadForm {
    /// The file being uploaded
    pub file: FilePart,
    /// Additional text fields, sent in order
    pub fields: Vec<(String, String)>,
}

impl UploadForm {
    /// Create a form with a single file part and no text fields
    pub fn new(
        field: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        Self {
            file: FilePart {
                field: field.into(),
                filename: filename.into(),
                content_type: content_type.into(),
                content: content.into(),
            },
            fields: Vec::new(),
        }
    }

    /// Add a text field
    pub fn with_text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Size of the file part in bytes
    pub fn content_len(&self) -> usize {
        self.file.content.len()
    }

    /// Build a reqwest multipart form from this description.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidRequest`](crate::TransportError::InvalidRequest)
    /// if the content type is not a valid MIME type.
    pub fn to_multipart(&self) -> crate::Result<reqwest::multipart::Form> {
        let part = reqwest::multipart::Part::bytes(self.file.content.to_vec())
            .file_name(self.file.filename.clone())
            .mime_str(&self.file.content_type)
            .map_err(|e| crate::TransportError::InvalidRequest(e.to_string()))?;

        let form = self
            .fields
            .iter()
            .fold(reqwest::multipart::Form::new(), |form, (name, value)| {
                form.text(name.clone(), value.clone())
            })
            .part(self.file.field.clone(), part);

        Ok(form)
    }
}
