//! Multipart form decoding.
//!
//! Drains an axum [`Multipart`] body into named text fields and named file
//! attachments. File contents are buffered in memory and live only as long
//! as the request that carried them.

use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartError};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The request could not be read as multipart at all (wrong content type, missing boundary).
    #[error("invalid multipart request: {0}")]
    Rejected(String),
    #[error("failed to read multipart field: {0}")]
    Field(#[from] MultipartError),
}

/// A file attachment taken from a multipart part that carried a filename.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Decoded multipart form: text fields and file attachments, both keyed by field name.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, Vec<String>>,
    files: HashMap<String, Vec<UploadedFile>>,
}

impl UploadForm {
    /// First value of a text field.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// First file attached under a field.
    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name).and_then(|files| files.first())
    }

    /// All files attached under a field.
    pub fn files(&self, name: &str) -> &[UploadedFile] {
        self.files.get(name).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Read every part of a multipart body.
///
/// Parts with a filename become [`UploadedFile`]s, all other named parts are
/// read as text. Unnamed parts are skipped, and so is an empty file input
/// (empty filename and no content), which is what browsers send when no file
/// was chosen.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<UploadForm, UploadError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match field.file_name().map(str::to_string) {
            Some(filename) => {
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await?;

                if filename.is_empty() && data.is_empty() {
                    debug!("Skipping empty file input '{}'", name);
                    continue;
                }

                debug!("Upload: file '{}' in field '{}' ({} bytes)", filename, name, data.len());
                form.files.entry(name).or_default().push(UploadedFile {
                    filename,
                    content_type,
                    data,
                });
            }
            None => {
                let value = field.text().await?;
                form.fields.entry(name).or_default().push(value);
            }
        }
    }

    Ok(form)
}
