//! Multipart Upload Payloads
//!
//! Transport-independent model of a multipart form. `ReqwestTransport`
//! converts it to `reqwest::multipart::Form` at send time, which keeps the
//! payload inspectable in tests.

use std::path::Path;

use bytes::Bytes;
use serde_json::{Map, Value};

/// Field name used when several files are uploaded together.
pub const FILES_FIELD: &str = "files[]";

/// Field name used for a single-file upload.
pub const FILE_FIELD: &str = "file";

/// A file-like blob to upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            data: data.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Read a file from disk, guessing its content type from the extension.
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let content_type = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(content_type_for_extension)
            .map(str::to_string);
        Ok(Self {
            file_name,
            content_type,
            data: Bytes::from(data),
        })
    }
}

fn content_type_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "pdf" => Some("application/pdf"),
        "txt" => Some("text/plain"),
        "md" | "markdown" => Some("text/markdown"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Files attached to an upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum UploadFiles {
    #[default]
    None,
    /// Sent under [`FILE_FIELD`].
    Single(UploadFile),
    /// Each sent under [`FILES_FIELD`]; an empty list sends no file parts.
    Many(Vec<UploadFile>),
}

impl From<UploadFile> for UploadFiles {
    fn from(file: UploadFile) -> Self {
        Self::Single(file)
    }
}

impl From<Vec<UploadFile>> for UploadFiles {
    fn from(files: Vec<UploadFile>) -> Self {
        Self::Many(files)
    }
}

/// One part of a multipart form.
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text { name: String, value: String },
    File { name: String, file: UploadFile },
}

/// Ordered multipart form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartForm {
    parts: Vec<FormPart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn file(mut self, name: impl Into<String>, file: UploadFile) -> Self {
        self.parts.push(FormPart::File {
            name: name.into(),
            file,
        });
        self
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    pub fn into_parts(self) -> Vec<FormPart> {
        self.parts
    }

    /// Values of every text part named `name`, in order.
    pub fn text_values(&self, name: &str) -> Vec<&str> {
        self.parts
            .iter()
            .filter_map(|p| match p {
                FormPart::Text { name: n, value } if n == name => Some(value.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Every file part named `name`, in order.
    pub fn files_named(&self, name: &str) -> Vec<&UploadFile> {
        self.parts
            .iter()
            .filter_map(|p| match p {
                FormPart::File { name: n, file } if n == name => Some(file),
                _ => None,
            })
            .collect()
    }
}

/// Stringify a scalar form field. `None` means the field is skipped.
fn field_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Build the multipart payload for an upload request.
pub fn build_upload_form(fields: &Map<String, Value>, files: UploadFiles) -> MultipartForm {
    let mut form = MultipartForm::new();
    for (name, value) in fields {
        if let Some(text) = field_value(value) {
            form = form.text(name.as_str(), text);
        }
    }
    match files {
        UploadFiles::None => {}
        UploadFiles::Single(file) => {
            form = form.file(FILE_FIELD, file);
        }
        UploadFiles::Many(files) => {
            for file in files {
                form = form.file(FILES_FIELD, file);
            }
        }
    }
    form
}
