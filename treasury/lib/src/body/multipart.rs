//! `multipart/form-data` bodies for file uploads.

use std::path::Path;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;

use crate::error::ConfigError;
use crate::field::Field;

/// Types that encode themselves as a multipart form.
///
/// Implemented by upload parameter structs such as `DocumentCreateParams`.
pub trait ToMultipart {
    /// Encodes the parameters as form parts.
    fn to_multipart(&self) -> Result<MultipartForm, ConfigError>;
}

/// A file to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// File name sent in the part's `Content-Disposition`.
    pub file_name: String,
    /// Content type of the part; `application/octet-stream` when absent.
    pub content_type: Option<String>,
    /// The file contents.
    pub bytes: Bytes,
}

impl FilePart {
    /// Creates a file part from in-memory contents.
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    /// Sets the part content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Reads a file from disk. The file name is taken from the path.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PartValue {
    Text(String),
    File(FilePart),
}

/// A replayable multipart form.
///
/// `reqwest::multipart::Form` is consumed when sent, so the parts are kept
/// here and a fresh form (with a fresh boundary) is built for every attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<(String, PartValue)>,
}

impl MultipartForm {
    /// Creates an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a text part.
    pub fn text(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.parts.push((name.into(), PartValue::Text(value.into())));
        self
    }

    /// Adds a text part from a field; `Unset` and `Null` are skipped.
    pub fn text_field<T: Serialize>(
        &mut self,
        name: &str,
        field: &Field<T>,
    ) -> Result<&mut Self, ConfigError> {
        if let Field::Value(v) = field {
            let text = match serde_json::to_value(v)? {
                Value::String(s) => s,
                other => other.to_string(),
            };
            self.text(name, text);
        }
        Ok(self)
    }

    /// Adds a file part.
    pub fn file(&mut self, name: impl Into<String>, file: FilePart) -> &mut Self {
        self.parts.push((name.into(), PartValue::File(file)));
        self
    }

    /// Returns the text value of the first part named `name`.
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|(n, v)| match v {
            PartValue::Text(t) if n == name => Some(t.as_str()),
            _ => None,
        })
    }

    /// Returns the number of parts.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Returns `true` if the form has no parts.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Builds a fresh `reqwest` form for one attempt.
    pub fn to_form(&self) -> Result<Form, ConfigError> {
        let mut form = Form::new();
        for (name, value) in &self.parts {
            form = match value {
                PartValue::Text(text) => form.text(name.clone(), text.clone()),
                PartValue::File(file) => {
                    let content_type = file
                        .content_type
                        .as_deref()
                        .unwrap_or("application/octet-stream");
                    let part = Part::bytes(file.bytes.to_vec())
                        .file_name(file.file_name.clone())
                        .mime_str(content_type)
                        .map_err(|e| ConfigError::invalid_header("content-type", e))?;
                    form.part(name.clone(), part)
                }
            };
        }
        Ok(form)
    }
}

impl ToMultipart for MultipartForm {
    fn to_multipart(&self) -> Result<MultipartForm, ConfigError> {
        Ok(self.clone())
    }
}
