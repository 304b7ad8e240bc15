//! Client, option and request configuration errors.

use thiserror::Error;

/// Errors in client or request configuration.
///
/// These errors occur while a request is being assembled, before anything
/// is sent, and usually indicate a programmer error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A required configuration field is missing.
    #[error("Missing required field: {field}")]
    MissingField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// A header name or value could not be encoded.
    #[error("Invalid header {name}: {message}")]
    InvalidHeader {
        /// The offending header name.
        name: String,
        /// Description of the encoding failure.
        message: String,
    },

    /// A request body or parameter could not be serialized.
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A query parameter value is not a scalar.
    #[error("Query parameter {key} must be a scalar value")]
    UnsupportedQueryValue {
        /// The parameter key.
        key: String,
    },

    /// A JSON body edit targeted an invalid path or a non-JSON body.
    #[error("Invalid JSON body path {path}: {message}")]
    InvalidJsonPath {
        /// The dotted path of the edit.
        path: String,
        /// Why the edit could not be applied.
        message: String,
    },

    /// Path template contains invalid parameter syntax.
    #[error("Invalid path template: {message}")]
    InvalidPathTemplate {
        /// Description of the path template error.
        message: String,
    },
}

impl ConfigError {
    /// Creates a missing field error.
    pub fn missing_field(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    /// Creates an invalid path template error.
    pub fn invalid_path(message: impl Into<String>) -> Self {
        Self::InvalidPathTemplate {
            message: message.into(),
        }
    }

    /// Creates an invalid header error.
    pub fn invalid_header(name: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidHeader {
            name: name.into(),
            message: message.to_string(),
        }
    }

    /// Creates an invalid JSON path error.
    pub fn invalid_json_path(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidJsonPath {
            path: path.into(),
            message: message.into(),
        }
    }
}
