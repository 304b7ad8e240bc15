//! Response decoding errors.

use thiserror::Error;

/// Errors while turning a completed response into a typed value.
///
/// None of these are retried: the exchange finished and a second attempt
/// would decode the same bytes the same way.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// JSON parsing of a success body failed.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The decode destination cannot accept the response content type.
    ///
    /// Raised when a typed JSON destination receives a non-JSON body. Only
    /// string and byte destinations accept arbitrary content.
    #[error("Unexpected content type: expected {expected}, got {actual}")]
    ContentTypeMismatch {
        /// The content type the destination requires.
        expected: String,
        /// The content type the server sent.
        actual: String,
    },

    /// The body of an error response could not be parsed.
    #[error("Failed to parse error body of HTTP {status} response: {source}")]
    ErrorBody {
        /// Status code of the failed response.
        status: u16,
        /// The underlying parse failure.
        #[source]
        source: serde_json::Error,
    },

    /// Empty response body when content was expected.
    #[error("Empty response body")]
    EmptyBody,
}

impl ValidationError {
    /// Returns `true` if this is a destination/content-type mismatch.
    pub fn is_format_mismatch(&self) -> bool {
        matches!(self, Self::ContentTypeMismatch { .. })
    }

    /// Returns `true` if this is a parsing error.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::JsonParse(_) | Self::ErrorBody { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_mismatch() {
        let err = ValidationError::ContentTypeMismatch {
            expected: "application/json".to_string(),
            actual: "text/csv".to_string(),
        };
        assert!(err.is_format_mismatch());
        assert!(!err.is_parse_error());
    }

    #[test]
    fn test_json_parse_is_parse_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err = ValidationError::JsonParse(json_err);
        assert!(err.is_parse_error());
        assert!(!err.is_format_mismatch());
    }

    #[test]
    fn test_error_body_display() {
        let source = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let err = ValidationError::ErrorBody { status: 502, source };
        assert!(err.to_string().starts_with("Failed to parse error body of HTTP 502"));
        assert!(err.is_parse_error());
    }
}
