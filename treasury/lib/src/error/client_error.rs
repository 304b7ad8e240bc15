//! HTTP transport errors.

use thiserror::Error;

/// Errors from the transport layer.
///
/// These represent attempts that never produced an HTTP response: network
/// failures, per-attempt timeouts and caller cancellation.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed due to network or protocol error.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A single attempt exceeded the configured request timeout.
    #[error("Request timeout after {duration_ms}ms")]
    Timeout {
        /// The per-attempt timeout in milliseconds.
        duration_ms: u64,
    },

    /// The caller cancelled the request.
    #[error("Request cancelled")]
    Cancelled,

    /// Failed to establish connection to the server.
    #[error("Connection failed: {0}")]
    Connection(String),
}

impl ClientError {
    /// Returns `true` if another attempt may succeed.
    ///
    /// Every transport failure is retryable except cancellation and errors
    /// raised while building the request, which would fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Connection(_) => true,
            Self::Cancelled => false,
            Self::Request(e) => !e.is_builder(),
        }
    }

    /// Returns the HTTP status code carried by the underlying error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_retryable() {
        let err = ClientError::Timeout { duration_ms: 5000 };
        assert!(err.is_retryable());
    }

    #[test]
    fn test_connection_is_retryable() {
        let err = ClientError::Connection("connection refused".to_string());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_cancelled_not_retryable() {
        assert!(!ClientError::Cancelled.is_retryable());
        assert_eq!(ClientError::Cancelled.to_string(), "Request cancelled");
    }

    #[test]
    fn test_status_code_absent_for_transport_errors() {
        let timeout = ClientError::Timeout { duration_ms: 1000 };
        assert_eq!(timeout.status_code(), None);
        assert_eq!(timeout.to_string(), "Request timeout after 1000ms");
    }
}
