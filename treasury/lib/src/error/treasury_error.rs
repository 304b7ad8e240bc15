//! Top-level client error type.

use super::{ApiError, AuthError, ClientError, ConfigError, ValidationError};
use thiserror::Error;

/// Top-level error type for all client operations.
///
/// This enum aggregates all error categories, enabling unified error handling
/// while preserving the ability to match on specific error types when needed.
///
/// ## Examples
///
/// ```rust,ignore
/// use treasury_lib::TreasuryError;
///
/// fn handle_error(err: TreasuryError) {
///     match err {
///         TreasuryError::Api(e) => eprintln!("HTTP {}: {e}", e.status_code()),
///         TreasuryError::Client(e) => eprintln!("Network error: {e}"),
///         TreasuryError::Validation(e) => eprintln!("Invalid response: {e}"),
///         TreasuryError::Auth(e) => eprintln!("Credentials: {e}"),
///         TreasuryError::Config(e) => eprintln!("Configuration error: {e}"),
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum TreasuryError {
    /// Transport errors (network, timeout, cancellation).
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The server answered with status > 399.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Response decoding errors and destination mismatches.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Credential errors.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Client or request configuration errors.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl TreasuryError {
    /// Returns the HTTP status code, if the failure carries one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api(e) => Some(e.status_code()),
            Self::Client(e) => e.status_code(),
            Self::Validation(ValidationError::ErrorBody { status, .. }) => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if the caller cancelled the request.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Client(ClientError::Cancelled))
    }

    /// Returns the typed API error, if this is one.
    pub fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }
}

impl From<url::ParseError> for TreasuryError {
    fn from(err: url::ParseError) -> Self {
        Self::Config(ConfigError::InvalidUrl(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_client_error() {
        let err: TreasuryError = ClientError::Timeout { duration_ms: 5000 }.into();
        assert!(matches!(err, TreasuryError::Client(_)));
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_cancelled() {
        let err: TreasuryError = ClientError::Cancelled.into();
        assert!(err.is_cancelled());
        assert!(err.as_api_error().is_none());
    }

    #[test]
    fn test_from_auth_error() {
        let err: TreasuryError = AuthError::MissingOrganizationId.into();
        assert!(matches!(err, TreasuryError::Auth(_)));
        assert!(err.to_string().contains("organization id"));
    }

    #[test]
    fn test_error_body_status() {
        let source = serde_json::from_str::<serde_json::Value>("oops").unwrap_err();
        let err: TreasuryError = ValidationError::ErrorBody { status: 503, source }.into();
        assert_eq!(err.status_code(), Some(503));
    }
}
