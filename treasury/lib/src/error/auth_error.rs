//! Credential errors.

use thiserror::Error;

/// Errors related to API credentials.
///
/// The API authenticates with HTTP Basic auth built from an organization id
/// and an API key; both must be present before a client can be built from
/// the environment.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No API key was configured.
    #[error("Missing API key (set MODERN_TREASURY_API_KEY)")]
    MissingApiKey,

    /// No organization id was configured.
    #[error("Missing organization id (set MODERN_TREASURY_ORGANIZATION_ID)")]
    MissingOrganizationId,

    /// The credential pair cannot be encoded into an `Authorization` header.
    #[error("Invalid credential: {message}")]
    InvalidCredential {
        /// Why the credential was rejected.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_display() {
        let err = AuthError::MissingApiKey;
        assert!(err.to_string().contains("MODERN_TREASURY_API_KEY"));
    }

    #[test]
    fn test_invalid_credential_display() {
        let err = AuthError::InvalidCredential {
            message: "contains a newline".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid credential: contains a newline");
    }
}
