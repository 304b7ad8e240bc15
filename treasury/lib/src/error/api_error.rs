//! Typed API error for responses with status > 399.

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use super::ValidationError;
use crate::method::RestMethod;

/// The request side of a failed exchange, kept for diagnostics.
///
/// Header values marked sensitive (the `Authorization` header) keep that flag,
/// so `Debug` output does not leak credentials.
#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    /// HTTP method of the final attempt.
    pub method: RestMethod,
    /// Fully resolved URL, including the query string.
    pub url: Url,
    /// Headers sent with the final attempt.
    pub headers: HeaderMap,
}

/// Structured error payload returned by the API.
///
/// The server wraps it as `{"errors": {"code": ..., "message": ..., "parameter": ...}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code, such as `parameter_invalid`.
    #[serde(default)]
    pub code: Option<String>,
    /// Human-readable explanation.
    #[serde(default)]
    pub message: Option<String>,
    /// The request parameter the error refers to.
    #[serde(default)]
    pub parameter: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    errors: Option<ErrorDetail>,
}

/// A completed HTTP exchange that the server answered with status > 399.
///
/// Carries the status, the request that produced it, and the raw response.
/// The JSON payload is kept when the body parsed, so callers can inspect
/// fields beyond the standard [`ErrorDetail`].
#[derive(Debug, Clone, Error)]
#[error(
    "{method} \"{url}\": {status} {body}",
    method = .request.method,
    url = .request.url,
    body = String::from_utf8_lossy(.body)
)]
pub struct ApiError {
    status: StatusCode,
    request: RequestSnapshot,
    headers: HeaderMap,
    body: Bytes,
    payload: Option<serde_json::Value>,
}

impl ApiError {
    /// Builds an API error from a failed response.
    ///
    /// An empty body yields an error with no payload. A non-empty body that
    /// is not JSON cannot be interpreted and is reported as
    /// [`ValidationError::ErrorBody`].
    pub fn from_response(
        request: RequestSnapshot,
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<Self, ValidationError> {
        let payload = if body.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            let value = serde_json::from_slice(&body).map_err(|source| {
                ValidationError::ErrorBody {
                    status: status.as_u16(),
                    source,
                }
            })?;
            Some(value)
        };

        Ok(Self {
            status,
            request,
            headers,
            body,
            payload,
        })
    }

    /// Returns the HTTP status code.
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns the HTTP status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the request that produced this error.
    pub fn request(&self) -> &RequestSnapshot {
        &self.request
    }

    /// Returns the response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the raw response body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the parsed JSON payload, if the body was non-empty.
    pub fn payload(&self) -> Option<&serde_json::Value> {
        self.payload.as_ref()
    }

    /// Returns the structured error detail, if the payload carried one.
    pub fn detail(&self) -> Option<ErrorDetail> {
        let payload = self.payload.clone()?;
        serde_json::from_value::<ErrorEnvelope>(payload)
            .ok()
            .and_then(|envelope| envelope.errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> RequestSnapshot {
        RequestSnapshot {
            method: RestMethod::Get,
            url: Url::parse("https://app.moderntreasury.com/api/expected_payments/ep_1").unwrap(),
            headers: HeaderMap::new(),
        }
    }

    #[test]
    fn test_parses_structured_detail() {
        let body = Bytes::from(
            r#"{"errors":{"code":"resource_not_found","message":"Resource not found","parameter":"id"}}"#,
        );
        let err = ApiError::from_response(snapshot(), StatusCode::NOT_FOUND, HeaderMap::new(), body)
            .unwrap();

        assert_eq!(err.status_code(), 404);
        let detail = err.detail().unwrap();
        assert_eq!(detail.code.as_deref(), Some("resource_not_found"));
        assert_eq!(detail.parameter.as_deref(), Some("id"));
    }

    #[test]
    fn test_empty_body_has_no_payload() {
        let err = ApiError::from_response(
            snapshot(),
            StatusCode::INTERNAL_SERVER_ERROR,
            HeaderMap::new(),
            Bytes::new(),
        )
        .unwrap();

        assert!(err.payload().is_none());
        assert!(err.detail().is_none());
    }

    #[test]
    fn test_unexpected_json_shape_keeps_payload() {
        let body = Bytes::from(r#"{"message":"upstream unavailable"}"#);
        let err = ApiError::from_response(snapshot(), StatusCode::BAD_GATEWAY, HeaderMap::new(), body)
            .unwrap();

        assert!(err.detail().is_none());
        assert_eq!(err.payload().unwrap()["message"], "upstream unavailable");
    }

    #[test]
    fn test_non_json_body_is_parse_error() {
        let body = Bytes::from("<html>bad gateway</html>");
        let result =
            ApiError::from_response(snapshot(), StatusCode::BAD_GATEWAY, HeaderMap::new(), body);

        assert!(matches!(
            result,
            Err(ValidationError::ErrorBody { status: 502, .. })
        ));
    }

    #[test]
    fn test_display_includes_method_url_and_status() {
        let body = Bytes::from(r#"{"errors":{"message":"nope"}}"#);
        let err = ApiError::from_response(snapshot(), StatusCode::NOT_FOUND, HeaderMap::new(), body)
            .unwrap();

        let display = err.to_string();
        assert!(display.starts_with("GET \"https://app.moderntreasury.com/api/expected_payments/ep_1\": 404 Not Found"));
        assert!(display.contains("nope"));
    }
}
