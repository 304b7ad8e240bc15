//! Response format trait and implementations.
//!
//! The [`ResponseFormat`] trait defines how to turn a response body into a
//! typed value. JSON destinations require a JSON content type; string and
//! byte destinations accept anything.

use std::future::Future;
use std::marker::PhantomData;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::ValidationError;

/// Trait for decode destinations.
///
/// ## Examples
///
/// ```rust,ignore
/// use treasury_lib::response::{ResponseFormat, JsonFormat};
///
/// // The format type encodes both the decoding strategy and output type
/// type PaymentOrderResponse = JsonFormat<PaymentOrder>;
/// ```
pub trait ResponseFormat: Send + Sync {
    /// The output type after parsing.
    type Output: Send;

    /// Parse a response body into the output type.
    ///
    /// `content_type` is the response `Content-Type` header, if any.
    fn parse(
        content_type: Option<&str>,
        body: Bytes,
    ) -> impl Future<Output = Result<Self::Output, ValidationError>> + Send;

    /// Returns the content type this destination expects.
    fn content_type() -> &'static str;
}

/// Returns `true` if `content_type` names a JSON media type.
pub fn is_json(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return false;
    };
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    media_type == "application/json" || media_type.ends_with("+json")
}

/// JSON response format with typed deserialization.
///
/// ## Type Parameters
///
/// - `T`: The type to deserialize the JSON into. Must implement [`DeserializeOwned`].
#[derive(Debug, Clone, Copy)]
pub struct JsonFormat<T>(PhantomData<T>);

impl<T: DeserializeOwned + Send + Sync> ResponseFormat for JsonFormat<T> {
    type Output = T;

    async fn parse(content_type: Option<&str>, body: Bytes) -> Result<Self::Output, ValidationError> {
        if !is_json(content_type) {
            return Err(ValidationError::ContentTypeMismatch {
                expected: Self::content_type().to_string(),
                actual: content_type.unwrap_or("<none>").to_string(),
            });
        }
        serde_json::from_slice(&body).map_err(ValidationError::JsonParse)
    }

    fn content_type() -> &'static str {
        "application/json"
    }
}

/// Plain text response format.
///
/// Returns the response body as a UTF-8 string, whatever its content type.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextFormat;

impl ResponseFormat for PlainTextFormat {
    type Output = String;

    async fn parse(content_type: Option<&str>, body: Bytes) -> Result<Self::Output, ValidationError> {
        String::from_utf8(body.to_vec()).map_err(|e| ValidationError::ContentTypeMismatch {
            expected: "valid UTF-8 text".to_string(),
            actual: format!("{} (invalid UTF-8: {e})", content_type.unwrap_or("<none>")),
        })
    }

    fn content_type() -> &'static str {
        "text/plain"
    }
}

/// Binary response format.
///
/// Returns the raw response bytes without interpretation.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryFormat;

impl ResponseFormat for BinaryFormat {
    type Output = Bytes;

    async fn parse(_content_type: Option<&str>, body: Bytes) -> Result<Self::Output, ValidationError> {
        Ok(body)
    }

    fn content_type() -> &'static str {
        "application/octet-stream"
    }
}

/// Discards the body. Used by endpoints that return nothing useful.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyFormat;

impl ResponseFormat for EmptyFormat {
    type Output = ();

    async fn parse(_content_type: Option<&str>, _body: Bytes) -> Result<Self::Output, ValidationError> {
        Ok(())
    }

    fn content_type() -> &'static str {
        "*/*"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, serde::Deserialize)]
    struct TestData {
        id: String,
        amount: i64,
    }

    #[tokio::test]
    async fn test_json_format_parse() {
        let body = Bytes::from(r#"{"id": "po_1", "amount": 1000}"#);

        let result = JsonFormat::<TestData>::parse(Some("application/json; charset=utf-8"), body)
            .await
            .unwrap();
        assert_eq!(result.id, "po_1");
        assert_eq!(result.amount, 1000);
    }

    #[tokio::test]
    async fn test_json_format_invalid() {
        let body = Bytes::from("not json");
        let result = JsonFormat::<TestData>::parse(Some("application/json"), body).await;
        assert!(matches!(result, Err(ValidationError::JsonParse(_))));
    }

    #[tokio::test]
    async fn test_json_format_rejects_non_json_content() {
        let body = Bytes::from("id,amount\npo_1,1000\n");
        let result = JsonFormat::<TestData>::parse(Some("text/csv"), body).await;
        match result {
            Err(ValidationError::ContentTypeMismatch { expected, actual }) => {
                assert_eq!(expected, "application/json");
                assert_eq!(actual, "text/csv");
            }
            other => panic!("expected content type mismatch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_plain_text_accepts_any_content_type() {
        let body = Bytes::from("id,amount\n");
        let result = PlainTextFormat::parse(Some("text/csv"), body).await.unwrap();
        assert_eq!(result, "id,amount\n");
    }

    #[tokio::test]
    async fn test_binary_format() {
        let data = Bytes::from_static(&[0x25, 0x50, 0x44, 0x46]);
        let result = BinaryFormat::parse(Some("application/pdf"), data.clone())
            .await
            .unwrap();
        assert_eq!(result, data);
    }

    #[test]
    fn test_is_json() {
        assert!(is_json(Some("application/json")));
        assert!(is_json(Some("Application/JSON; charset=utf-8")));
        assert!(is_json(Some("application/problem+json")));
        assert!(!is_json(Some("text/plain")));
        assert!(!is_json(None));
    }
}
