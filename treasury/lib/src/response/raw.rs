//! Undecoded responses.

use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use url::Url;

use crate::error::ClientError;

/// A fully read HTTP response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Response status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Final URL, after redirects.
    pub url: Url,
    /// The complete body.
    pub body: Bytes,
}

impl RawResponse {
    /// Reads the whole body of `response`.
    pub async fn read(response: reqwest::Response) -> Result<Self, ClientError> {
        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();
        let body = response.bytes().await?;
        Ok(Self {
            status,
            headers,
            url,
            body,
        })
    }

    /// Returns a header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the `Content-Type` header.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }
}

/// A caller-owned slot that receives the raw response of a successful call.
///
/// Pass it with [`with_response_into`](crate::options::with_response_into);
/// after the call returns, [`take`](Self::take) yields the response exactly
/// as it was received.
#[derive(Debug, Clone, Default)]
pub struct ResponseSlot(Arc<Mutex<Option<RawResponse>>>);

impl ResponseSlot {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fill(&self, response: RawResponse) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = Some(response);
    }

    /// Removes and returns the stored response.
    pub fn take(&self) -> Option<RawResponse> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    /// Returns `true` if a response has been stored.
    pub fn is_filled(&self) -> bool {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
