//! The request pipeline.
//!
//! A [`RequestConfig`] describes one logical call: method, path, query,
//! body, headers, timeout and retry budget. It is built per call, adjusted by
//! [`RequestOption`]s, and then executed. Execution resolves the URL, sends
//! up to `max_retries + 1` attempts, and decodes the final response.

use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use reqwest::header::{
    ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT,
};
use tokio_util::sync::CancellationToken;
use tracing::{Span, debug, instrument, warn};
use url::Url;
use uuid::Uuid;

use crate::body::{Body, QueryParams};
use crate::error::{ApiError, ClientError, ConfigError, RequestSnapshot, TreasuryError};
use crate::method::RestMethod;
use crate::options::RequestOption;
use crate::platform::{platform_headers, user_agent};
use crate::response::{RawResponse, ResponseFormat, ResponseSlot};
use crate::retry::RetryPolicy;

/// Header carrying the idempotency key of mutating calls.
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// Prefix of generated idempotency keys.
pub const IDEMPOTENCY_KEY_PREFIX: &str = "treasury-rust-";

/// Returns a fresh idempotency key.
pub fn new_idempotency_key() -> String {
    format!("{IDEMPOTENCY_KEY_PREFIX}{}", Uuid::new_v4())
}

/// Everything needed to perform one logical API call.
///
/// Cloning keeps the idempotency key, so a clone replays the same logical
/// call. Use [`regenerate_idempotency_key`](Self::regenerate_idempotency_key)
/// to turn a clone into a new call.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub(crate) method: RestMethod,
    pub(crate) path: String,
    pub(crate) base_url: Url,
    pub(crate) headers: HeaderMap,
    pub(crate) query: QueryParams,
    pub(crate) body: Body,
    pub(crate) timeout: Option<Duration>,
    pub(crate) retry: RetryPolicy,
    pub(crate) http_client: reqwest::Client,
    pub(crate) response_slot: Option<ResponseSlot>,
    pub(crate) cancel: Option<CancellationToken>,
    pub(crate) api_key: Option<String>,
    pub(crate) organization_id: Option<String>,
    pub(crate) webhook_key: Option<String>,
    pub(crate) explicit_idempotency_key: bool,
}

impl RequestConfig {
    /// Creates a request with the default headers applied.
    ///
    /// `path` is relative to the base URL. A [`Body::Query`] is merged into
    /// the URL query and no body is sent.
    pub fn new(
        method: RestMethod,
        path: impl Into<String>,
        body: Body,
        base_url: Url,
        http_client: reqwest::Client,
    ) -> Result<Self, TreasuryError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&user_agent())
                .map_err(|e| ConfigError::invalid_header(USER_AGENT.as_str(), e))?,
        );
        for (name, value) in platform_headers() {
            let value =
                HeaderValue::from_str(&value).map_err(|e| ConfigError::invalid_header(name, e))?;
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ConfigError::invalid_header(name, e))?;
            headers.insert(name, value);
        }

        let (query, body) = match body {
            Body::Query(query) => (query, Body::Empty),
            other => (QueryParams::new(), other),
        };

        let mut config = Self {
            method,
            path: path.into(),
            base_url,
            headers,
            query,
            body,
            timeout: None,
            retry: RetryPolicy::default(),
            http_client,
            response_slot: None,
            cancel: None,
            api_key: None,
            organization_id: None,
            webhook_key: None,
            explicit_idempotency_key: false,
        };
        if method.is_mutating() {
            config.set_idempotency_key(&new_idempotency_key())?;
        }
        Ok(config)
    }

    /// Applies options in order.
    pub fn apply(&mut self, options: &[RequestOption]) -> Result<(), TreasuryError> {
        for option in options {
            option.apply(self)?;
        }
        Ok(())
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> RestMethod {
        self.method
    }

    /// Returns the path relative to the base URL.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the headers that every attempt will carry.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the query parameters.
    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    /// Returns mutable access to the query parameters.
    pub fn query_mut(&mut self) -> &mut QueryParams {
        &mut self.query
    }

    /// Returns the request body.
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Returns the retry policy.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Returns the per-attempt timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the webhook key configured for this call, if any.
    pub fn webhook_key(&self) -> Option<&str> {
        self.webhook_key.as_deref()
    }

    /// Returns the idempotency key, if this call carries one.
    pub fn idempotency_key(&self) -> Option<&str> {
        self.headers
            .get(IDEMPOTENCY_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
    }

    /// Replaces a generated idempotency key with a fresh one.
    ///
    /// Keys set explicitly by the caller are kept.
    pub fn regenerate_idempotency_key(&mut self) -> Result<(), ConfigError> {
        if self.explicit_idempotency_key || self.idempotency_key().is_none() {
            return Ok(());
        }
        self.set_idempotency_key(&new_idempotency_key())
    }

    pub(crate) fn set_idempotency_key(&mut self, key: &str) -> Result<(), ConfigError> {
        let value = HeaderValue::from_str(key)
            .map_err(|e| ConfigError::invalid_header(IDEMPOTENCY_KEY_HEADER, e))?;
        self.headers.insert(IDEMPOTENCY_KEY_HEADER, value);
        Ok(())
    }

    /// Rebuilds the `Authorization` header from the stored credentials.
    pub(crate) fn render_authorization(&mut self) -> Result<(), ConfigError> {
        let credential = format!(
            "{}:{}",
            self.organization_id.as_deref().unwrap_or_default(),
            self.api_key.as_deref().unwrap_or_default()
        );
        let mut value = HeaderValue::from_str(&format!("Basic {}", BASE64.encode(credential)))
            .map_err(|e| ConfigError::invalid_header(AUTHORIZATION.as_str(), e))?;
        value.set_sensitive(true);
        self.headers.insert(AUTHORIZATION, value);
        Ok(())
    }

    /// Resolves the full URL, query string included.
    pub fn url(&self) -> Result<Url, ConfigError> {
        let mut url = self.base_url.join(&self.path)?;
        if !self.query.is_empty() {
            url.set_query(Some(&self.query.encode()));
        }
        Ok(url)
    }

    fn snapshot(&self, url: &Url) -> RequestSnapshot {
        RequestSnapshot {
            method: self.method,
            url: url.clone(),
            headers: self.headers.clone(),
        }
    }

    /// Builds a fresh `reqwest` request for one attempt.
    fn build_attempt(&self, url: &Url) -> Result<reqwest::Request, TreasuryError> {
        let mut builder = self
            .http_client
            .request(self.method.to_reqwest(), url.clone())
            .headers(self.headers.clone());

        builder = match &self.body {
            Body::Empty | Body::Query(_) => builder,
            Body::Json(value) => {
                let bytes = serde_json::to_vec(value).map_err(ConfigError::Serialize)?;
                if self.headers.contains_key(CONTENT_TYPE) {
                    builder.body(bytes)
                } else {
                    builder
                        .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                        .body(bytes)
                }
            }
            Body::Multipart(form) => builder.multipart(form.to_form()?),
        };

        Ok(builder.build().map_err(ClientError::Request)?)
    }

    /// Runs one attempt: headers and the whole body, under the per-attempt
    /// timeout.
    async fn dispatch(&self, request: reqwest::Request) -> Result<RawResponse, ClientError> {
        let attempt = async {
            let response = self.http_client.execute(request).await?;
            RawResponse::read(response).await
        };
        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, attempt)
                .await
                .map_err(|_| ClientError::Timeout {
                    duration_ms: timeout.as_millis() as u64,
                })?,
            None => attempt.await,
        }
    }

    async fn backoff(&self, cancel: &CancellationToken, delay: Duration) -> Result<(), ClientError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ClientError::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }

    /// Sends the request, retrying per the retry policy.
    ///
    /// Returns the final response, body fully read, whatever its status;
    /// status handling and decoding happen in [`execute`](Self::execute).
    /// Cancelling the token passed with `with_cancellation` aborts the
    /// in-flight attempt (body read included) or the backoff sleep
    /// immediately and prevents further attempts.
    ///
    /// ## Errors
    ///
    /// Returns a [`ClientError`] for transport failures that exhausted the
    /// retry budget, for cancellation, and for requests that cannot be built.
    #[instrument(
        name = "treasury_request",
        skip(self),
        fields(
            http.method = tracing::field::Empty,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
            otel.kind = "client",
            otel.status_code = tracing::field::Empty,
            retry.attempts = tracing::field::Empty,
        )
    )]
    pub async fn send(&self) -> Result<RawResponse, TreasuryError> {
        let url = self.url()?;
        let span = Span::current();
        span.record("http.method", self.method.to_string().as_str());
        span.record("http.url", url.as_str());

        let cancel = self.cancel.clone().unwrap_or_default();
        if cancel.is_cancelled() {
            return Err(ClientError::Cancelled.into());
        }

        let max_retries = self.retry.max_retries;
        let mut attempt: u32 = 0;
        loop {
            let request = self.build_attempt(&url)?;
            debug!(attempt = attempt + 1, "dispatching request");

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(ClientError::Cancelled),
                outcome = self.dispatch(request) => outcome,
            };
            span.record("retry.attempts", attempt + 1);

            match outcome {
                Ok(response) => {
                    let status = response.status;
                    if attempt < max_retries && self.retry.should_retry(status, &response.headers) {
                        let delay = self.retry.delay_for(attempt, &response.headers);
                        warn!(
                            status = status.as_u16(),
                            attempt = attempt + 1,
                            delay_ms = delay.as_millis() as u64,
                            "retrying request after retryable response"
                        );
                        self.backoff(&cancel, delay).await?;
                        attempt += 1;
                        continue;
                    }

                    span.record("http.status_code", status.as_u16());
                    let otel_status = if status.is_server_error() {
                        "ERROR"
                    } else if status.is_client_error() {
                        "UNSET"
                    } else {
                        "OK"
                    };
                    span.record("otel.status_code", otel_status);
                    return Ok(response);
                }
                Err(err) if attempt < max_retries && err.is_retryable() => {
                    let delay = self.retry.delay_for(attempt, &HeaderMap::new());
                    warn!(
                        error = %err,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "retrying request after transport error"
                    );
                    self.backoff(&cancel, delay).await?;
                    attempt += 1;
                }
                Err(err) => {
                    span.record("otel.status_code", "ERROR");
                    return Err(err.into());
                }
            }
        }
    }

    /// Sends the request and returns the fully read final response.
    ///
    /// Responses with status > 399 become [`ApiError`]s. A successful
    /// response is also stored in the caller's response slot, if one was set.
    pub async fn execute_raw(&self) -> Result<RawResponse, TreasuryError> {
        let url = self.url()?;
        let raw = self.send().await?;

        if raw.status.as_u16() > 399 {
            let error =
                ApiError::from_response(self.snapshot(&url), raw.status, raw.headers, raw.body)?;
            return Err(error.into());
        }

        if let Some(slot) = &self.response_slot {
            slot.fill(raw.clone());
        }
        Ok(raw)
    }

    /// Sends the request and decodes the body into `F::Output`.
    ///
    /// ## Errors
    ///
    /// - [`TreasuryError::Client`] when every attempt failed in transport or
    ///   the call was cancelled
    /// - [`TreasuryError::Api`] when the final status is > 399
    /// - [`TreasuryError::Validation`] when the body does not fit the
    ///   destination, or an error body could not be parsed
    pub async fn execute<F: ResponseFormat>(&self) -> Result<F::Output, TreasuryError> {
        self.execute_with_response::<F>().await.map(|(output, _)| output)
    }

    /// Like [`execute`](Self::execute), also returning the raw response.
    pub async fn execute_with_response<F: ResponseFormat>(
        &self,
    ) -> Result<(F::Output, RawResponse), TreasuryError> {
        let raw = self.execute_raw().await?;
        let output = F::parse(raw.content_type(), raw.body.clone()).await?;
        Ok((output, raw))
    }
}
