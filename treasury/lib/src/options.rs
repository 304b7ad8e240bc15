//! Request options.
//!
//! Options adjust a [`RequestConfig`] before it is sent. The client holds a
//! list of options applied to every call, and each call may pass more; they
//! are applied in order, client-level first, so per-call options win.
//!
//! ```rust,ignore
//! use treasury_lib::options::{with_header, with_max_retries};
//!
//! let order = client
//!     .payment_orders()
//!     .get("po_123", &[with_max_retries(0), with_header("X-Trace", "abc")?])
//!     .await?;
//! ```

use std::time::Duration;

use reqwest::header::{HeaderName, HeaderValue};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::{ConfigError, TreasuryError};
use crate::request::{IDEMPOTENCY_KEY_HEADER, RequestConfig};
use crate::response::ResponseSlot;
use crate::retry::RetryPolicy;

/// Base URL of the production environment.
pub const PRODUCTION_BASE_URL: &str = "https://app.moderntreasury.com/";

/// One adjustment to a pending request.
#[derive(Debug, Clone)]
pub enum RequestOption {
    /// Resolve the path against this URL.
    BaseUrl(Url),
    /// Send through this HTTP client.
    HttpClient(reqwest::Client),
    /// Retries after the first attempt.
    MaxRetries(u32),
    /// Deadline for each attempt.
    RequestTimeout(Duration),
    /// Full retry and backoff policy.
    RetryPolicy(RetryPolicy),
    /// Set a header, replacing existing values.
    Header(HeaderName, HeaderValue),
    /// Append a header value.
    HeaderAdd(HeaderName, HeaderValue),
    /// Remove a header.
    HeaderDel(HeaderName),
    /// Set a query parameter, replacing existing values.
    Query(String, String),
    /// Append a query parameter value.
    QueryAdd(String, String),
    /// Remove a query parameter.
    QueryDel(String),
    /// Set a value in the JSON body at a dotted path.
    JsonSet(String, Value),
    /// Remove a value from the JSON body at a dotted path.
    JsonDel(String),
    /// Use this idempotency key instead of a generated one.
    IdempotencyKey(String),
    /// API key half of the Basic credential.
    ApiKey(String),
    /// Organization half of the Basic credential.
    OrganizationId(String),
    /// Webhook signing key.
    WebhookKey(String),
    /// Store the raw response of a successful call in this slot.
    ResponseInto(ResponseSlot),
    /// Abort the call when this token is cancelled.
    Cancellation(CancellationToken),
}

impl RequestOption {
    pub(crate) fn apply(&self, config: &mut RequestConfig) -> Result<(), TreasuryError> {
        match self {
            Self::BaseUrl(url) => config.base_url = url.clone(),
            Self::HttpClient(client) => config.http_client = client.clone(),
            Self::MaxRetries(max_retries) => config.retry.max_retries = *max_retries,
            Self::RequestTimeout(timeout) => config.timeout = Some(*timeout),
            Self::RetryPolicy(policy) => config.retry = *policy,
            Self::Header(name, value) => {
                if name.as_str() == IDEMPOTENCY_KEY_HEADER {
                    config.explicit_idempotency_key = true;
                }
                config.headers.insert(name.clone(), value.clone());
            }
            Self::HeaderAdd(name, value) => {
                if name.as_str() == IDEMPOTENCY_KEY_HEADER {
                    config.explicit_idempotency_key = true;
                }
                config.headers.append(name.clone(), value.clone());
            }
            Self::HeaderDel(name) => {
                config.headers.remove(name);
            }
            Self::Query(key, value) => {
                config.query.set(key.as_str(), value.as_str());
            }
            Self::QueryAdd(key, value) => {
                config.query.push(key.as_str(), value.as_str());
            }
            Self::QueryDel(key) => {
                config.query.remove(key);
            }
            Self::JsonSet(path, value) => config.body.json_set(path, value.clone())?,
            Self::JsonDel(path) => config.body.json_del(path)?,
            Self::IdempotencyKey(key) => {
                config.set_idempotency_key(key)?;
                config.explicit_idempotency_key = true;
            }
            Self::ApiKey(key) => {
                config.api_key = Some(key.clone());
                config.render_authorization()?;
            }
            Self::OrganizationId(id) => {
                config.organization_id = Some(id.clone());
                config.render_authorization()?;
            }
            Self::WebhookKey(key) => config.webhook_key = Some(key.clone()),
            Self::ResponseInto(slot) => config.response_slot = Some(slot.clone()),
            Self::Cancellation(token) => config.cancel = Some(token.clone()),
        }
        Ok(())
    }
}

/// Parses a base URL, adding the trailing slash that relative paths need.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    if raw.ends_with('/') {
        Ok(Url::parse(raw)?)
    } else {
        Ok(Url::parse(&format!("{raw}/"))?)
    }
}

/// Overrides the base URL.
///
/// ## Errors
///
/// Returns [`ConfigError::InvalidUrl`] if `url` does not parse.
pub fn with_base_url(url: impl AsRef<str>) -> Result<RequestOption, ConfigError> {
    Ok(RequestOption::BaseUrl(parse_base_url(url.as_ref())?))
}

/// Points the client at the production environment.
pub fn with_environment_production() -> Result<RequestOption, ConfigError> {
    with_base_url(PRODUCTION_BASE_URL)
}

/// Sends through `client` instead of the default HTTP client.
pub fn with_http_client(client: reqwest::Client) -> RequestOption {
    RequestOption::HttpClient(client)
}

/// Sets the number of retries after the first attempt.
pub fn with_max_retries(max_retries: u32) -> RequestOption {
    RequestOption::MaxRetries(max_retries)
}

/// Sets a deadline for each attempt.
///
/// A timed-out attempt is retried like any other transport failure.
pub fn with_request_timeout(timeout: Duration) -> RequestOption {
    RequestOption::RequestTimeout(timeout)
}

/// Replaces the retry and backoff policy.
pub fn with_retry_policy(policy: RetryPolicy) -> RequestOption {
    RequestOption::RetryPolicy(policy)
}

fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), ConfigError> {
    let header_name =
        HeaderName::from_bytes(name.as_bytes()).map_err(|e| ConfigError::invalid_header(name, e))?;
    let header_value =
        HeaderValue::from_str(value).map_err(|e| ConfigError::invalid_header(name, e))?;
    Ok((header_name, header_value))
}

/// Sets a header, replacing any existing values.
///
/// ## Errors
///
/// Returns [`ConfigError::InvalidHeader`] for names or values that are not
/// valid in HTTP.
pub fn with_header(name: &str, value: &str) -> Result<RequestOption, ConfigError> {
    let (name, value) = header_pair(name, value)?;
    Ok(RequestOption::Header(name, value))
}

/// Appends a header value, keeping existing values.
pub fn with_header_add(name: &str, value: &str) -> Result<RequestOption, ConfigError> {
    let (name, value) = header_pair(name, value)?;
    Ok(RequestOption::HeaderAdd(name, value))
}

/// Removes a header, including default ones such as `Idempotency-Key`.
pub fn with_header_del(name: &str) -> Result<RequestOption, ConfigError> {
    let name =
        HeaderName::from_bytes(name.as_bytes()).map_err(|e| ConfigError::invalid_header(name, e))?;
    Ok(RequestOption::HeaderDel(name))
}

/// Sets a query parameter, replacing any existing values.
pub fn with_query(key: impl Into<String>, value: impl Into<String>) -> RequestOption {
    RequestOption::Query(key.into(), value.into())
}

/// Appends a query parameter value.
pub fn with_query_add(key: impl Into<String>, value: impl Into<String>) -> RequestOption {
    RequestOption::QueryAdd(key.into(), value.into())
}

/// Removes a query parameter.
pub fn with_query_del(key: impl Into<String>) -> RequestOption {
    RequestOption::QueryDel(key.into())
}

/// Sets `value` at a dotted path in the JSON body, e.g. `metadata.source`.
pub fn with_json_set(path: impl Into<String>, value: Value) -> RequestOption {
    RequestOption::JsonSet(path.into(), value)
}

/// Removes the value at a dotted path in the JSON body.
pub fn with_json_del(path: impl Into<String>) -> RequestOption {
    RequestOption::JsonDel(path.into())
}

/// Uses `key` as the idempotency key for every attempt of the call.
pub fn with_idempotency_key(key: impl Into<String>) -> RequestOption {
    RequestOption::IdempotencyKey(key.into())
}

/// Sets the API key used for Basic authentication.
pub fn with_api_key(key: impl Into<String>) -> RequestOption {
    RequestOption::ApiKey(key.into())
}

/// Sets the organization id used for Basic authentication.
pub fn with_organization_id(id: impl Into<String>) -> RequestOption {
    RequestOption::OrganizationId(id.into())
}

/// Sets the webhook signing key.
pub fn with_webhook_key(key: impl Into<String>) -> RequestOption {
    RequestOption::WebhookKey(key.into())
}

/// Stores the raw response of a successful call in `slot`.
pub fn with_response_into(slot: &ResponseSlot) -> RequestOption {
    RequestOption::ResponseInto(slot.clone())
}

/// Aborts the call, including any backoff sleep, when `token` is cancelled.
pub fn with_cancellation(token: &CancellationToken) -> RequestOption {
    RequestOption::Cancellation(token.clone())
}
