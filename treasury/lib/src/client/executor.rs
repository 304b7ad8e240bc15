//! Client construction and request execution.
//!
//! This module provides the [`ApiClient`] struct, which holds the HTTP
//! client, base URL and client-level options shared by every call, and the
//! [`ApiClientBuilder`] used to configure it.

use std::time::Duration;

use url::Url;

use crate::body::Body;
use crate::endpoint::Endpoint;
use crate::error::{AuthError, ClientError, ConfigError, TreasuryError};
use crate::method::RestMethod;
use crate::options::{
    PRODUCTION_BASE_URL, RequestOption, parse_base_url, with_api_key, with_header,
    with_max_retries, with_organization_id, with_request_timeout, with_retry_policy,
    with_webhook_key,
};
use crate::pagination::Page;
use crate::request::RequestConfig;
use crate::response::{JsonFormat, ResponseFormat};
use crate::retry::RetryPolicy;

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "MODERN_TREASURY_API_KEY";
/// Environment variable holding the organization id.
pub const ENV_ORGANIZATION_ID: &str = "MODERN_TREASURY_ORGANIZATION_ID";
/// Environment variable holding the webhook signing key.
pub const ENV_WEBHOOK_KEY: &str = "MODERN_TREASURY_WEBHOOK_KEY";
/// Environment variable overriding the base URL.
pub const ENV_BASE_URL: &str = "MODERN_TREASURY_BASE_URL";

/// Builds the default HTTP client: rustls, pooled connections.
///
/// ## Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn default_http_client() -> Result<reqwest::Client, ClientError> {
    reqwest::Client::builder()
        .pool_max_idle_per_host(10)
        .build()
        .map_err(ClientError::Request)
}

/// Builder for configuring an [`ApiClient`].
#[derive(Debug, Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    organization_id: Option<String>,
    webhook_key: Option<String>,
    max_retries: Option<u32>,
    timeout: Option<Duration>,
    retry_policy: Option<RetryPolicy>,
    http_client: Option<reqwest::Client>,
    options: Vec<RequestOption>,
}

impl ApiClientBuilder {
    /// Creates a builder with nothing configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder pre-filled from the process environment.
    ///
    /// Reads `MODERN_TREASURY_API_KEY`, `MODERN_TREASURY_ORGANIZATION_ID`,
    /// and optionally `MODERN_TREASURY_WEBHOOK_KEY` and
    /// `MODERN_TREASURY_BASE_URL`. Empty values count as unset.
    ///
    /// ## Errors
    ///
    /// Returns [`AuthError`] if the API key or organization id is missing.
    pub fn from_env() -> Result<Self, AuthError> {
        Self::from_env_with(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_env_with(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AuthError> {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = read(ENV_API_KEY).ok_or(AuthError::MissingApiKey)?;
        let organization_id = read(ENV_ORGANIZATION_ID).ok_or(AuthError::MissingOrganizationId)?;

        let mut builder = Self::new().api_key(api_key).organization_id(organization_id);
        if let Some(key) = read(ENV_WEBHOOK_KEY) {
            builder = builder.webhook_key(key);
        }
        if let Some(url) = read(ENV_BASE_URL) {
            builder = builder.base_url(url);
        }
        Ok(builder)
    }

    /// Sets the base URL. Defaults to the production environment.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the organization id.
    pub fn organization_id(mut self, id: impl Into<String>) -> Self {
        self.organization_id = Some(id.into());
        self
    }

    /// Sets the webhook signing key.
    pub fn webhook_key(mut self, key: impl Into<String>) -> Self {
        self.webhook_key = Some(key.into());
        self
    }

    /// Sets the number of retries after the first attempt. Defaults to 2.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Sets the per-attempt timeout.
    ///
    /// ## Examples
    ///
    /// ```rust,ignore
    /// use std::time::Duration;
    ///
    /// let client = ApiClient::builder()
    ///     .timeout(Duration::from_secs(60))
    ///     .build()?;
    /// ```
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replaces the retry and backoff policy.
    ///
    /// A later [`max_retries`](Self::max_retries) still overrides the
    /// policy's retry budget.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Sends every request through `client`.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Adds a default header to all requests.
    ///
    /// ## Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(
        mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<Self, ConfigError> {
        self.options.push(with_header(name.as_ref(), value.as_ref())?);
        Ok(self)
    }

    /// Adds an option applied to every request, before per-call options.
    pub fn option(mut self, option: RequestOption) -> Self {
        self.options.push(option);
        self
    }

    /// Builds the [`ApiClient`].
    ///
    /// ## Errors
    ///
    /// Returns an error if the base URL does not parse, a credential is
    /// empty, or the default HTTP client cannot be constructed.
    pub fn build(self) -> Result<ApiClient, TreasuryError> {
        let base_url = parse_base_url(self.base_url.as_deref().unwrap_or(PRODUCTION_BASE_URL))?;
        let http_client = match self.http_client {
            Some(client) => client,
            None => default_http_client()?,
        };

        let mut options = Vec::new();
        if let Some(id) = self.organization_id {
            if id.is_empty() {
                return Err(AuthError::InvalidCredential {
                    message: "organization id is empty".to_string(),
                }
                .into());
            }
            options.push(with_organization_id(id));
        }
        if let Some(key) = self.api_key {
            if key.is_empty() {
                return Err(AuthError::InvalidCredential {
                    message: "API key is empty".to_string(),
                }
                .into());
            }
            options.push(with_api_key(key));
        }
        if let Some(key) = &self.webhook_key {
            options.push(with_webhook_key(key.clone()));
        }
        if let Some(policy) = self.retry_policy {
            options.push(with_retry_policy(policy));
        }
        if let Some(max_retries) = self.max_retries {
            options.push(with_max_retries(max_retries));
        }
        if let Some(timeout) = self.timeout {
            options.push(with_request_timeout(timeout));
        }
        options.extend(self.options);

        Ok(ApiClient {
            http_client,
            base_url,
            options,
            webhook_key: self.webhook_key,
        })
    }
}

/// Async client for the Modern Treasury API.
///
/// The client is cheap to clone; clones share the connection pool. Resource
/// services are reached through accessors such as
/// [`payment_orders`](Self::payment_orders).
///
/// ## Examples
///
/// ```rust,ignore
/// use treasury_lib::ApiClient;
///
/// let client = ApiClient::from_env()?;
/// let order = client.payment_orders().get("po_123", &[]).await?;
/// println!("{} {}", order.id, order.amount);
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: Url,
    options: Vec<RequestOption>,
    webhook_key: Option<String>,
}

impl ApiClient {
    /// Creates a new builder for configuring an API client.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::new()
    }

    /// Creates a client from the process environment.
    ///
    /// ## Errors
    ///
    /// Returns an error if credentials are missing or the configured base
    /// URL is invalid.
    pub fn from_env() -> Result<Self, TreasuryError> {
        ApiClientBuilder::from_env()?.build()
    }

    /// Returns the base URL for this client.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the webhook signing key, if one was configured.
    pub fn webhook_key(&self) -> Option<&str> {
        self.webhook_key.as_deref()
    }

    /// Returns the options applied to every request.
    pub fn options(&self) -> &[RequestOption] {
        &self.options
    }

    /// Builds a request descriptor with client and per-call options applied.
    ///
    /// `path` must already have its parameters substituted.
    pub fn request(
        &self,
        method: RestMethod,
        path: impl Into<String>,
        body: Body,
        options: &[RequestOption],
    ) -> Result<RequestConfig, TreasuryError> {
        let mut config = RequestConfig::new(
            method,
            path,
            body,
            self.base_url.clone(),
            self.http_client.clone(),
        )?;
        config.apply(&self.options)?;
        config.apply(options)?;
        Ok(config)
    }

    /// Executes an endpoint and decodes its response.
    ///
    /// ## Arguments
    ///
    /// * `endpoint` - The endpoint definition to execute.
    /// * `params` - Values for the endpoint's `{name}` path placeholders.
    /// * `body` - The request payload.
    /// * `options` - Per-call options.
    pub async fn execute<F: ResponseFormat>(
        &self,
        endpoint: &Endpoint<F>,
        params: &[(&str, &str)],
        body: Body,
        options: &[RequestOption],
    ) -> Result<F::Output, TreasuryError> {
        let path = endpoint.resolve_path(params)?;
        self.request(endpoint.method(), path, body, options)?
            .execute::<F>()
            .await
    }

    /// Executes a list endpoint and returns its first page.
    pub async fn list<T>(
        &self,
        endpoint: &Endpoint<JsonFormat<Vec<T>>>,
        params: &[(&str, &str)],
        body: Body,
        options: &[RequestOption],
    ) -> Result<Page<T>, TreasuryError>
    where
        T: serde::de::DeserializeOwned + Send + Sync,
    {
        let path = endpoint.resolve_path(params)?;
        Page::fetch(self.request(endpoint.method(), path, body, options)?).await
    }
}
