//! Async client for the Modern Treasury payments API.
//!
//! Every call flows through one request pipeline:
//!
//! 1. A resource service resolves an [`Endpoint`] path and encodes the
//!    [`Body`] (JSON, `multipart/form-data`, or query parameters).
//! 2. A [`RequestConfig`] is built with default headers, an idempotency key
//!    for mutating methods, and the client's [`RequestOption`]s followed by
//!    the per-call ones.
//! 3. The request is sent with retries under a [`RetryPolicy`], a per-attempt
//!    timeout, and optional cancellation.
//! 4. The response is decoded by a [`ResponseFormat`], or turned into an
//!    [`ApiError`] when the status is not a success.
//!
//! ```rust,ignore
//! use treasury_lib::{ApiClient, PaymentOrderCreateParams, PaymentOrderType, TransactionDirection};
//!
//! let client = ApiClient::from_env()?;
//! let params = PaymentOrderCreateParams::new(
//!     1000,
//!     TransactionDirection::Credit,
//!     PaymentOrderType::Ach,
//!     "0f8e3719-3dfd-4613-9bbf-c0333781b59f",
//! );
//! let order = client.payment_orders().create(&params, &[]).await?;
//! ```

pub mod body;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod field;
pub mod method;
pub mod options;
pub mod pagination;
pub mod platform;
pub mod request;
pub mod resources;
pub mod response;
pub mod retry;
pub mod shared;

pub use body::{ArrayFormat, Body, FilePart, MultipartForm, QueryParams, ToMultipart, ToQuery};
pub use client::{ApiClient, ApiClientBuilder};
pub use endpoint::{Endpoint, EndpointBuilder};
pub use error::{
    ApiError, AuthError, ClientError, ConfigError, ErrorDetail, RequestSnapshot, TreasuryError,
    ValidationError,
};
pub use field::Field;
pub use method::RestMethod;
pub use options::RequestOption;
pub use pagination::Page;
pub use request::RequestConfig;
pub use resources::*;
pub use response::{
    BinaryFormat, EmptyFormat, JsonFormat, PlainTextFormat, RawResponse, ResponseFormat,
    ResponseSlot,
};
pub use retry::RetryPolicy;
pub use shared::{AsyncResponse, Currency, TransactionDirection};

pub use tokio_util::sync::CancellationToken;
