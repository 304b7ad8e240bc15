//! Resource services.
//!
//! Each service borrows the [`ApiClient`](crate::ApiClient) and maps its
//! operations onto [`Endpoint`]s: build the path from ids, pick the body
//! encoding, and hand the call to the request pipeline.

mod documents;
mod expected_payments;
mod external_accounts;
mod incoming_payment_details;
mod ledger_transactions;
mod payment_flows;
mod payment_orders;
mod returns;
mod reversals;

pub use documents::*;
pub use expected_payments::*;
pub use external_accounts::*;
pub use incoming_payment_details::*;
pub use ledger_transactions::*;
pub use payment_flows::*;
pub use payment_orders::*;
pub use returns::*;
pub use reversals::*;

use crate::endpoint::Endpoint;
use crate::error::ConfigError;
use crate::field::Field;
use crate::method::RestMethod;
use crate::options::{RequestOption, with_idempotency_key};
use crate::response::ResponseFormat;

/// Builds an endpoint definition.
pub(crate) fn endpoint<F: ResponseFormat>(
    id: &'static str,
    method: RestMethod,
    path: &'static str,
) -> Endpoint<F> {
    Endpoint::builder().id(id).method(method).path(path).build()
}

/// Rejects an empty path id before anything is sent.
pub(crate) fn require_id<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ConfigError> {
    if value.is_empty() {
        Err(ConfigError::missing_field(field))
    } else {
        Ok(value)
    }
}

/// Prepends the idempotency key carried by a params struct, if any.
///
/// Per-call options come after it, so an explicit option still wins.
pub(crate) fn with_param_key(key: &Field<String>, options: &[RequestOption]) -> Vec<RequestOption> {
    let mut all = Vec::with_capacity(options.len() + 1);
    if let Field::Value(key) = key {
        all.push(with_idempotency_key(key.clone()));
    }
    all.extend_from_slice(options);
    all
}
