//! Reversals of payment orders.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::{endpoint, require_id};
use crate::body::{Body, QueryParams, ToQuery};
use crate::client::ApiClient;
use crate::error::{ConfigError, TreasuryError};
use crate::field::Field;
use crate::method::RestMethod;
use crate::options::RequestOption;
use crate::pagination::Page;
use crate::response::JsonFormat;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReversalReason {
    Duplicate,
    IncorrectAmount,
    IncorrectReceivingAccount,
    DateEarlierThanIntended,
    DateLaterThanIntended,
    #[serde(other)]
    Unknown,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReversalStatus {
    Completed,
    Failed,
    Pending,
    Processing,
    Returned,
    Sent,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reversal {
    pub id: String,
    #[serde(default)]
    pub object: String,
    pub payment_order_id: Option<String>,
    pub reason: ReversalReason,
    pub status: ReversalStatus,
    #[serde(default)]
    pub live_mode: bool,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReversalCreateParams {
    pub reason: ReversalReason,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub metadata: Field<HashMap<String, String>>,
}

impl ReversalCreateParams {
    pub fn new(reason: ReversalReason) -> Self {
        Self {
            reason,
            metadata: Field::Unset,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReversalListParams {
    pub after_cursor: Field<String>,
    pub per_page: Field<i64>,
}

impl ToQuery for ReversalListParams {
    fn to_query(&self) -> Result<QueryParams, ConfigError> {
        let mut query = QueryParams::new();
        query
            .push_field("after_cursor", &self.after_cursor)?
            .push_field("per_page", &self.per_page)?;
        Ok(query)
    }
}

/// Operations on `api/payment_orders/{payment_order_id}/reversals`.
#[derive(Debug, Clone, Copy)]
pub struct ReversalService<'a> {
    client: &'a ApiClient,
}

impl<'a> ReversalService<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Reverses a payment order.
    pub async fn create(
        &self,
        payment_order_id: &str,
        params: &ReversalCreateParams,
        options: &[RequestOption],
    ) -> Result<Reversal, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<Reversal>>(
            "payment_orders.reversals.create",
            RestMethod::Post,
            "api/payment_orders/{payment_order_id}/reversals",
        );
        let payment_order_id = require_id(payment_order_id, "payment_order_id")?;
        self.client
            .execute(
                &endpoint,
                &[("payment_order_id", payment_order_id)],
                Body::json(params)?,
                options,
            )
            .await
    }

    pub async fn get(
        &self,
        payment_order_id: &str,
        reversal_id: &str,
        options: &[RequestOption],
    ) -> Result<Reversal, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<Reversal>>(
            "payment_orders.reversals.get",
            RestMethod::Get,
            "api/payment_orders/{payment_order_id}/reversals/{reversal_id}",
        );
        let params = [
            ("payment_order_id", require_id(payment_order_id, "payment_order_id")?),
            ("reversal_id", require_id(reversal_id, "reversal_id")?),
        ];
        self.client
            .execute(&endpoint, &params, Body::Empty, options)
            .await
    }

    pub async fn list(
        &self,
        payment_order_id: &str,
        params: &ReversalListParams,
        options: &[RequestOption],
    ) -> Result<Page<Reversal>, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<Vec<Reversal>>>(
            "payment_orders.reversals.list",
            RestMethod::Get,
            "api/payment_orders/{payment_order_id}/reversals",
        );
        let payment_order_id = require_id(payment_order_id, "payment_order_id")?;
        self.client
            .list(
                &endpoint,
                &[("payment_order_id", payment_order_id)],
                Body::query(params)?,
                options,
            )
            .await
    }
}
