//! Incoming payment details: payments received into internal accounts.
//!
//! Test environments can simulate one with
//! [`IncomingPaymentDetailService::create_async`].

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use futures::Stream;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::{endpoint, require_id, with_param_key};
use crate::body::{Body, QueryParams, ToQuery};
use crate::client::ApiClient;
use crate::error::{ConfigError, TreasuryError};
use crate::field::Field;
use crate::method::RestMethod;
use crate::options::RequestOption;
use crate::pagination::{AutoPager, Page, auto_paging};
use crate::response::JsonFormat;
use crate::shared::{AsyncResponse, Currency, TransactionDirection};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IncomingPaymentDetailStatus {
    Completed,
    Pending,
    Returned,
    #[serde(other)]
    Unknown,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IncomingPaymentDetailType {
    Ach,
    Book,
    Check,
    Eft,
    Interac,
    Rtp,
    Sepa,
    Signet,
    Wire,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingPaymentDetail {
    pub id: String,
    #[serde(default)]
    pub object: String,
    pub amount: i64,
    pub as_of_date: NaiveDate,
    #[serde(default)]
    pub currency: Option<Currency>,
    pub direction: TransactionDirection,
    pub status: IncomingPaymentDetailStatus,
    pub r#type: IncomingPaymentDetailType,
    pub internal_account_id: String,
    /// Raw rail data as reported by the bank.
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub ledger_transaction_id: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub transaction_line_item_id: Option<String>,
    #[serde(default)]
    pub vendor_id: Option<String>,
    #[serde(default)]
    pub virtual_account_id: Option<String>,
    #[serde(default)]
    pub originating_account_number_safe: Option<String>,
    #[serde(default)]
    pub originating_account_number_type: Option<String>,
    #[serde(default)]
    pub originating_routing_number: Option<String>,
    #[serde(default)]
    pub originating_routing_number_type: Option<String>,
    #[serde(default)]
    pub live_mode: bool,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IncomingPaymentDetailUpdateParams {
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub metadata: Field<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncomingPaymentDetailListParams {
    pub after_cursor: Field<String>,
    pub per_page: Field<i64>,
    pub as_of_date_start: Field<NaiveDate>,
    pub as_of_date_end: Field<NaiveDate>,
    pub direction: Field<TransactionDirection>,
    pub metadata: Field<HashMap<String, String>>,
    pub status: Field<IncomingPaymentDetailStatus>,
    pub r#type: Field<IncomingPaymentDetailType>,
    pub virtual_account_id: Field<String>,
}

impl ToQuery for IncomingPaymentDetailListParams {
    fn to_query(&self) -> Result<QueryParams, ConfigError> {
        let mut query = QueryParams::new();
        query
            .push_field("after_cursor", &self.after_cursor)?
            .push_field("per_page", &self.per_page)?
            .push_field("as_of_date_start", &self.as_of_date_start)?
            .push_field("as_of_date_end", &self.as_of_date_end)?
            .push_field("direction", &self.direction)?
            .push_map("metadata", &self.metadata)?
            .push_field("status", &self.status)?
            .push_field("type", &self.r#type)?
            .push_field("virtual_account_id", &self.virtual_account_id)?;
        Ok(query)
    }
}

/// Simulates an incoming payment. Every field is optional; the sandbox
/// fills in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IncomingPaymentDetailCreateAsyncParams {
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub amount: Field<i64>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub as_of_date: Field<NaiveDate>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub currency: Field<Currency>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub description: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub direction: Field<TransactionDirection>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub internal_account_id: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub r#type: Field<IncomingPaymentDetailType>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub virtual_account_id: Field<String>,
    /// Sent as the `Idempotency-Key` header, never in the body.
    #[serde(skip)]
    pub idempotency_key: Field<String>,
}

/// Operations on `api/incoming_payment_details`.
#[derive(Debug, Clone, Copy)]
pub struct IncomingPaymentDetailService<'a> {
    client: &'a ApiClient,
}

impl<'a> IncomingPaymentDetailService<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn get(
        &self,
        id: &str,
        options: &[RequestOption],
    ) -> Result<IncomingPaymentDetail, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<IncomingPaymentDetail>>(
            "incoming_payment_details.get",
            RestMethod::Get,
            "api/incoming_payment_details/{id}",
        );
        let id = require_id(id, "id")?;
        self.client
            .execute(&endpoint, &[("id", id)], Body::Empty, options)
            .await
    }

    /// Updates the metadata of an incoming payment detail.
    pub async fn update(
        &self,
        id: &str,
        params: &IncomingPaymentDetailUpdateParams,
        options: &[RequestOption],
    ) -> Result<IncomingPaymentDetail, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<IncomingPaymentDetail>>(
            "incoming_payment_details.update",
            RestMethod::Patch,
            "api/incoming_payment_details/{id}",
        );
        let id = require_id(id, "id")?;
        self.client
            .execute(&endpoint, &[("id", id)], Body::json(params)?, options)
            .await
    }

    pub async fn list(
        &self,
        params: &IncomingPaymentDetailListParams,
        options: &[RequestOption],
    ) -> Result<Page<IncomingPaymentDetail>, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<Vec<IncomingPaymentDetail>>>(
            "incoming_payment_details.list",
            RestMethod::Get,
            "api/incoming_payment_details",
        );
        self.client
            .list(&endpoint, &[], Body::query(params)?, options)
            .await
    }

    pub fn list_auto_paging(
        &self,
        params: &IncomingPaymentDetailListParams,
        options: &[RequestOption],
    ) -> Result<
        impl Stream<Item = Result<IncomingPaymentDetail, TreasuryError>> + use<>,
        TreasuryError,
    > {
        let config = self.client.request(
            RestMethod::Get,
            "api/incoming_payment_details",
            Body::query(params)?,
            options,
        )?;
        Ok(auto_paging(AutoPager::new(config)))
    }

    /// Queues a simulated incoming payment. The detail itself is created
    /// later; the response only acknowledges the job.
    pub async fn create_async(
        &self,
        params: &IncomingPaymentDetailCreateAsyncParams,
        options: &[RequestOption],
    ) -> Result<AsyncResponse, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<AsyncResponse>>(
            "incoming_payment_details.create_async",
            RestMethod::Post,
            "api/simulations/incoming_payment_details/create_async",
        );
        let options = with_param_key(&params.idempotency_key, options);
        self.client
            .execute(&endpoint, &[], Body::json(params)?, &options)
            .await
    }
}
