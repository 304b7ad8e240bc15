//! Payment flows: hosted flows where a counterparty supplies account
//! details that become a payment order.

use chrono::{DateTime, Utc};
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
use crate::shared::TransactionDirection;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentFlowStatus {
    Cancelled,
    Completed,
    Expired,
    Pending,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentFlow {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
    /// Token handed to the embedded flow on the front end.
    #[serde(default)]
    pub client_token: Option<String>,
    #[serde(default)]
    pub counterparty_id: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub direction: Option<TransactionDirection>,
    #[serde(default)]
    pub originating_account_id: Option<String>,
    #[serde(default)]
    pub payment_order_id: Option<String>,
    #[serde(default)]
    pub receiving_account_id: Option<String>,
    #[serde(default)]
    pub status: Option<PaymentFlowStatus>,
    #[serde(default)]
    pub live_mode: Option<bool>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentFlowCreateParams {
    pub amount: i64,
    pub counterparty_id: String,
    /// ISO 4217 code; payment flows accept any currency string.
    pub currency: String,
    pub direction: TransactionDirection,
    pub originating_account_id: String,
    #[serde(skip)]
    pub idempotency_key: Field<String>,
}

impl PaymentFlowCreateParams {
    pub fn new(
        amount: i64,
        counterparty_id: impl Into<String>,
        currency: impl Into<String>,
        direction: TransactionDirection,
        originating_account_id: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            counterparty_id: counterparty_id.into(),
            currency: currency.into(),
            direction,
            originating_account_id: originating_account_id.into(),
            idempotency_key: Field::Unset,
        }
    }
}

/// Carries only the optional `Idempotency-Key` header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentFlowGetParams {
    pub idempotency_key: Field<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentFlowUpdateParams {
    /// The only supported transition is to `cancelled`.
    pub status: PaymentFlowStatus,
    #[serde(skip)]
    pub idempotency_key: Field<String>,
}

impl PaymentFlowUpdateParams {
    pub fn cancel() -> Self {
        Self {
            status: PaymentFlowStatus::Cancelled,
            idempotency_key: Field::Unset,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentFlowListParams {
    pub after_cursor: Field<String>,
    pub per_page: Field<i64>,
    pub client_token: Field<String>,
    pub counterparty_id: Field<String>,
    pub originating_account_id: Field<String>,
    pub payment_order_id: Field<String>,
    pub receiving_account_id: Field<String>,
    pub status: Field<String>,
}

impl ToQuery for PaymentFlowListParams {
    fn to_query(&self) -> Result<QueryParams, ConfigError> {
        let mut query = QueryParams::new();
        query
            .push_field("after_cursor", &self.after_cursor)?
            .push_field("per_page", &self.per_page)?
            .push_field("client_token", &self.client_token)?
            .push_field("counterparty_id", &self.counterparty_id)?
            .push_field("originating_account_id", &self.originating_account_id)?
            .push_field("payment_order_id", &self.payment_order_id)?
            .push_field("receiving_account_id", &self.receiving_account_id)?
            .push_field("status", &self.status)?;
        Ok(query)
    }
}

/// Operations on `api/payment_flows`.
#[derive(Debug, Clone, Copy)]
pub struct PaymentFlowService<'a> {
    client: &'a ApiClient,
}

impl<'a> PaymentFlowService<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn create(
        &self,
        params: &PaymentFlowCreateParams,
        options: &[RequestOption],
    ) -> Result<PaymentFlow, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<PaymentFlow>>(
            "payment_flows.create",
            RestMethod::Post,
            "api/payment_flows",
        );
        let options = with_param_key(&params.idempotency_key, options);
        self.client
            .execute(&endpoint, &[], Body::json(params)?, &options)
            .await
    }

    pub async fn get(
        &self,
        id: &str,
        params: &PaymentFlowGetParams,
        options: &[RequestOption],
    ) -> Result<PaymentFlow, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<PaymentFlow>>(
            "payment_flows.get",
            RestMethod::Get,
            "api/payment_flows/{id}",
        );
        let id = require_id(id, "id")?;
        let options = with_param_key(&params.idempotency_key, options);
        self.client
            .execute(&endpoint, &[("id", id)], Body::Empty, &options)
            .await
    }

    pub async fn update(
        &self,
        id: &str,
        params: &PaymentFlowUpdateParams,
        options: &[RequestOption],
    ) -> Result<PaymentFlow, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<PaymentFlow>>(
            "payment_flows.update",
            RestMethod::Patch,
            "api/payment_flows/{id}",
        );
        let id = require_id(id, "id")?;
        let options = with_param_key(&params.idempotency_key, options);
        self.client
            .execute(&endpoint, &[("id", id)], Body::json(params)?, &options)
            .await
    }

    pub async fn list(
        &self,
        params: &PaymentFlowListParams,
        options: &[RequestOption],
    ) -> Result<Page<PaymentFlow>, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<Vec<PaymentFlow>>>(
            "payment_flows.list",
            RestMethod::Get,
            "api/payment_flows",
        );
        self.client
            .list(&endpoint, &[], Body::query(params)?, options)
            .await
    }

    pub fn list_auto_paging(
        &self,
        params: &PaymentFlowListParams,
        options: &[RequestOption],
    ) -> Result<impl Stream<Item = Result<PaymentFlow, TreasuryError>> + use<>, TreasuryError> {
        let config = self.client.request(
            RestMethod::Get,
            "api/payment_flows",
            Body::query(params)?,
            options,
        )?;
        Ok(auto_paging(AutoPager::new(config)))
    }
}
