//! Payment orders.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use futures::Stream;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::{ReversalService, endpoint, require_id};
use crate::body::{Body, QueryParams, ToQuery};
use crate::client::ApiClient;
use crate::error::{ConfigError, TreasuryError};
use crate::field::Field;
use crate::method::RestMethod;
use crate::options::RequestOption;
use crate::pagination::{AutoPager, Page, auto_paging};
use crate::response::JsonFormat;
use crate::shared::{AsyncResponse, Currency, TransactionDirection};

/// Payment rail.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentOrderType {
    Ach,
    AuBecs,
    Bacs,
    Book,
    Card,
    Check,
    CrossBorder,
    Eft,
    Interac,
    Masav,
    Neft,
    Nics,
    Provxchange,
    Rtp,
    SeBankgirot,
    Sen,
    Sepa,
    Sic,
    Signet,
    Wire,
    Zengin,
    #[serde(other)]
    Unknown,
}

/// Lifecycle state of a payment order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentOrderStatus {
    Approved,
    Cancelled,
    Completed,
    Denied,
    Failed,
    NeedsApproval,
    Pending,
    Processing,
    Returned,
    Reversed,
    Sent,
    #[serde(other)]
    Unknown,
}

/// Processing speed; `high` means same-day ACH or EFT.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentOrderPriority {
    High,
    Normal,
}

/// A payment order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentOrder {
    pub id: String,
    #[serde(default)]
    pub object: String,
    /// Amount in the currency's smallest unit.
    pub amount: i64,
    #[serde(default)]
    pub currency: Option<Currency>,
    pub direction: TransactionDirection,
    pub r#type: PaymentOrderType,
    pub status: PaymentOrderStatus,
    #[serde(default)]
    pub priority: Option<PaymentOrderPriority>,
    #[serde(default)]
    pub originating_account_id: Option<String>,
    #[serde(default)]
    pub receiving_account_id: Option<String>,
    #[serde(default)]
    pub counterparty_id: Option<String>,
    #[serde(default)]
    pub ledger_transaction_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub statement_descriptor: Option<String>,
    #[serde(default)]
    pub remittance_information: Option<String>,
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,
    #[serde(default)]
    pub live_mode: bool,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Parameters for creating a payment order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentOrderCreateParams {
    pub amount: i64,
    pub direction: TransactionDirection,
    pub originating_account_id: String,
    pub r#type: PaymentOrderType,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub currency: Field<Currency>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub receiving_account_id: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub description: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub effective_date: Field<NaiveDate>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub priority: Field<PaymentOrderPriority>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub statement_descriptor: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub remittance_information: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub metadata: Field<HashMap<String, String>>,
}

impl PaymentOrderCreateParams {
    /// Creates params with the required fields set and everything else unset.
    pub fn new(
        amount: i64,
        direction: TransactionDirection,
        r#type: PaymentOrderType,
        originating_account_id: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            direction,
            originating_account_id: originating_account_id.into(),
            r#type,
            currency: Field::Unset,
            receiving_account_id: Field::Unset,
            description: Field::Unset,
            effective_date: Field::Unset,
            priority: Field::Unset,
            statement_descriptor: Field::Unset,
            remittance_information: Field::Unset,
            metadata: Field::Unset,
        }
    }
}

/// Parameters for updating a payment order. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaymentOrderUpdateParams {
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub amount: Field<i64>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub status: Field<PaymentOrderStatus>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub description: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub effective_date: Field<NaiveDate>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub priority: Field<PaymentOrderPriority>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub receiving_account_id: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub counterparty_id: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub metadata: Field<HashMap<String, String>>,
}

/// Filters for listing payment orders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentOrderListParams {
    pub after_cursor: Field<String>,
    pub per_page: Field<i64>,
    pub counterparty_id: Field<String>,
    pub direction: Field<TransactionDirection>,
    pub originating_account_id: Field<String>,
    pub priority: Field<PaymentOrderPriority>,
    pub reference_number: Field<String>,
    pub status: Field<PaymentOrderStatus>,
    pub transaction_id: Field<String>,
    pub r#type: Field<PaymentOrderType>,
    pub effective_date_start: Field<NaiveDate>,
    pub effective_date_end: Field<NaiveDate>,
    /// Matches on metadata; sent as `metadata[key]=value`.
    pub metadata: Field<HashMap<String, String>>,
}

impl ToQuery for PaymentOrderListParams {
    fn to_query(&self) -> Result<QueryParams, ConfigError> {
        let mut query = QueryParams::new();
        query
            .push_field("after_cursor", &self.after_cursor)?
            .push_field("per_page", &self.per_page)?
            .push_field("counterparty_id", &self.counterparty_id)?
            .push_field("direction", &self.direction)?
            .push_field("originating_account_id", &self.originating_account_id)?
            .push_field("priority", &self.priority)?
            .push_field("reference_number", &self.reference_number)?
            .push_field("status", &self.status)?
            .push_field("transaction_id", &self.transaction_id)?
            .push_field("type", &self.r#type)?
            .push_field("effective_date_start", &self.effective_date_start)?
            .push_field("effective_date_end", &self.effective_date_end)?
            .push_map("metadata", &self.metadata)?;
        Ok(query)
    }
}

/// Operations on `api/payment_orders`.
#[derive(Debug, Clone, Copy)]
pub struct PaymentOrderService<'a> {
    client: &'a ApiClient,
}

impl<'a> PaymentOrderService<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Reversals of a payment order.
    pub fn reversals(&self) -> ReversalService<'a> {
        ReversalService::new(self.client)
    }

    /// Creates a payment order.
    pub async fn create(
        &self,
        params: &PaymentOrderCreateParams,
        options: &[RequestOption],
    ) -> Result<PaymentOrder, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<PaymentOrder>>(
            "payment_orders.create",
            RestMethod::Post,
            "api/payment_orders",
        );
        self.client
            .execute(&endpoint, &[], Body::json(params)?, options)
            .await
    }

    /// Gets a payment order by id.
    pub async fn get(
        &self,
        id: &str,
        options: &[RequestOption],
    ) -> Result<PaymentOrder, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<PaymentOrder>>(
            "payment_orders.get",
            RestMethod::Get,
            "api/payment_orders/{id}",
        );
        let id = require_id(id, "id")?;
        self.client
            .execute(&endpoint, &[("id", id)], Body::Empty, options)
            .await
    }

    /// Updates a payment order.
    pub async fn update(
        &self,
        id: &str,
        params: &PaymentOrderUpdateParams,
        options: &[RequestOption],
    ) -> Result<PaymentOrder, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<PaymentOrder>>(
            "payment_orders.update",
            RestMethod::Patch,
            "api/payment_orders/{id}",
        );
        let id = require_id(id, "id")?;
        self.client
            .execute(&endpoint, &[("id", id)], Body::json(params)?, options)
            .await
    }

    /// Lists payment orders, returning the first page.
    pub async fn list(
        &self,
        params: &PaymentOrderListParams,
        options: &[RequestOption],
    ) -> Result<Page<PaymentOrder>, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<Vec<PaymentOrder>>>(
            "payment_orders.list",
            RestMethod::Get,
            "api/payment_orders",
        );
        self.client
            .list(&endpoint, &[], Body::query(params)?, options)
            .await
    }

    /// Lists payment orders, streaming every item across pages.
    pub fn list_auto_paging(
        &self,
        params: &PaymentOrderListParams,
        options: &[RequestOption],
    ) -> Result<impl Stream<Item = Result<PaymentOrder, TreasuryError>> + use<>, TreasuryError>
    {
        let config = self.client.request(
            RestMethod::Get,
            "api/payment_orders",
            Body::query(params)?,
            options,
        )?;
        Ok(auto_paging(AutoPager::new(config)))
    }

    /// Queues a payment order for asynchronous creation.
    pub async fn create_async(
        &self,
        params: &PaymentOrderCreateParams,
        options: &[RequestOption],
    ) -> Result<AsyncResponse, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<AsyncResponse>>(
            "payment_orders.create_async",
            RestMethod::Post,
            "api/payment_orders/create_async",
        );
        self.client
            .execute(&endpoint, &[], Body::json(params)?, options)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_params_skip_unset_fields() {
        let mut params = PaymentOrderCreateParams::new(
            1000,
            TransactionDirection::Credit,
            PaymentOrderType::Ach,
            "0f8e3719-3dfd-4613-9bbf-c0333781b59f",
        );
        params.description = Field::null();

        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(
            value,
            json!({
                "amount": 1000,
                "direction": "credit",
                "originating_account_id": "0f8e3719-3dfd-4613-9bbf-c0333781b59f",
                "type": "ach",
                "description": null,
            })
        );
    }

    #[test]
    fn test_list_params_query() {
        let params = PaymentOrderListParams {
            per_page: Field::Value(25),
            status: PaymentOrderStatus::NeedsApproval.into(),
            metadata: HashMap::from([("Type".to_string(), "Loan".to_string())]).into(),
            ..Default::default()
        };
        let query = params.to_query().unwrap();
        assert_eq!(
            query.encode(),
            "per_page=25&status=needs_approval&metadata%5BType%5D=Loan"
        );
    }

    #[test]
    fn test_payment_order_decodes_unknown_status() {
        let order: PaymentOrder = serde_json::from_value(json!({
            "id": "po_1",
            "amount": 1000,
            "direction": "debit",
            "type": "rtp",
            "status": "something_new",
            "created_at": "2024-01-01T00:00:00Z",
        }))
        .unwrap();
        assert_eq!(order.status, PaymentOrderStatus::Unknown);
        assert_eq!(order.r#type, PaymentOrderType::Rtp);
        assert!(order.metadata.is_empty());
    }
}
