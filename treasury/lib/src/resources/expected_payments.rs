//! Expected payments: payments you expect to receive or send, used for
//! reconciliation.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use futures::Stream;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::{endpoint, require_id};
use crate::body::{Body, QueryParams, ToQuery};
use crate::client::ApiClient;
use crate::error::{ConfigError, TreasuryError};
use crate::field::Field;
use crate::method::RestMethod;
use crate::options::RequestOption;
use crate::pagination::{AutoPager, Page, auto_paging};
use crate::response::JsonFormat;
use crate::shared::{Currency, TransactionDirection};

/// Reconciliation state of an expected payment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExpectedPaymentStatus {
    Archived,
    Reconciled,
    Unreconciled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedPayment {
    pub id: String,
    #[serde(default)]
    pub object: String,
    /// Upper bound of the expected amount, in the currency's smallest unit.
    pub amount_upper_bound: i64,
    /// Lower bound of the expected amount, in the currency's smallest unit.
    pub amount_lower_bound: i64,
    pub direction: TransactionDirection,
    pub status: ExpectedPaymentStatus,
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub r#type: Option<String>,
    #[serde(default)]
    pub internal_account_id: Option<String>,
    #[serde(default)]
    pub counterparty_id: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub date_lower_bound: Option<NaiveDate>,
    #[serde(default)]
    pub date_upper_bound: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub statement_descriptor: Option<String>,
    #[serde(default)]
    pub remittance_information: Option<String>,
    #[serde(default)]
    pub live_mode: bool,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpectedPaymentCreateParams {
    pub amount_upper_bound: i64,
    pub amount_lower_bound: i64,
    pub direction: TransactionDirection,
    pub internal_account_id: String,
    /// Payment rail, such as `ach` or `wire`.
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub r#type: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub currency: Field<Currency>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub date_lower_bound: Field<NaiveDate>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub date_upper_bound: Field<NaiveDate>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub description: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub statement_descriptor: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub counterparty_id: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub remittance_information: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub metadata: Field<HashMap<String, String>>,
}

impl ExpectedPaymentCreateParams {
    pub fn new(
        amount_lower_bound: i64,
        amount_upper_bound: i64,
        direction: TransactionDirection,
        internal_account_id: impl Into<String>,
    ) -> Self {
        Self {
            amount_upper_bound,
            amount_lower_bound,
            direction,
            internal_account_id: internal_account_id.into(),
            r#type: Field::Unset,
            currency: Field::Unset,
            date_lower_bound: Field::Unset,
            date_upper_bound: Field::Unset,
            description: Field::Unset,
            statement_descriptor: Field::Unset,
            counterparty_id: Field::Unset,
            remittance_information: Field::Unset,
            metadata: Field::Unset,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExpectedPaymentUpdateParams {
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub amount_upper_bound: Field<i64>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub amount_lower_bound: Field<i64>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub direction: Field<TransactionDirection>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub internal_account_id: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub r#type: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub currency: Field<Currency>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub date_lower_bound: Field<NaiveDate>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub date_upper_bound: Field<NaiveDate>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub description: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub statement_descriptor: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub counterparty_id: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub remittance_information: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub metadata: Field<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpectedPaymentListParams {
    pub after_cursor: Field<String>,
    pub per_page: Field<i64>,
    pub status: Field<ExpectedPaymentStatus>,
    pub internal_account_id: Field<String>,
    pub direction: Field<TransactionDirection>,
    pub r#type: Field<String>,
    pub counterparty_id: Field<String>,
    pub metadata: Field<HashMap<String, String>>,
    pub created_at_lower_bound: Field<DateTime<Utc>>,
    pub created_at_upper_bound: Field<DateTime<Utc>>,
}

impl ToQuery for ExpectedPaymentListParams {
    fn to_query(&self) -> Result<QueryParams, ConfigError> {
        let mut query = QueryParams::new();
        query
            .push_field("after_cursor", &self.after_cursor)?
            .push_field("per_page", &self.per_page)?
            .push_field("status", &self.status)?
            .push_field("internal_account_id", &self.internal_account_id)?
            .push_field("direction", &self.direction)?
            .push_field("type", &self.r#type)?
            .push_field("counterparty_id", &self.counterparty_id)?
            .push_map("metadata", &self.metadata)?
            .push_field("created_at_lower_bound", &self.created_at_lower_bound)?
            .push_field("created_at_upper_bound", &self.created_at_upper_bound)?;
        Ok(query)
    }
}

/// Operations on `api/expected_payments`.
#[derive(Debug, Clone, Copy)]
pub struct ExpectedPaymentService<'a> {
    client: &'a ApiClient,
}

impl<'a> ExpectedPaymentService<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn create(
        &self,
        params: &ExpectedPaymentCreateParams,
        options: &[RequestOption],
    ) -> Result<ExpectedPayment, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<ExpectedPayment>>(
            "expected_payments.create",
            RestMethod::Post,
            "api/expected_payments",
        );
        self.client
            .execute(&endpoint, &[], Body::json(params)?, options)
            .await
    }

    pub async fn get(
        &self,
        id: &str,
        options: &[RequestOption],
    ) -> Result<ExpectedPayment, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<ExpectedPayment>>(
            "expected_payments.get",
            RestMethod::Get,
            "api/expected_payments/{id}",
        );
        let id = require_id(id, "id")?;
        self.client
            .execute(&endpoint, &[("id", id)], Body::Empty, options)
            .await
    }

    pub async fn update(
        &self,
        id: &str,
        params: &ExpectedPaymentUpdateParams,
        options: &[RequestOption],
    ) -> Result<ExpectedPayment, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<ExpectedPayment>>(
            "expected_payments.update",
            RestMethod::Patch,
            "api/expected_payments/{id}",
        );
        let id = require_id(id, "id")?;
        self.client
            .execute(&endpoint, &[("id", id)], Body::json(params)?, options)
            .await
    }

    pub async fn list(
        &self,
        params: &ExpectedPaymentListParams,
        options: &[RequestOption],
    ) -> Result<Page<ExpectedPayment>, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<Vec<ExpectedPayment>>>(
            "expected_payments.list",
            RestMethod::Get,
            "api/expected_payments",
        );
        self.client
            .list(&endpoint, &[], Body::query(params)?, options)
            .await
    }

    /// Streams every expected payment matching `params` across pages.
    pub fn list_auto_paging(
        &self,
        params: &ExpectedPaymentListParams,
        options: &[RequestOption],
    ) -> Result<impl Stream<Item = Result<ExpectedPayment, TreasuryError>> + use<>, TreasuryError>
    {
        let config = self.client.request(
            RestMethod::Get,
            "api/expected_payments",
            Body::query(params)?,
            options,
        )?;
        Ok(auto_paging(AutoPager::new(config)))
    }

    /// Deletes an expected payment, returning it as it was.
    pub async fn delete(
        &self,
        id: &str,
        options: &[RequestOption],
    ) -> Result<ExpectedPayment, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<ExpectedPayment>>(
            "expected_payments.delete",
            RestMethod::Delete,
            "api/expected_payments/{id}",
        );
        let id = require_id(id, "id")?;
        self.client
            .execute(&endpoint, &[("id", id)], Body::Empty, options)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_list_params_encode_timestamps() {
        let params = ExpectedPaymentListParams {
            status: ExpectedPaymentStatus::Unreconciled.into(),
            created_at_lower_bound: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap().into(),
            ..Default::default()
        };
        let query = params.to_query().unwrap();
        assert_eq!(query.get("status"), Some("unreconciled"));
        assert_eq!(
            query.get("created_at_lower_bound"),
            Some("2024-03-01T00:00:00Z")
        );
    }

    #[test]
    fn test_update_params_send_explicit_null() {
        let params = ExpectedPaymentUpdateParams {
            description: Field::null(),
            amount_upper_bound: Field::Value(5000),
            ..Default::default()
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"amount_upper_bound": 5000, "description": null})
        );
    }
}
