//! Ledger transactions and their version history.
//!
//! A ledger transaction is a set of balanced ledger entries. Every update
//! creates a new version, listed through
//! [`LedgerTransactionService::versions`].

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
use crate::shared::TransactionDirection;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LedgerTransactionStatus {
    Archived,
    Pending,
    Posted,
    #[serde(other)]
    Unknown,
}

/// The kind of object a ledger transaction reconciles to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LedgerableType {
    Counterparty,
    ExpectedPayment,
    IncomingPaymentDetail,
    InternalAccount,
    LineItem,
    PaperItem,
    PaymentOrder,
    PaymentOrderAttempt,
    Return,
    Reversal,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: String,
    #[serde(default)]
    pub object: String,
    /// Amount in the ledger account currency's smallest unit.
    pub amount: i64,
    pub direction: TransactionDirection,
    #[serde(default)]
    pub status: Option<LedgerTransactionStatus>,
    pub ledger_account_id: String,
    #[serde(default)]
    pub ledger_account_lock_version: Option<i64>,
    #[serde(default)]
    pub ledger_account_currency: Option<String>,
    #[serde(default)]
    pub ledger_account_currency_exponent: Option<i64>,
    #[serde(default)]
    pub ledger_transaction_id: Option<String>,
    #[serde(default)]
    pub live_mode: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    pub id: String,
    #[serde(default)]
    pub object: String,
    pub status: LedgerTransactionStatus,
    #[serde(default)]
    pub description: Option<String>,
    pub effective_date: NaiveDate,
    #[serde(default)]
    pub effective_at: Option<String>,
    #[serde(default)]
    pub ledger_entries: Vec<LedgerEntry>,
    #[serde(default)]
    pub ledger_id: Option<String>,
    #[serde(default)]
    pub ledgerable_type: Option<LedgerableType>,
    #[serde(default)]
    pub ledgerable_id: Option<String>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub posted_at: Option<String>,
    #[serde(default)]
    pub live_mode: bool,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A point-in-time snapshot of a ledger transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerTransactionVersion {
    pub id: String,
    #[serde(default)]
    pub object: String,
    pub ledger_transaction_id: String,
    pub version: i64,
    pub status: LedgerTransactionStatus,
    #[serde(default)]
    pub description: Option<String>,
    pub effective_date: NaiveDate,
    #[serde(default)]
    pub ledger_entries: Vec<LedgerEntry>,
    #[serde(default)]
    pub ledger_id: Option<String>,
    #[serde(default)]
    pub ledgerable_type: Option<LedgerableType>,
    #[serde(default)]
    pub ledgerable_id: Option<String>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub posted_at: Option<String>,
    #[serde(default)]
    pub live_mode: bool,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
}

/// One side of a new ledger transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntryCreateParams {
    pub amount: i64,
    pub direction: TransactionDirection,
    pub ledger_account_id: String,
    /// Only succeed if the account has not moved past this lock version.
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub lock_version: Field<i64>,
    /// Balance conditions keyed by `gt`, `gte`, `lt`, `lte` or `eq`.
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub pending_balance_amount: Field<HashMap<String, i64>>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub posted_balance_amount: Field<HashMap<String, i64>>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub available_balance_amount: Field<HashMap<String, i64>>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub show_resulting_ledger_account_balances: Field<bool>,
}

impl LedgerEntryCreateParams {
    pub fn new(
        amount: i64,
        direction: TransactionDirection,
        ledger_account_id: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            direction,
            ledger_account_id: ledger_account_id.into(),
            lock_version: Field::Unset,
            pending_balance_amount: Field::Unset,
            posted_balance_amount: Field::Unset,
            available_balance_amount: Field::Unset,
            show_resulting_ledger_account_balances: Field::Unset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerTransactionCreateParams {
    pub effective_date: NaiveDate,
    pub ledger_entries: Vec<LedgerEntryCreateParams>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub description: Field<String>,
    /// Use `posted` to post the transaction on creation.
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub status: Field<LedgerTransactionStatus>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub metadata: Field<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub external_id: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub ledgerable_type: Field<LedgerableType>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub ledgerable_id: Field<String>,
}

impl LedgerTransactionCreateParams {
    pub fn new(effective_date: NaiveDate, ledger_entries: Vec<LedgerEntryCreateParams>) -> Self {
        Self {
            effective_date,
            ledger_entries,
            description: Field::Unset,
            status: Field::Unset,
            metadata: Field::Unset,
            external_id: Field::Unset,
            ledgerable_type: Field::Unset,
            ledgerable_id: Field::Unset,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LedgerTransactionUpdateParams {
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub description: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub status: Field<LedgerTransactionStatus>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub metadata: Field<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub ledger_entries: Field<Vec<LedgerEntryCreateParams>>,
}

/// List filters. The map-valued filters take operator keys such as `gte`
/// or `lt`, and encode as `posted_at[gte]=...`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerTransactionListParams {
    pub after_cursor: Field<String>,
    pub per_page: Field<i64>,
    pub id: Field<HashMap<String, String>>,
    pub metadata: Field<HashMap<String, String>>,
    pub ledger_id: Field<String>,
    pub ledger_account_id: Field<String>,
    pub ledger_account_category_id: Field<String>,
    pub effective_at: Field<HashMap<String, String>>,
    pub effective_date: Field<HashMap<String, String>>,
    pub posted_at: Field<HashMap<String, String>>,
    pub updated_at: Field<HashMap<String, String>>,
    /// Sort direction keyed by `created_at` or `effective_at`.
    pub order_by: Field<HashMap<String, String>>,
    pub status: Field<LedgerTransactionStatus>,
    pub external_id: Field<String>,
}

impl ToQuery for LedgerTransactionListParams {
    fn to_query(&self) -> Result<QueryParams, ConfigError> {
        let mut query = QueryParams::new();
        query
            .push_field("after_cursor", &self.after_cursor)?
            .push_field("per_page", &self.per_page)?
            .push_map("id", &self.id)?
            .push_map("metadata", &self.metadata)?
            .push_field("ledger_id", &self.ledger_id)?
            .push_field("ledger_account_id", &self.ledger_account_id)?
            .push_field("ledger_account_category_id", &self.ledger_account_category_id)?
            .push_map("effective_at", &self.effective_at)?
            .push_map("effective_date", &self.effective_date)?
            .push_map("posted_at", &self.posted_at)?
            .push_map("updated_at", &self.updated_at)?
            .push_map("order_by", &self.order_by)?
            .push_field("status", &self.status)?
            .push_field("external_id", &self.external_id)?;
        Ok(query)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerTransactionVersionListParams {
    pub after_cursor: Field<String>,
    pub per_page: Field<i64>,
    pub created_at: Field<HashMap<String, String>>,
    /// Version bounds keyed by `gt`, `gte`, `lt`, `lte` or `eq`.
    pub version: Field<HashMap<String, i64>>,
}

impl ToQuery for LedgerTransactionVersionListParams {
    fn to_query(&self) -> Result<QueryParams, ConfigError> {
        let mut query = QueryParams::new();
        query
            .push_field("after_cursor", &self.after_cursor)?
            .push_field("per_page", &self.per_page)?
            .push_map("created_at", &self.created_at)?
            .push_map("version", &self.version)?;
        Ok(query)
    }
}

/// Operations on `api/ledger_transactions`.
#[derive(Debug, Clone, Copy)]
pub struct LedgerTransactionService<'a> {
    client: &'a ApiClient,
}

impl<'a> LedgerTransactionService<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// The version history sub-service.
    pub fn versions(&self) -> LedgerTransactionVersionService<'a> {
        LedgerTransactionVersionService::new(self.client)
    }

    pub async fn create(
        &self,
        params: &LedgerTransactionCreateParams,
        options: &[RequestOption],
    ) -> Result<LedgerTransaction, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<LedgerTransaction>>(
            "ledger_transactions.create",
            RestMethod::Post,
            "api/ledger_transactions",
        );
        self.client
            .execute(&endpoint, &[], Body::json(params)?, options)
            .await
    }

    pub async fn get(
        &self,
        id: &str,
        options: &[RequestOption],
    ) -> Result<LedgerTransaction, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<LedgerTransaction>>(
            "ledger_transactions.get",
            RestMethod::Get,
            "api/ledger_transactions/{id}",
        );
        let id = require_id(id, "id")?;
        self.client
            .execute(&endpoint, &[("id", id)], Body::Empty, options)
            .await
    }

    /// Updates a pending ledger transaction. Posted transactions are immutable
    /// apart from metadata, which the API enforces.
    pub async fn update(
        &self,
        id: &str,
        params: &LedgerTransactionUpdateParams,
        options: &[RequestOption],
    ) -> Result<LedgerTransaction, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<LedgerTransaction>>(
            "ledger_transactions.update",
            RestMethod::Patch,
            "api/ledger_transactions/{id}",
        );
        let id = require_id(id, "id")?;
        self.client
            .execute(&endpoint, &[("id", id)], Body::json(params)?, options)
            .await
    }

    pub async fn list(
        &self,
        params: &LedgerTransactionListParams,
        options: &[RequestOption],
    ) -> Result<Page<LedgerTransaction>, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<Vec<LedgerTransaction>>>(
            "ledger_transactions.list",
            RestMethod::Get,
            "api/ledger_transactions",
        );
        self.client
            .list(&endpoint, &[], Body::query(params)?, options)
            .await
    }

    pub fn list_auto_paging(
        &self,
        params: &LedgerTransactionListParams,
        options: &[RequestOption],
    ) -> Result<impl Stream<Item = Result<LedgerTransaction, TreasuryError>> + use<>, TreasuryError>
    {
        let config = self.client.request(
            RestMethod::Get,
            "api/ledger_transactions",
            Body::query(params)?,
            options,
        )?;
        Ok(auto_paging(AutoPager::new(config)))
    }
}

/// Operations on `api/ledger_transactions/{id}/versions`.
#[derive(Debug, Clone, Copy)]
pub struct LedgerTransactionVersionService<'a> {
    client: &'a ApiClient,
}

impl<'a> LedgerTransactionVersionService<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        ledger_transaction_id: &str,
        params: &LedgerTransactionVersionListParams,
        options: &[RequestOption],
    ) -> Result<Page<LedgerTransactionVersion>, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<Vec<LedgerTransactionVersion>>>(
            "ledger_transactions.versions.list",
            RestMethod::Get,
            "api/ledger_transactions/{id}/versions",
        );
        let id = require_id(ledger_transaction_id, "ledger_transaction_id")?;
        self.client
            .list(&endpoint, &[("id", id)], Body::query(params)?, options)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_params_body() {
        let mut params = LedgerTransactionCreateParams::new(
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            vec![
                LedgerEntryCreateParams::new(1000, TransactionDirection::Debit, "la_cash"),
                LedgerEntryCreateParams::new(1000, TransactionDirection::Credit, "la_revenue"),
            ],
        );
        params.status = LedgerTransactionStatus::Posted.into();

        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "effective_date": "2024-05-01",
                "status": "posted",
                "ledger_entries": [
                    {"amount": 1000, "direction": "debit", "ledger_account_id": "la_cash"},
                    {"amount": 1000, "direction": "credit", "ledger_account_id": "la_revenue"},
                ],
            })
        );
    }

    #[test]
    fn test_list_params_bracket_operators() {
        let params = LedgerTransactionListParams {
            ledger_id: "ledger_1".into(),
            posted_at: Field::Value(HashMap::from([
                ("gte".to_string(), "2024-01-01T00:00:00Z".to_string()),
                ("lt".to_string(), "2024-02-01T00:00:00Z".to_string()),
            ])),
            ..Default::default()
        };
        let query = params.to_query().unwrap();
        assert_eq!(query.get("ledger_id"), Some("ledger_1"));
        assert_eq!(query.get("posted_at[gte]"), Some("2024-01-01T00:00:00Z"));
        assert_eq!(query.get("posted_at[lt]"), Some("2024-02-01T00:00:00Z"));
    }

    #[test]
    fn test_version_bounds_encode_as_numbers() {
        let params = LedgerTransactionVersionListParams {
            version: Field::Value(HashMap::from([("gte".to_string(), 3)])),
            ..Default::default()
        };
        let query = params.to_query().unwrap();
        assert_eq!(query.get("version[gte]"), Some("3"));
    }

    #[test]
    fn test_version_decodes() {
        let version: LedgerTransactionVersion = serde_json::from_value(serde_json::json!({
            "id": "ltv_1",
            "object": "ledger_transaction_version",
            "ledger_transaction_id": "lt_1",
            "version": 2,
            "status": "pending",
            "effective_date": "2024-05-01",
            "ledger_entries": [],
            "created_at": "2024-05-01T12:00:00Z",
            "metadata": {}
        }))
        .unwrap();
        assert_eq!(version.version, 2);
        assert_eq!(version.status, LedgerTransactionStatus::Pending);
    }
}
