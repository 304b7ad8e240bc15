//! External accounts: accounts belonging to counterparties.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::{PaymentOrderType, endpoint, require_id};
use crate::body::{Body, QueryParams, ToQuery};
use crate::client::ApiClient;
use crate::error::{ConfigError, TreasuryError};
use crate::field::Field;
use crate::method::RestMethod;
use crate::options::RequestOption;
use crate::pagination::Page;
use crate::response::{EmptyFormat, JsonFormat};
use crate::shared::Currency;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExternalAccountType {
    Cash,
    Checking,
    GeneralLedger,
    Loan,
    NonResident,
    Other,
    Overdraft,
    Savings,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PartyType {
    Business,
    Individual,
}

/// Micro-deposit verification progress.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VerificationStatus {
    PendingVerification,
    Unverified,
    Verified,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalAccount {
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub account_type: Option<ExternalAccountType>,
    #[serde(default)]
    pub counterparty_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub party_name: Option<String>,
    #[serde(default)]
    pub party_type: Option<PartyType>,
    pub verification_status: VerificationStatus,
    #[serde(default)]
    pub live_mode: bool,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExternalAccountCreateParams {
    /// Required by the API, but may be an explicit null.
    pub counterparty_id: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub account_type: Field<ExternalAccountType>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub party_type: Field<PartyType>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub name: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub party_name: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub party_identifier: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub plaid_processor_token: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub metadata: Field<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExternalAccountUpdateParams {
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub account_type: Field<ExternalAccountType>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub party_type: Field<PartyType>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub counterparty_id: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub name: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub party_name: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub metadata: Field<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalAccountListParams {
    pub after_cursor: Field<String>,
    pub per_page: Field<i64>,
    pub party_name: Field<String>,
    pub counterparty_id: Field<String>,
    pub metadata: Field<HashMap<String, String>>,
}

impl ToQuery for ExternalAccountListParams {
    fn to_query(&self) -> Result<QueryParams, ConfigError> {
        let mut query = QueryParams::new();
        query
            .push_field("after_cursor", &self.after_cursor)?
            .push_field("per_page", &self.per_page)?
            .push_field("party_name", &self.party_name)?
            .push_field("counterparty_id", &self.counterparty_id)?
            .push_map("metadata", &self.metadata)?;
        Ok(query)
    }
}

/// Starts micro-deposit verification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalAccountVerifyParams {
    pub originating_account_id: String,
    pub payment_type: PaymentOrderType,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub currency: Field<Currency>,
}

/// The micro-deposit amounts the account holder observed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExternalAccountCompleteVerificationParams {
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub amounts: Field<Vec<i64>>,
}

/// Operations on `api/external_accounts`.
#[derive(Debug, Clone, Copy)]
pub struct ExternalAccountService<'a> {
    client: &'a ApiClient,
}

impl<'a> ExternalAccountService<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn create(
        &self,
        params: &ExternalAccountCreateParams,
        options: &[RequestOption],
    ) -> Result<ExternalAccount, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<ExternalAccount>>(
            "external_accounts.create",
            RestMethod::Post,
            "api/external_accounts",
        );
        self.client
            .execute(&endpoint, &[], Body::json(params)?, options)
            .await
    }

    pub async fn get(
        &self,
        id: &str,
        options: &[RequestOption],
    ) -> Result<ExternalAccount, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<ExternalAccount>>(
            "external_accounts.get",
            RestMethod::Get,
            "api/external_accounts/{id}",
        );
        let id = require_id(id, "id")?;
        self.client
            .execute(&endpoint, &[("id", id)], Body::Empty, options)
            .await
    }

    pub async fn update(
        &self,
        id: &str,
        params: &ExternalAccountUpdateParams,
        options: &[RequestOption],
    ) -> Result<ExternalAccount, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<ExternalAccount>>(
            "external_accounts.update",
            RestMethod::Patch,
            "api/external_accounts/{id}",
        );
        let id = require_id(id, "id")?;
        self.client
            .execute(&endpoint, &[("id", id)], Body::json(params)?, options)
            .await
    }

    pub async fn list(
        &self,
        params: &ExternalAccountListParams,
        options: &[RequestOption],
    ) -> Result<Page<ExternalAccount>, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<Vec<ExternalAccount>>>(
            "external_accounts.list",
            RestMethod::Get,
            "api/external_accounts",
        );
        self.client
            .list(&endpoint, &[], Body::query(params)?, options)
            .await
    }

    /// Deletes an external account. The response has no body.
    pub async fn delete(&self, id: &str, options: &[RequestOption]) -> Result<(), TreasuryError> {
        let endpoint = endpoint::<EmptyFormat>(
            "external_accounts.delete",
            RestMethod::Delete,
            "api/external_accounts/{id}",
        );
        let id = require_id(id, "id")?;
        self.client
            .execute(&endpoint, &[("id", id)], Body::Empty, options)
            .await
    }

    /// Sends micro-deposits to verify the account.
    pub async fn verify(
        &self,
        id: &str,
        params: &ExternalAccountVerifyParams,
        options: &[RequestOption],
    ) -> Result<ExternalAccount, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<ExternalAccount>>(
            "external_accounts.verify",
            RestMethod::Post,
            "api/external_accounts/{id}/verify",
        );
        let id = require_id(id, "id")?;
        self.client
            .execute(&endpoint, &[("id", id)], Body::json(params)?, options)
            .await
    }

    /// Completes verification with the observed micro-deposit amounts.
    pub async fn complete_verification(
        &self,
        id: &str,
        params: &ExternalAccountCompleteVerificationParams,
        options: &[RequestOption],
    ) -> Result<ExternalAccount, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<ExternalAccount>>(
            "external_accounts.complete_verification",
            RestMethod::Post,
            "api/external_accounts/{id}/complete_verification",
        );
        let id = require_id(id, "id")?;
        self.client
            .execute(&endpoint, &[("id", id)], Body::json(params)?, options)
            .await
    }
}
