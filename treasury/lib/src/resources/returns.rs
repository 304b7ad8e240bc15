//! Returns of payment orders, incoming payments and paper items.

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
use crate::shared::Currency;

/// The kind of object being returned.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReturnableType {
    IncomingPaymentDetail,
    PaperItem,
    PaymentOrder,
    Return,
    Reversal,
    #[serde(other)]
    Unknown,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReturnStatus {
    Completed,
    Failed,
    Pending,
    Processing,
    Returned,
    Sent,
    #[serde(other)]
    Unknown,
}

/// Payment rail the return travelled on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReturnType {
    Ach,
    AchNoc,
    AuBecs,
    Bacs,
    Book,
    Eft,
    Interac,
    Manual,
    PaperItem,
    Sepa,
    Wire,
    #[serde(other)]
    Unknown,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReturnRole {
    Originating,
    Receiving,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnReferenceNumber {
    pub id: String,
    pub reference_number: String,
    pub reference_number_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Return {
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub returnable_id: Option<String>,
    #[serde(default)]
    pub returnable_type: Option<ReturnableType>,
    /// Rail return code such as `R01`.
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub date_of_death: Option<NaiveDate>,
    #[serde(default)]
    pub additional_information: Option<String>,
    pub status: ReturnStatus,
    pub r#type: ReturnType,
    #[serde(default)]
    pub role: Option<ReturnRole>,
    pub amount: i64,
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub transaction_line_item_id: Option<String>,
    #[serde(default)]
    pub internal_account_id: Option<String>,
    #[serde(default)]
    pub ledger_transaction_id: Option<String>,
    #[serde(default)]
    pub reference_numbers: Vec<ReturnReferenceNumber>,
    #[serde(default)]
    pub live_mode: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnCreateParams {
    /// Required, but may be an explicit null.
    pub returnable_id: Field<String>,
    pub returnable_type: ReturnableType,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub code: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub reason: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub date_of_death: Field<NaiveDate>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub additional_information: Field<String>,
}

impl ReturnCreateParams {
    pub fn new(returnable_id: impl Into<Field<String>>, returnable_type: ReturnableType) -> Self {
        Self {
            returnable_id: returnable_id.into(),
            returnable_type,
            code: Field::Unset,
            reason: Field::Unset,
            date_of_death: Field::Unset,
            additional_information: Field::Unset,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReturnListParams {
    pub after_cursor: Field<String>,
    pub per_page: Field<i64>,
    pub internal_account_id: Field<String>,
    pub counterparty_id: Field<String>,
    pub returnable_id: Field<String>,
    pub returnable_type: Field<ReturnableType>,
}

impl ToQuery for ReturnListParams {
    fn to_query(&self) -> Result<QueryParams, ConfigError> {
        let mut query = QueryParams::new();
        query
            .push_field("after_cursor", &self.after_cursor)?
            .push_field("per_page", &self.per_page)?
            .push_field("internal_account_id", &self.internal_account_id)?
            .push_field("counterparty_id", &self.counterparty_id)?
            .push_field("returnable_id", &self.returnable_id)?
            .push_field("returnable_type", &self.returnable_type)?;
        Ok(query)
    }
}

/// Operations on `api/returns`.
#[derive(Debug, Clone, Copy)]
pub struct ReturnService<'a> {
    client: &'a ApiClient,
}

impl<'a> ReturnService<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn create(
        &self,
        params: &ReturnCreateParams,
        options: &[RequestOption],
    ) -> Result<Return, TreasuryError> {
        let endpoint =
            endpoint::<JsonFormat<Return>>("returns.create", RestMethod::Post, "api/returns");
        self.client
            .execute(&endpoint, &[], Body::json(params)?, options)
            .await
    }

    pub async fn get(&self, id: &str, options: &[RequestOption]) -> Result<Return, TreasuryError> {
        let endpoint =
            endpoint::<JsonFormat<Return>>("returns.get", RestMethod::Get, "api/returns/{id}");
        let id = require_id(id, "id")?;
        self.client
            .execute(&endpoint, &[("id", id)], Body::Empty, options)
            .await
    }

    pub async fn list(
        &self,
        params: &ReturnListParams,
        options: &[RequestOption],
    ) -> Result<Page<Return>, TreasuryError> {
        let endpoint =
            endpoint::<JsonFormat<Vec<Return>>>("returns.list", RestMethod::Get, "api/returns");
        self.client
            .list(&endpoint, &[], Body::query(params)?, options)
            .await
    }

    pub fn list_auto_paging(
        &self,
        params: &ReturnListParams,
        options: &[RequestOption],
    ) -> Result<impl Stream<Item = Result<Return, TreasuryError>> + use<>, TreasuryError> {
        let config =
            self.client
                .request(RestMethod::Get, "api/returns", Body::query(params)?, options)?;
        Ok(auto_paging(AutoPager::new(config)))
    }
}
