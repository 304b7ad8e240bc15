//! Documents attached to other objects. Uploads are multipart.

use chrono::{DateTime, Utc};
use futures::Stream;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::{endpoint, require_id, with_param_key};
use crate::body::{Body, FilePart, MultipartForm, QueryParams, ToMultipart, ToQuery};
use crate::client::ApiClient;
use crate::error::{ConfigError, TreasuryError};
use crate::field::Field;
use crate::method::RestMethod;
use crate::options::RequestOption;
use crate::pagination::{AutoPager, Page, auto_paging};
use crate::response::JsonFormat;

/// The kind of object a document is attached to, as reported on documents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DocumentableType {
    Case,
    Counterparty,
    ExpectedPayment,
    ExternalAccount,
    InternalAccount,
    Organization,
    PaperItem,
    PaymentOrder,
    Transaction,
    Decision,
    Connection,
    #[serde(other)]
    Unknown,
}

/// The collection a new document is attached to, as sent on upload and list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DocumentableCollection {
    Cases,
    Counterparties,
    ExpectedPayments,
    ExternalAccounts,
    InternalAccounts,
    Organizations,
    PaperItems,
    PaymentOrders,
    Transactions,
    Decisions,
    Connections,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFile {
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub size: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub object: String,
    pub documentable_id: String,
    pub documentable_type: DocumentableType,
    #[serde(default)]
    pub document_type: Option<String>,
    pub file: DocumentFile,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub live_mode: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub discarded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Upload parameters.
///
/// ```rust,ignore
/// let file = FilePart::from_path("invoice.pdf").await?;
/// let params = DocumentCreateParams::new(order_id, DocumentableCollection::PaymentOrders, file);
/// let document = client.documents().create(&params, &[]).await?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentCreateParams {
    pub documentable_id: String,
    pub documentable_type: DocumentableCollection,
    pub file: FilePart,
    /// A category for the document; may be an explicit null.
    pub document_type: Field<String>,
    /// Sent as the `Idempotency-Key` header instead of a generated key.
    pub idempotency_key: Field<String>,
}

impl DocumentCreateParams {
    pub fn new(
        documentable_id: impl Into<String>,
        documentable_type: DocumentableCollection,
        file: FilePart,
    ) -> Self {
        Self {
            documentable_id: documentable_id.into(),
            documentable_type,
            file,
            document_type: Field::Unset,
            idempotency_key: Field::Unset,
        }
    }
}

impl ToMultipart for DocumentCreateParams {
    fn to_multipart(&self) -> Result<MultipartForm, ConfigError> {
        let mut form = MultipartForm::new();
        form.text("documentable_id", self.documentable_id.as_str())
            .text("documentable_type", self.documentable_type.to_string())
            .text_field("document_type", &self.document_type)?
            .file("file", self.file.clone());
        Ok(form)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentListParams {
    pub after_cursor: Field<String>,
    pub per_page: Field<i64>,
    pub documentable_id: Field<String>,
    pub documentable_type: Field<DocumentableCollection>,
}

impl ToQuery for DocumentListParams {
    fn to_query(&self) -> Result<QueryParams, ConfigError> {
        let mut query = QueryParams::new();
        query
            .push_field("after_cursor", &self.after_cursor)?
            .push_field("per_page", &self.per_page)?
            .push_field("documentable_id", &self.documentable_id)?
            .push_field("documentable_type", &self.documentable_type)?;
        Ok(query)
    }
}

/// Operations on `api/documents`.
#[derive(Debug, Clone, Copy)]
pub struct DocumentService<'a> {
    client: &'a ApiClient,
}

impl<'a> DocumentService<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Uploads a document as `multipart/form-data`.
    pub async fn create(
        &self,
        params: &DocumentCreateParams,
        options: &[RequestOption],
    ) -> Result<Document, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<Document>>(
            "documents.create",
            RestMethod::Post,
            "api/documents",
        );
        let options = with_param_key(&params.idempotency_key, options);
        self.client
            .execute(&endpoint, &[], Body::multipart(params)?, &options)
            .await
    }

    pub async fn get(&self, id: &str, options: &[RequestOption]) -> Result<Document, TreasuryError> {
        let endpoint =
            endpoint::<JsonFormat<Document>>("documents.get", RestMethod::Get, "api/documents/{id}");
        let id = require_id(id, "id")?;
        self.client
            .execute(&endpoint, &[("id", id)], Body::Empty, options)
            .await
    }

    pub async fn list(
        &self,
        params: &DocumentListParams,
        options: &[RequestOption],
    ) -> Result<Page<Document>, TreasuryError> {
        let endpoint = endpoint::<JsonFormat<Vec<Document>>>(
            "documents.list",
            RestMethod::Get,
            "api/documents",
        );
        self.client
            .list(&endpoint, &[], Body::query(params)?, options)
            .await
    }

    pub fn list_auto_paging(
        &self,
        params: &DocumentListParams,
        options: &[RequestOption],
    ) -> Result<impl Stream<Item = Result<Document, TreasuryError>> + use<>, TreasuryError> {
        let config =
            self.client
                .request(RestMethod::Get, "api/documents", Body::query(params)?, options)?;
        Ok(auto_paging(AutoPager::new(config)))
    }
}
