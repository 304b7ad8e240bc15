//! Cursor pagination.
//!
//! List endpoints return a JSON array of items. The cursor for the next page
//! comes back in the `X-After-Cursor` header and is sent as the
//! `after_cursor` query parameter. Each [`Page`] keeps the request that
//! produced it, so the next page is always fetched with the same base query.

use std::vec;

use futures::Stream;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::TreasuryError;
use crate::request::RequestConfig;
use crate::response::{JsonFormat, RawResponse};

/// Response header carrying the cursor of the next page.
pub const AFTER_CURSOR_HEADER: &str = "x-after-cursor";
/// Response header carrying the page size.
pub const PER_PAGE_HEADER: &str = "x-per-page";
/// Response header carrying the total number of items.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";
/// Query parameter that selects the page.
pub const AFTER_CURSOR_PARAM: &str = "after_cursor";

/// One page of a list call.
#[derive(Debug, Clone)]
pub struct Page<T> {
    items: Vec<T>,
    after_cursor: Option<String>,
    per_page: Option<u32>,
    total_count: Option<u64>,
    config: RequestConfig,
}

impl<T> Page<T>
where
    T: DeserializeOwned + Send + Sync,
{
    /// Executes `config` and decodes the response as a page.
    pub async fn fetch(config: RequestConfig) -> Result<Self, TreasuryError> {
        let (items, raw) = config
            .execute_with_response::<JsonFormat<Vec<T>>>()
            .await?;
        Ok(Self::from_parts(items, &raw, config))
    }

    fn from_parts(items: Vec<T>, raw: &RawResponse, config: RequestConfig) -> Self {
        let after_cursor = raw
            .header(AFTER_CURSOR_HEADER)
            .filter(|cursor| !cursor.is_empty())
            .map(str::to_string);
        Self {
            items,
            after_cursor,
            per_page: raw.header(PER_PAGE_HEADER).and_then(|v| v.parse().ok()),
            total_count: raw.header(TOTAL_COUNT_HEADER).and_then(|v| v.parse().ok()),
            config,
        }
    }

    /// Returns the items on this page.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consumes the page, returning its items.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Returns the cursor of the next page.
    pub fn after_cursor(&self) -> Option<&str> {
        self.after_cursor.as_deref()
    }

    /// Returns the page size reported by the server.
    pub fn per_page(&self) -> Option<u32> {
        self.per_page
    }

    /// Returns the total item count reported by the server.
    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    /// Returns the request that produced this page.
    pub fn request(&self) -> &RequestConfig {
        &self.config
    }

    /// Returns `true` if the server reported another page.
    pub fn has_next_page(&self) -> bool {
        self.after_cursor.is_some()
    }

    /// Builds the request for the next page, if there is one.
    ///
    /// The request is identical to this page's apart from `after_cursor`.
    /// It is a new logical call, so a generated idempotency key is replaced.
    pub fn next_request(&self) -> Result<Option<RequestConfig>, TreasuryError> {
        let Some(cursor) = &self.after_cursor else {
            return Ok(None);
        };
        let mut config = self.config.clone();
        config.query_mut().set(AFTER_CURSOR_PARAM, cursor.as_str());
        config.regenerate_idempotency_key()?;
        Ok(Some(config))
    }

    /// Fetches the next page.
    ///
    /// Returns `Ok(None)` when this is the last page.
    pub async fn next_page(&self) -> Result<Option<Self>, TreasuryError> {
        match self.next_request()? {
            Some(config) => {
                debug!(cursor = ?self.after_cursor, "fetching next page");
                Ok(Some(Self::fetch(config).await?))
            }
            None => Ok(None),
        }
    }

    /// Turns this page into a stream of every item across all pages.
    ///
    /// ## Examples
    ///
    /// ```rust,ignore
    /// use futures::TryStreamExt;
    ///
    /// let page = client.expected_payments().list(&params, &[]).await?;
    /// let all: Vec<_> = page.into_stream().try_collect().await?;
    /// ```
    pub fn into_stream(mut self) -> impl Stream<Item = Result<T, TreasuryError>> {
        let items = std::mem::take(&mut self.items).into_iter();
        auto_paging(AutoPager::Items(items, self))
    }
}

/// Streams every item of a list call from the given position.
pub fn auto_paging<T>(pager: AutoPager<T>) -> impl Stream<Item = Result<T, TreasuryError>>
where
    T: DeserializeOwned + Send + Sync,
{
    futures::stream::try_unfold(pager, advance)
}

async fn advance<T>(mut pager: AutoPager<T>) -> Result<Option<(T, AutoPager<T>)>, TreasuryError>
where
    T: DeserializeOwned + Send + Sync,
{
    loop {
        pager = match pager {
            AutoPager::Start(config) => AutoPager::from_page(Page::fetch(config).await?),
            AutoPager::Items(mut items, page) => {
                if let Some(item) = items.next() {
                    return Ok(Some((item, AutoPager::Items(items, page))));
                }
                match page.next_page().await? {
                    Some(next) if !next.items.is_empty() => AutoPager::from_page(next),
                    _ => AutoPager::Done,
                }
            }
            AutoPager::Done => return Ok(None),
        };
    }
}

/// Position of an auto-paging stream.
#[derive(Debug)]
pub enum AutoPager<T> {
    /// No page fetched yet.
    Start(RequestConfig),
    /// Remaining items of the current page; the page itself holds the cursor.
    Items(vec::IntoIter<T>, Page<T>),
    /// The last page has been drained.
    Done,
}

impl<T> AutoPager<T> {
    /// Starts from the request of the first page.
    pub fn new(config: RequestConfig) -> Self {
        Self::Start(config)
    }

    fn from_page(mut page: Page<T>) -> Self {
        let items = std::mem::take(&mut page.items).into_iter();
        Self::Items(items, page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Body;
    use crate::method::RestMethod;
    use crate::options::with_idempotency_key;
    use bytes::Bytes;
    use reqwest::StatusCode;
    use reqwest::header::{HeaderMap, HeaderValue};
    use url::Url;

    fn raw(headers: &[(&'static str, &'static str)]) -> RawResponse {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.insert(*name, HeaderValue::from_static(*value));
        }
        RawResponse {
            status: StatusCode::OK,
            headers: map,
            url: Url::parse("https://app.moderntreasury.com/api/returns").unwrap(),
            body: Bytes::from_static(b"[]"),
        }
    }

    fn config(method: RestMethod) -> RequestConfig {
        RequestConfig::new(
            method,
            "api/returns",
            Body::Empty,
            Url::parse("https://app.moderntreasury.com/").unwrap(),
            reqwest::Client::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_page_reads_headers() {
        let page: Page<String> = Page::from_parts(
            vec!["a".to_string()],
            &raw(&[
                ("x-after-cursor", "cur_2"),
                ("x-per-page", "25"),
                ("x-total-count", "103"),
            ]),
            config(RestMethod::Get),
        );
        assert!(page.has_next_page());
        assert_eq!(page.after_cursor(), Some("cur_2"));
        assert_eq!(page.per_page(), Some(25));
        assert_eq!(page.total_count(), Some(103));
    }

    #[test]
    fn test_empty_cursor_is_last_page() {
        let page: Page<String> =
            Page::from_parts(vec![], &raw(&[("x-after-cursor", "")]), config(RestMethod::Get));
        assert!(!page.has_next_page());
        assert!(page.next_request().unwrap().is_none());
    }

    #[test]
    fn test_next_request_only_changes_cursor() {
        let mut first = config(RestMethod::Get);
        first.query_mut().push("status", "pending");
        let page: Page<String> =
            Page::from_parts(vec![], &raw(&[("x-after-cursor", "cur_2")]), first.clone());

        let next = page.next_request().unwrap().unwrap();
        assert_eq!(next.query().get("status"), Some("pending"));
        assert_eq!(next.query().get("after_cursor"), Some("cur_2"));
        assert_eq!(next.path(), first.path());
        assert_eq!(next.headers(), first.headers());
    }

    #[test]
    fn test_next_request_key_handling() {
        let generated = config(RestMethod::Post);
        let page: Page<String> =
            Page::from_parts(vec![], &raw(&[("x-after-cursor", "c")]), generated.clone());
        let next = page.next_request().unwrap().unwrap();
        assert_ne!(next.idempotency_key(), generated.idempotency_key());

        let mut explicit = config(RestMethod::Post);
        explicit.apply(&[with_idempotency_key("fixed")]).unwrap();
        let page: Page<String> =
            Page::from_parts(vec![], &raw(&[("x-after-cursor", "c")]), explicit);
        let next = page.next_request().unwrap().unwrap();
        assert_eq!(next.idempotency_key(), Some("fixed"));
    }
}
