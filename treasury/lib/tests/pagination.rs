//! Integration tests for cursor pagination and auto-paging streams.

use futures::{StreamExt, TryStreamExt};
use serde_json::json;
use treasury_lib::{
    ApiClient, ExpectedPaymentListParams, ExpectedPaymentStatus, Field, RetryPolicy,
};
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ApiClient {
    ApiClient::builder()
        .base_url(server.uri())
        .api_key("test-key")
        .organization_id("test-org")
        .retry_policy(RetryPolicy::none())
        .build()
        .unwrap()
}

fn expected_payment(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "amount_upper_bound": 100,
        "amount_lower_bound": 100,
        "direction": "credit",
        "status": "unreconciled",
        "created_at": "2024-01-01T00:00:00Z"
    })
}

fn page(ids: &[&str], cursor: Option<&str>) -> ResponseTemplate {
    let items: Vec<_> = ids.iter().map(|id| expected_payment(id)).collect();
    let template = ResponseTemplate::new(200).set_body_json(items);
    match cursor {
        Some(cursor) => template.insert_header("x-after-cursor", cursor),
        None => template,
    }
}

/// Mounts three pages: a,b -> c,d -> e.
async fn mount_three_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/expected_payments"))
        .and(query_param_is_missing("after_cursor"))
        .respond_with(page(&["ep_a", "ep_b"], Some("cur_2")))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/expected_payments"))
        .and(query_param("after_cursor", "cur_2"))
        .respond_with(page(&["ep_c", "ep_d"], Some("cur_3")))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/expected_payments"))
        .and(query_param("after_cursor", "cur_3"))
        .respond_with(page(&["ep_e"], None))
        .mount(server)
        .await;
}

/// The next page repeats the original filters with the new cursor.
#[tokio::test]
async fn test_next_page_keeps_filters() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param_is_missing("after_cursor"))
        .and(query_param("status", "unreconciled"))
        .and(query_param("per_page", "2"))
        .respond_with(page(&["ep_a", "ep_b"], Some("cur_2")))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("after_cursor", "cur_2"))
        .and(query_param("status", "unreconciled"))
        .and(query_param("per_page", "2"))
        .respond_with(page(&["ep_c"], None))
        .expect(1)
        .mount(&mock_server)
        .await;

    let params = ExpectedPaymentListParams {
        status: ExpectedPaymentStatus::Unreconciled.into(),
        per_page: Field::Value(2),
        ..Default::default()
    };
    let client = client(&mock_server);
    let first = client.expected_payments().list(&params, &[]).await.unwrap();
    assert_eq!(first.after_cursor(), Some("cur_2"));

    let second = first.next_page().await.unwrap().unwrap();
    assert_eq!(second.items()[0].id, "ep_c");
    assert!(!second.has_next_page());
    assert!(second.next_page().await.unwrap().is_none());
}

/// Auto-paging yields every item in order across pages.
#[tokio::test]
async fn test_auto_paging_collects_all_items() {
    let mock_server = MockServer::start().await;
    mount_three_pages(&mock_server).await;

    let client = client(&mock_server);
    let stream = client
        .expected_payments()
        .list_auto_paging(&ExpectedPaymentListParams::default(), &[])
        .unwrap();
    let ids: Vec<String> = stream.map_ok(|ep| ep.id).try_collect().await.unwrap();

    assert_eq!(ids, ["ep_a", "ep_b", "ep_c", "ep_d", "ep_e"]);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
}

/// Pages are fetched lazily as the stream is consumed.
#[tokio::test]
async fn test_auto_paging_is_lazy() {
    let mock_server = MockServer::start().await;
    mount_three_pages(&mock_server).await;

    let client = client(&mock_server);
    let stream = client
        .expected_payments()
        .list_auto_paging(&ExpectedPaymentListParams::default(), &[])
        .unwrap();
    let first_two: Vec<_> = stream.take(2).try_collect().await.unwrap();

    assert_eq!(first_two.len(), 2);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

/// A page can be turned into a stream that continues from it.
#[tokio::test]
async fn test_page_into_stream() {
    let mock_server = MockServer::start().await;
    mount_three_pages(&mock_server).await;

    let client = client(&mock_server);
    let first = client
        .expected_payments()
        .list(&ExpectedPaymentListParams::default(), &[])
        .await
        .unwrap();
    let all: Vec<_> = first.into_stream().try_collect().await.unwrap();
    assert_eq!(all.len(), 5);
}

/// An empty page ends the stream even if it carries a cursor.
#[tokio::test]
async fn test_auto_paging_stops_on_empty_page() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param_is_missing("after_cursor"))
        .respond_with(page(&["ep_a"], Some("cur_2")))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("after_cursor", "cur_2"))
        .respond_with(page(&[], Some("cur_3")))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("after_cursor", "cur_3"))
        .respond_with(page(&["ep_z"], None))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let items: Vec<_> = client
        .expected_payments()
        .list_auto_paging(&ExpectedPaymentListParams::default(), &[])
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
}

/// A failing page ends the stream with that error.
#[tokio::test]
async fn test_auto_paging_surfaces_errors() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param_is_missing("after_cursor"))
        .respond_with(page(&["ep_a"], Some("cur_2")))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("after_cursor", "cur_2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let results: Vec<_> = client
        .expected_payments()
        .list_auto_paging(&ExpectedPaymentListParams::default(), &[])
        .unwrap()
        .collect()
        .await;

    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    let err = results[1].as_ref().unwrap_err();
    assert_eq!(err.status_code(), Some(500));
}
