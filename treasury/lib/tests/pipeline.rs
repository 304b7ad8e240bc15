//! Integration tests for the request pipeline: headers, idempotency keys,
//! retries, timeouts and cancellation.
//!
//! Each test runs against a wiremock server standing in for the API.

use std::time::{Duration, Instant};

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use treasury_lib::options::{
    with_cancellation, with_header, with_idempotency_key, with_max_retries,
    with_request_timeout, with_response_into,
};
use treasury_lib::{
    ApiClient, CancellationToken, ClientError, ExpectedPaymentListParams,
    PaymentOrderCreateParams, PaymentOrderType, ResponseSlot, RetryPolicy, TransactionDirection,
    TreasuryError,
};
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn payment_order_json() -> serde_json::Value {
    json!({
        "id": "po_1",
        "object": "payment_order",
        "amount": 1000,
        "currency": "USD",
        "direction": "credit",
        "type": "ach",
        "status": "pending",
        "created_at": "2024-01-01T00:00:00Z"
    })
}

fn create_params() -> PaymentOrderCreateParams {
    PaymentOrderCreateParams::new(
        1000,
        TransactionDirection::Credit,
        PaymentOrderType::Ach,
        "0f8e3719-3dfd-4613-9bbf-c0333781b59f",
    )
}

/// Builds a client for `server` that retries without sleeping.
fn client(server: &MockServer, max_retries: u32) -> ApiClient {
    ApiClient::builder()
        .base_url(server.uri())
        .api_key("test-key")
        .organization_id("test-org")
        .retry_policy(RetryPolicy::immediate(max_retries))
        .build()
        .unwrap()
}

fn idempotency_key(request: &Request) -> Option<String> {
    request
        .headers
        .get("idempotency-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Basic auth is built from `organization_id:api_key`.
#[tokio::test]
async fn test_basic_auth_and_platform_headers() {
    let mock_server = MockServer::start().await;
    let expected = format!("Basic {}", BASE64.encode("test-org:test-key"));

    Mock::given(method("GET"))
        .and(path("/api/payment_orders/po_1"))
        .and(header("authorization", expected.as_str()))
        .and(header("accept", "application/json"))
        .and(header("x-stainless-lang", "rust"))
        .and(header_exists("x-stainless-package-version"))
        .and(header_exists("x-stainless-os"))
        .and(header_exists("x-stainless-arch"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payment_order_json()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server, 0);
    let order = client.payment_orders().get("po_1", &[]).await.unwrap();
    assert_eq!(order.amount, 1000);
}

/// A POST carries a generated idempotency key; a GET does not.
#[tokio::test]
async fn test_idempotency_key_only_on_mutating_calls() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/payment_orders"))
        .respond_with(ResponseTemplate::new(201).set_body_json(payment_order_json()))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/payment_orders/po_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payment_order_json()))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server, 0);
    client.payment_orders().create(&create_params(), &[]).await.unwrap();
    client.payment_orders().get("po_1", &[]).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    let key = idempotency_key(&requests[0]).unwrap();
    assert!(key.starts_with("treasury-rust-"));
    assert!(idempotency_key(&requests[1]).is_none());
}

/// Two logical calls never share a key.
#[tokio::test]
async fn test_idempotency_key_unique_per_call() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(payment_order_json()))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server, 0);
    client.payment_orders().create(&create_params(), &[]).await.unwrap();
    client.payment_orders().create(&create_params(), &[]).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let first = idempotency_key(&requests[0]).unwrap();
    let second = idempotency_key(&requests[1]).unwrap();
    assert_ne!(first, second);
}

/// Retries of one call reuse its key.
#[tokio::test]
async fn test_idempotency_key_stable_across_retries() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(payment_order_json()))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server, 2);
    let order = client.payment_orders().create(&create_params(), &[]).await.unwrap();
    assert_eq!(order.id, "po_1");

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    let keys: Vec<_> = requests.iter().map(idempotency_key).collect();
    assert!(keys[0].is_some());
    assert!(keys.iter().all(|k| k == &keys[0]));
}

/// A caller-supplied key is sent as is.
#[tokio::test]
async fn test_explicit_idempotency_key() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("idempotency-key", "order-42"))
        .respond_with(ResponseTemplate::new(201).set_body_json(payment_order_json()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server, 0);
    client
        .payment_orders()
        .create(&create_params(), &[with_idempotency_key("order-42")])
        .await
        .unwrap();
}

/// A retryable status is retried until the budget runs out.
#[tokio::test]
async fn test_retry_budget_exhausted() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"errors": {
            "code": "service_unavailable",
            "message": "try again"
        }})))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server, 2);
    let err = client.payment_orders().get("po_1", &[]).await.unwrap_err();

    assert_eq!(err.status_code(), Some(503));
    let api = err.as_api_error().unwrap();
    assert_eq!(api.detail().unwrap().message.as_deref(), Some("try again"));
}

/// A per-call retry budget overrides the client's.
#[tokio::test]
async fn test_per_call_max_retries() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server, 3);
    let err = client
        .payment_orders()
        .get("po_1", &[with_max_retries(0)])
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(500));
}

/// `x-should-retry: false` stops a retry the status would allow.
#[tokio::test]
async fn test_should_retry_header_false() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).insert_header("x-should-retry", "false"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server, 2);
    let err = client.payment_orders().get("po_1", &[]).await.unwrap_err();
    assert!(matches!(err, TreasuryError::Api(_)));
}

/// `x-should-retry: true` forces a retry of a non-retryable status.
#[tokio::test]
async fn test_should_retry_header_true() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).insert_header("x-should-retry", "true"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payment_order_json()))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server, 2);
    let order = client.payment_orders().get("po_1", &[]).await.unwrap();
    assert_eq!(order.id, "po_1");
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

/// A 4xx without the header is returned after one attempt.
#[tokio::test]
async fn test_client_error_not_retried() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({"errors": {
            "code": "parameter_invalid",
            "message": "amount must be positive",
            "parameter": "amount"
        }})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server, 2);
    let err = client.payment_orders().get("po_1", &[]).await.unwrap_err();
    let detail = err.as_api_error().unwrap().detail().unwrap();
    assert_eq!(detail.parameter.as_deref(), Some("amount"));
}

/// An attempt slower than the timeout fails with a timeout error.
#[tokio::test]
async fn test_request_timeout() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(payment_order_json())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let client = client(&mock_server, 0);
    let err = client
        .payment_orders()
        .get("po_1", &[with_request_timeout(Duration::from_millis(100))])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TreasuryError::Client(ClientError::Timeout { duration_ms: 100 })
    ));
}

/// Timeouts are retried like other transport failures.
#[tokio::test]
async fn test_timeout_is_retried() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(payment_order_json())
                .set_delay(Duration::from_secs(2)),
        )
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payment_order_json()))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server, 1);
    let order = client
        .payment_orders()
        .get("po_1", &[with_request_timeout(Duration::from_millis(200))])
        .await
        .unwrap();
    assert_eq!(order.id, "po_1");
}

/// A token cancelled up front stops the call before anything is sent.
#[tokio::test]
async fn test_cancelled_before_send() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payment_order_json()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let token = CancellationToken::new();
    token.cancel();

    let client = client(&mock_server, 2);
    let err = client
        .payment_orders()
        .get("po_1", &[with_cancellation(&token)])
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
}

/// Cancelling mid-flight aborts the attempt without waiting for it.
#[tokio::test]
async fn test_cancelled_during_request() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(payment_order_json())
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&mock_server)
        .await;

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let client = client(&mock_server, 2);
    let started = Instant::now();
    let err = client
        .payment_orders()
        .get("po_1", &[with_cancellation(&token)])
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert!(started.elapsed() < Duration::from_secs(5));
}

/// Cancelling during backoff stops further attempts.
#[tokio::test]
async fn test_cancelled_during_backoff() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).insert_header("retry-after", "30"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let client = client(&mock_server, 2);
    let err = client
        .payment_orders()
        .get("po_1", &[with_cancellation(&token)])
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
}

/// Serves one response whose headers promise 100 body bytes, then stalls
/// after sending a few of them. Returns the server's base URL.
async fn stalled_body_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 8192];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(
                        b"HTTP/1.1 200 OK\r\n\
                          content-type: application/json\r\n\
                          content-length: 100\r\n\r\n\
                          {\"id\":",
                    )
                    .await;
                let _ = socket.flush().await;
                tokio::time::sleep(Duration::from_secs(30)).await;
            });
        }
    });
    format!("http://{addr}")
}

fn stalled_client(base_url: &str) -> ApiClient {
    ApiClient::builder()
        .base_url(base_url)
        .api_key("test-key")
        .organization_id("test-org")
        .retry_policy(RetryPolicy::none())
        .build()
        .unwrap()
}

/// Cancelling while the body is still arriving aborts the call.
#[tokio::test]
async fn test_cancelled_during_stalled_body() {
    let base_url = stalled_body_server().await;

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.cancel();
    });

    let client = stalled_client(&base_url);
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        client
            .payment_orders()
            .get("po_1", &[with_cancellation(&token)]),
    )
    .await
    .expect("call did not return after cancellation");

    assert!(result.unwrap_err().is_cancelled());
}

/// The per-attempt timeout also bounds reading the body.
#[tokio::test]
async fn test_timeout_covers_stalled_body() {
    let base_url = stalled_body_server().await;

    let client = stalled_client(&base_url);
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        client
            .payment_orders()
            .get("po_1", &[with_request_timeout(Duration::from_millis(300))]),
    )
    .await
    .expect("call did not return after its timeout");

    assert!(matches!(
        result,
        Err(TreasuryError::Client(ClientError::Timeout { duration_ms: 300 }))
    ));
}

/// A `Retry-After` too large to represent falls back to the computed delay.
#[tokio::test]
async fn test_oversized_retry_after_is_ignored() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(503).insert_header("retry-after", "99999999999999999999"),
        )
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payment_order_json()))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server, 1);
    let order = client.payment_orders().get("po_1", &[]).await.unwrap();
    assert_eq!(order.id, "po_1");
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

/// The server's `Retry-After` replaces the exponential backoff.
#[tokio::test]
async fn test_retry_after_overrides_backoff() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).insert_header("retry-after", "1"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payment_order_json()))
        .mount(&mock_server)
        .await;

    // Without the header the first retry would wait 30s.
    let policy = RetryPolicy::default().with_max_retries(1).with_delays(
        Duration::from_secs(30),
        Duration::from_secs(60),
        Duration::ZERO,
    );
    let client = ApiClient::builder()
        .base_url(mock_server.uri())
        .api_key("test-key")
        .organization_id("test-org")
        .retry_policy(policy)
        .build()
        .unwrap();

    let started = Instant::now();
    let order = client.payment_orders().get("po_1", &[]).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(order.id, "po_1");
    assert!(elapsed >= Duration::from_secs(1), "waited {elapsed:?}");
    assert!(elapsed < Duration::from_secs(10), "waited {elapsed:?}");
}

/// The raw response of a successful call lands in the caller's slot.
#[tokio::test]
async fn test_response_slot_receives_raw_response() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(payment_order_json())
                .insert_header("x-request-id", "req_123"),
        )
        .mount(&mock_server)
        .await;

    let slot = ResponseSlot::new();
    let client = client(&mock_server, 0);
    client
        .payment_orders()
        .get("po_1", &[with_response_into(&slot)])
        .await
        .unwrap();

    let raw = slot.take().unwrap();
    assert_eq!(raw.status, 200);
    assert_eq!(raw.header("x-request-id"), Some("req_123"));
}

/// Client-level options apply first; per-call options override them.
#[tokio::test]
async fn test_per_call_header_overrides_default() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("x-team", "payments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::builder()
        .base_url(mock_server.uri())
        .api_key("test-key")
        .organization_id("test-org")
        .default_header("x-team", "treasury")
        .unwrap()
        .build()
        .unwrap();

    let page = client
        .expected_payments()
        .list(
            &ExpectedPaymentListParams::default(),
            &[with_header("x-team", "payments").unwrap()],
        )
        .await
        .unwrap();
    assert!(page.items().is_empty());
}

/// An empty path id is rejected before any request is made.
#[tokio::test]
async fn test_empty_id_rejected_locally() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server, 0);
    let err = client.payment_orders().get("", &[]).await.unwrap_err();
    assert!(matches!(err, TreasuryError::Config(_)));
}
