//! HttpTransport against a mock HTTP server

use std::sync::Arc;
use std::time::Duration;

use api_dispatch::testing::TestHarness;
use api_dispatch::{
    api_action, api_error, ApiCarrier, ApiError, ApiMiddleware, HttpConfig, HttpTransport,
    Method, StandardAction, Transport,
};
use serde_json::json;
use wiremock::{
    matchers::{body_json, body_string, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn transport_for(server: &MockServer) -> HttpTransport {
    HttpTransport::new(HttpConfig::new().with_base_url(server.uri())).expect("client")
}

fn get(url: &str) -> api_dispatch::ApiRequest {
    api_dispatch::ApiRequest {
        url: url.to_string(),
        method: None,
        headers: Default::default(),
        data: None,
    }
}

// ============================================================================
// Transport Tests
// ============================================================================

#[tokio::test]
async fn test_get_decodes_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }])))
        .mount(&server)
        .await;

    let response = transport_for(&server).send(get("/users")).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.data, json!([{ "id": 1 }]));
}

#[tokio::test]
async fn test_non_json_body_is_a_string() {
    let server = MockServer::start().await;
    Mock::given(path("/motd"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .mount(&server)
        .await;

    let response = transport_for(&server).send(get("/motd")).await.unwrap();
    assert_eq!(response.data, json!("hello"));
}

#[tokio::test]
async fn test_non_2xx_is_status_error() {
    let server = MockServer::start().await;
    Mock::given(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
        .mount(&server)
        .await;

    let err = transport_for(&server).send(get("/missing")).await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Status {
            status: 404,
            body: "not here".into()
        }
    );
}

#[tokio::test]
async fn test_timeout_is_reported() {
    let server = MockServer::start().await;
    Mock::given(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(
        HttpConfig::new()
            .with_base_url(server.uri())
            .with_timeout(Duration::from_millis(50)),
    )
    .unwrap();

    let err = transport.send(get("/slow")).await.unwrap_err();
    assert_eq!(err, ApiError::Timeout);
}

#[tokio::test]
async fn test_post_sends_body_and_merged_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/todos"))
        .and(header("content-type", "application/json"))
        .and(header("x-client", "tests"))
        .and(header("x-foo", "bar"))
        .and(body_json(json!({ "title": "write tests" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 7 })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = Arc::new(
        HttpTransport::new(
            HttpConfig::new()
                .with_base_url(server.uri())
                .with_header("X-Client", "tests"),
        )
        .unwrap(),
    );
    let mut harness = TestHarness::<(), StandardAction>::new(());
    let middleware = ApiMiddleware::new(transport, harness.sender());

    let create = api_action(api_error)
        .kind("TODO_CREATE")
        .url("/todos")
        .method(Method::POST)
        .header("X-Foo", "bar")
        .data(json!({ "title": "write tests" }))
        .on_success(|todo| StandardAction::plain("TODO_CREATED", todo))
        .build();

    middleware.intercept(create, |_| {});

    let derived = harness.recv_timeout(Duration::from_secs(5)).await;
    assert_eq!(
        derived,
        Some(StandardAction::plain("TODO_CREATED", json!({ "id": 7 })))
    );
}

#[tokio::test]
async fn test_string_body_is_json_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notes"))
        .and(header("content-type", "application/json"))
        .and(body_string(r#""hello""#))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let call = api_action(api_error)
        .url("/notes")
        .method(Method::POST)
        .data(json!("hello"))
        .build();
    let request = call.api_call().unwrap().request();

    let response = transport_for(&server).send(request).await.unwrap();
    assert_eq!(response.status, 204);
    assert_eq!(response.data, json!(null));
}

#[tokio::test]
async fn test_string_body_is_raw_for_text_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notes"))
        .and(header("content-type", "text/plain"))
        .and(body_string("hello"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let call = api_action(api_error)
        .url("/notes")
        .method(Method::POST)
        .header("Content-Type", "text/plain")
        .data(json!("hello"))
        .build();
    let request = call.api_call().unwrap().request();

    transport_for(&server).send(request).await.unwrap();
}

#[tokio::test]
async fn test_with_client_uses_given_client() {
    let server = MockServer::start().await;
    Mock::given(path("/ping"))
        .and(header("user-agent", "custom-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "pong": true })))
        .expect(1)
        .mount(&server)
        .await;

    let client = reqwest::Client::builder()
        .user_agent("custom-agent")
        .build()
        .unwrap();
    let transport =
        HttpTransport::with_client(client, HttpConfig::new().with_base_url(server.uri()));
    assert_eq!(
        transport.config().base_url.as_deref(),
        Some(server.uri().as_str())
    );

    let response = transport.send(get("/ping")).await.unwrap();
    assert_eq!(response.data, json!({ "pong": true }));
}

#[tokio::test]
async fn test_server_error_becomes_api_error_action() {
    let server = MockServer::start().await;
    Mock::given(path("/todos"))
        .respond_with(ResponseTemplate::new(500).set_body_string("down"))
        .mount(&server)
        .await;

    let transport = Arc::new(transport_for(&server));
    let mut harness = TestHarness::<(), StandardAction>::new(());
    let middleware = ApiMiddleware::new(transport, harness.sender());

    middleware.intercept(api_action(api_error).url("/todos").build(), |_| {});

    let derived = harness.recv_timeout(Duration::from_secs(5)).await;
    assert_eq!(
        derived,
        Some(StandardAction::plain(
            "API_ERROR",
            json!({ "error": { "kind": "status", "status": 500, "body": "down" } })
        ))
    );
}
