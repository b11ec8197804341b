//! Integration tests for the Pawfeed request channels

use async_trait::async_trait;
use pawfeed_http::{
    ApiChannel, ApiRequest, ApiResponse, ClientError, HookPipeline, HttpTransport, RequestChannel,
    RequestHook, RequestOptions, ResponseHook, SideChannel, Transport,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Records hook invocations in order
struct RecordingHook {
    label: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl RequestHook for RecordingHook {
    fn name(&self) -> &'static str {
        self.label
    }

    async fn before_send(&self, request: &mut ApiRequest) {
        self.log
            .lock()
            .unwrap()
            .push(format!("{} before {}", self.label, request.path()));
    }
}

#[async_trait]
impl ResponseHook for RecordingHook {
    fn name(&self) -> &'static str {
        self.label
    }

    async fn after_response(
        &self,
        request: &ApiRequest,
        outcome: Result<ApiResponse, ClientError>,
        _transport: &dyn Transport,
    ) -> Result<ApiResponse, ClientError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("{} after {}", self.label, request.path()));
        outcome
    }
}

/// Retries once on 404 by dispatching the same request again
struct RetryOnNotFound {
    retries: AtomicUsize,
}

#[async_trait]
impl ResponseHook for RetryOnNotFound {
    fn name(&self) -> &'static str {
        "retry-on-not-found"
    }

    async fn after_response(
        &self,
        request: &ApiRequest,
        outcome: Result<ApiResponse, ClientError>,
        transport: &dyn Transport,
    ) -> Result<ApiResponse, ClientError> {
        match outcome {
            Err(ClientError::NotFound(_)) => {
                self.retries.fetch_add(1, Ordering::SeqCst);
                transport.dispatch(request).await
            }
            other => other,
        }
    }
}

fn shared_transport(uri: String) -> Arc<HttpTransport> {
    HttpTransport::builder()
        .base_url(uri)
        .build_shared()
        .unwrap()
}

#[tokio::test]
async fn test_transport_builder() {
    let transport = HttpTransport::builder()
        .base_url("http://localhost:8000/")
        .user_agent("pawfeed-test")
        .build();

    assert!(transport.is_ok());
    assert_eq!(transport.unwrap().base_url(), "http://localhost:8000");
}

#[tokio::test]
async fn test_transport_builder_requires_base_url() {
    let result = HttpTransport::builder().build();
    assert!(matches!(result, Err(ClientError::Configuration(_))));
}

#[tokio::test]
async fn test_side_channel_verbs() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/posts/"))
        .and(query_param("owner__profile", "9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/saves/"))
        .and(body_json(json!({ "post": 3 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 12, "post": 3 })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/saves/12/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let channel = SideChannel::new(shared_transport(mock_server.uri()));

    let listing = channel
        .send(ApiRequest::get("/posts/").with_query("owner__profile", "9"))
        .await
        .unwrap();
    assert_eq!(listing.json::<serde_json::Value>().unwrap()["results"], json!([]));

    let saved: serde_json::Value = channel
        .post("/saves/", &json!({ "post": 3 }))
        .await
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(saved["id"], 12);

    let deleted = channel.delete("/saves/12/").await.unwrap();
    assert_eq!(deleted.status().as_u16(), 204);
}

#[tokio::test]
async fn test_relative_path_is_joined_to_base() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/session/identity/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "pk": 1 })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let channel = SideChannel::new(shared_transport(mock_server.uri()));
    assert!(channel.get("session/identity/").await.is_ok());
}

#[tokio::test]
async fn test_verbs_accept_per_call_options() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/posts/"))
        .and(query_param("page", "2"))
        .and(header("accept-language", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/profiles/9/"))
        .and(header("x-request-tag", "profile-edit"))
        .and(body_json(json!({ "name": "Happy Tails" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 9 })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let channel = ApiChannel::new(shared_transport(mock_server.uri()), HookPipeline::new());

    let mut listing = RequestOptions::default();
    listing.query.push(("page".into(), "2".into()));
    listing
        .headers
        .insert(pawfeed_http::header::ACCEPT_LANGUAGE, "en".parse().unwrap());
    assert!(channel.get_with("/posts/", listing).await.is_ok());

    let mut edit = RequestOptions::default();
    edit.headers
        .insert("x-request-tag", "profile-edit".parse().unwrap());
    let updated = channel
        .put_with("/profiles/9/", &json!({ "name": "Happy Tails" }), edit)
        .await
        .unwrap();
    assert_eq!(updated.status().as_u16(), 200);
}

#[tokio::test]
async fn test_error_carries_status_and_parsed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/posts/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "title": ["This field is required."] })),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/session/identity/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "detail": "Authentication credentials were not provided." })),
        )
        .mount(&mock_server)
        .await;

    let channel = SideChannel::new(shared_transport(mock_server.uri()));

    let err = channel.post("/posts/", &json!({})).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(
        err.body().unwrap().field_errors("title"),
        vec!["This field is required."]
    );

    let err = channel.get("/session/identity/").await.unwrap_err();
    assert!(err.is_auth_expired());
    assert_eq!(err.user_message(), "Authentication credentials were not provided.");
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    // Port 9 (discard) is not expected to run an HTTP server
    let channel = SideChannel::new(shared_transport("http://127.0.0.1:9".into()));
    let err = channel.get("/posts/").await.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_hooks_run_in_order_on_api_channel_only() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/dogs/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&mock_server)
        .await;

    let log = Arc::new(Mutex::new(Vec::new()));
    let first = Arc::new(RecordingHook {
        label: "first",
        log: log.clone(),
    });
    let second = Arc::new(RecordingHook {
        label: "second",
        log: log.clone(),
    });
    let hooks = HookPipeline::new()
        .with_request_hook(first.clone())
        .with_request_hook(second.clone())
        .with_response_hook(first)
        .with_response_hook(second);
    assert_eq!(hooks.names(), vec!["first", "second", "first", "second"]);

    let api = ApiChannel::new(shared_transport(mock_server.uri()), hooks);
    api.get("/dogs/").await.unwrap();
    api.to_side_channel().get("/dogs/").await.unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "first before /dogs/",
            "second before /dogs/",
            "first after /dogs/",
            "second after /dogs/",
        ]
    );
}

#[tokio::test]
async fn test_response_hook_can_replay_through_transport() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/profiles/9/"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/profiles/9/"))
        .and(header("x-request-tag", "edit"))
        .and(body_json(json!({ "name": "Rex" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 9 })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let retry = Arc::new(RetryOnNotFound {
        retries: AtomicUsize::new(0),
    });
    let api = ApiChannel::new(
        shared_transport(mock_server.uri()),
        HookPipeline::new().with_response_hook(retry.clone()),
    );

    let request = ApiRequest::put("/profiles/9/")
        .with_json(&json!({ "name": "Rex" }))
        .unwrap()
        .with_header(
            "x-request-tag".parse().unwrap(),
            "edit".parse().unwrap(),
        );
    let response = api.send(request).await.unwrap();

    assert_eq!(response.json::<serde_json::Value>().unwrap()["id"], 9);
    assert_eq!(retry.retries.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_channels_share_cookie_jar() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/session/token/refresh/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "pawfeed-auth=fresh; Path=/")
                .set_body_json(json!({})),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/posts/"))
        .and(header("cookie", "pawfeed-auth=fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = shared_transport(mock_server.uri());
    let side = SideChannel::new(transport.clone());
    let api = ApiChannel::new(transport, HookPipeline::new());

    side.send(ApiRequest::post("/session/token/refresh/"))
        .await
        .unwrap();
    assert!(api.get("/posts/").await.is_ok());
}
