use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use bytes::Bytes;
use oxdb_client::{HttpRequest, PushClient, PushErrorKind, PushRequest, ReqwestTransport, Transport};
use sonic_rs::{JsonValueTrait, Value, json};
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct AppState {
    received: Arc<Mutex<Vec<PushRequest>>>,
    content_types: Arc<Mutex<Vec<String>>>,
}

#[tokio::test]
async fn e2e_push_success_roundtrip() {
    let server = TestServer::start().await;
    let client = PushClient::with_base_url(server.base_url.clone());
    let request = PushRequest::new("data")
        .with_embeddings(true)
        .with_description("from ox-ai.studio api call")
        .with_metadata("source", json!({"app": "ox-ai.studio.api", "tags": ["a", "b"]}))
        .with_key("key");

    let receipt = client.push(&request).await.expect("push should succeed");
    assert_eq!(receipt.message(), "ox-db : ok");

    let received = server.state.received.lock().expect("state lock").clone();
    assert_eq!(received, vec![request]);
    let content_types = server.state.content_types.lock().expect("state lock").clone();
    assert_eq!(content_types, vec!["application/json".to_string()]);
}

#[tokio::test]
async fn e2e_push_rejection_carries_detail() {
    let server = TestServer::start().await;
    let client = PushClient::with_base_url(server.base_url.clone());

    let err = client
        .push(&PushRequest::new("data").with_key("bad"))
        .await
        .expect_err("server should reject the key");

    assert_eq!(err.kind(), PushErrorKind::Rejected);
    assert_eq!(err.message(), "Error: 400, bad key");
}

#[tokio::test]
async fn e2e_push_non_json_success_is_decode_error() {
    let server = TestServer::start().await;
    let client = PushClient::with_base_url(server.base_url.clone());

    let err = client
        .push(&PushRequest::new("data").with_key("plain"))
        .await
        .expect_err("plain text body should not decode");

    assert_eq!(err.kind(), PushErrorKind::Decode);
}

#[tokio::test]
async fn e2e_malformed_body_gets_json_detail() {
    let server = TestServer::start().await;
    let transport = ReqwestTransport::new();

    let response = transport
        .send(
            HttpRequest::post(format!("{}/push", server.base_url))
                .with_header("content-type", "application/json")
                .with_body(r#"{"data":"unterminated"#),
        )
        .await
        .expect("server should answer");

    assert_eq!(response.status(), 422);
    let body: Value = response.json().expect("error body should be valid json");
    let detail = body.get("detail").and_then(|detail| detail.as_str());
    assert!(detail.is_some_and(|detail| !detail.is_empty()), "body: {body:?}");
}

struct TestServer {
    base_url: String,
    state: AppState,
    task: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        let state = AppState::default();
        let app = Router::new()
            .route("/push", post(push_handler))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        let base_url = format!("http://{}", addr);

        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url,
            state,
            task,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn push_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let content_type = headers
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    state.content_types.lock().expect("state lock").push(content_type);

    let request: PushRequest = match sonic_rs::from_slice(&body) {
        Ok(request) => request,
        Err(err) => {
            let detail = json!({"detail": err.to_string()});
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                sonic_rs::to_string(&detail).unwrap_or_default(),
            );
        }
    };

    let response = match request.key.as_deref() {
        Some("bad") => (StatusCode::BAD_REQUEST, r#"{"detail":"bad key"}"#.to_string()),
        Some("plain") => (StatusCode::OK, "stored".to_string()),
        _ => (StatusCode::OK, r#""ok""#.to_string()),
    };
    state.received.lock().expect("state lock").push(request);
    response
}
