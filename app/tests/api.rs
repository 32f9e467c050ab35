//! End-to-end tests: the app served on a real listener, called over HTTP.

use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::routing::any;
use reqwest::header::{COOKIE, HeaderValue};
use serde_json::{Value, json};

use rpc_app::build_app;
use rpc_app::config::ServerConfig;
use rpc_app::rpc::endpoints::{AuthAuthenticate, ExampleExample, UserGetAll, UserGetUnique};
use rpc_app::rpc::{AppContext, AuthenticateData, AuthenticateInput, ExampleInput, UserData, UserGetInput};
use typed_rpc::{ApiResponse, NoInput, Notifier, RequestOptions, RpcClient};

struct TestServer {
    base: String,
    context: Arc<AppContext>,
}

async fn spawn_app() -> TestServer {
    let context = Arc::new(AppContext::new());
    let app = build_app(&ServerConfig::default(), context.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base: format!("http://{}", addr),
        context,
    }
}

#[derive(Default)]
struct RecordingNotifier {
    seen: Mutex<Vec<(String, String)>>,
}

impl Notifier for RecordingNotifier {
    fn error(&self, title: &str, description: &str) {
        self.seen
            .lock()
            .unwrap()
            .push((title.to_string(), description.to_string()));
    }
}

#[tokio::test]
async fn get_all_returns_hanna() {
    let server = spawn_app().await;
    let response = reqwest::Client::new()
        .get(format!("{}/api/user/getAll", server.base))
        .json(&json!({}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json::<Value>().await.unwrap(), json!({ "id": "123", "name": "hanna" }));
}

#[tokio::test]
async fn missing_procedure_is_404() {
    let server = spawn_app().await;
    let response = reqwest::Client::new()
        .get(format!("{}/api/user/missing", server.base))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Endpoint not found.");
}

#[tokio::test]
async fn router_without_procedure_is_400() {
    let server = spawn_app().await;
    let response = reqwest::Client::new()
        .get(format!("{}/api/user", server.base))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Bad endpoint request.");
}

#[tokio::test]
async fn typed_client_calls_every_endpoint() {
    let server = spawn_app().await;
    let client = RpcClient::new(&server.base);

    let user = client
        .call::<UserGetUnique>(&UserGetInput { id: "9".into() }, RequestOptions::default())
        .await;
    assert_eq!(user, Some(ApiResponse::Data(UserData::new("123", "Billy"))));

    let all = client.call::<UserGetAll>(&NoInput {}, RequestOptions::default()).await;
    assert_eq!(all, Some(ApiResponse::Data(UserData::new("123", "hanna"))));

    let auth = client
        .call::<AuthAuthenticate>(
            &AuthenticateInput {
                email: "billy@example.com".into(),
            },
            RequestOptions::default(),
        )
        .await;
    assert_eq!(auth, Some(ApiResponse::Data(AuthenticateData { authenticated: true })));
}

#[tokio::test]
async fn invalid_email_never_authenticates() {
    let server = spawn_app().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let client = RpcClient::new(&server.base).with_notifier(notifier.clone());

    let auth = client
        .call::<AuthAuthenticate>(
            &AuthenticateInput {
                email: "not-an-email".into(),
            },
            RequestOptions::default(),
        )
        .await;

    assert!(auth.is_none());
    let seen = notifier.seen.lock().unwrap().clone();
    assert_eq!(seen, vec![("The request failed!".to_string(), "Bad input request.".to_string())]);
}

#[tokio::test]
async fn example_runs_cookie_middleware() {
    let server = spawn_app().await;
    let client = RpcClient::new(&server.base);
    let options = RequestOptions::new().with_header(COOKIE, HeaderValue::from_static("session=abc"));

    let output = client
        .call::<ExampleExample>(&ExampleInput { id: "77".into() }, options)
        .await
        .and_then(ApiResponse::data);

    assert_eq!(output, Some(UserData::new("77", "hanna")));
    assert_eq!(server.context.logged_calls(), 1);
}

#[tokio::test]
async fn example_bad_input_skips_middleware() {
    let server = spawn_app().await;
    let response = reqwest::Client::new()
        .post(format!("{}/api/example/example", server.base))
        .json(&json!({ "id": "" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(server.context.logged_calls(), 0);
}

#[tokio::test]
async fn manifest_lists_endpoints() {
    let server = spawn_app().await;
    let manifest: Vec<Value> = reqwest::get(format!("{}/api", server.base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let paths: Vec<&str> = manifest.iter().map(|e| e["path"].as_str().unwrap()).collect();
    assert_eq!(
        paths,
        vec!["auth.authenticate", "example.example", "user.getAll", "user.getUnique"]
    );
    assert_eq!(manifest[1]["middleware"], 1);
}

#[tokio::test]
async fn client_against_failing_server_notifies() {
    let failing = axum::Router::new().route(
        "/api/{*rest}",
        any(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, failing).await.unwrap();
    });

    let notifier = Arc::new(RecordingNotifier::default());
    let client = RpcClient::new(format!("http://{}", addr)).with_notifier(notifier.clone());

    let result = client.call::<UserGetAll>(&NoInput {}, RequestOptions::default()).await;

    assert!(result.is_none());
    let seen = notifier.seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "The request failed!");
    assert_eq!(seen[0].1, "Internal Server Error");
}
