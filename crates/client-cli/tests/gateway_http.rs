//! End-to-end checks of the HTTP gateway against a local fake backend

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::SESSION_HEADER;

use photoset::auth::AuthClient;
use photoset::config::Endpoints;
use photoset::error::{AuthError, ClientError};
use photoset::gateway::{Gateway, GatewayError, HttpGateway, Request, Service};
use photoset::generation::{GenerationClient, GenerationRequest, GenerationResult, Persistence, Remaining};
use photoset::session::{MemoryStorage, SessionStore};

const TOKEN: &str = "tok-1";

#[derive(Debug, Clone)]
struct Hit {
    path: &'static str,
    action: Option<String>,
    token: Option<String>,
}

#[derive(Clone, Default)]
struct Backend {
    hits: Arc<Mutex<Vec<Hit>>>,
}

impl Backend {
    fn record(&self, path: &'static str, query: &HashMap<String, String>, headers: &HeaderMap) {
        let token = headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.hits.lock().unwrap().push(Hit {
            path,
            action: query.get("action").cloned(),
            token,
        });
    }

    fn hits(&self) -> Vec<Hit> {
        self.hits.lock().unwrap().clone()
    }
}

fn user() -> Value {
    json!({
        "id": 7,
        "email": "ann@example.com",
        "username": "ann",
        "free_generations_used": 0,
        "free_generations_limit": 3
    })
}

fn authorized(headers: &HeaderMap) -> bool {
    headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()) == Some(TOKEN)
}

async fn auth(
    State(backend): State<Backend>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, Json<Value>) {
    backend.record("auth", &query, &headers);
    match query.get("action").map(String::as_str) {
        Some("login") => {
            let body: Value = serde_json::from_str(&body).unwrap_or_default();
            if body["password"] == "correct-horse" {
                (
                    StatusCode::OK,
                    Json(json!({"success": true, "session_token": TOKEN, "user": user()})),
                )
            } else {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"success": false, "error": "Invalid email or password"})),
                )
            }
        }
        Some("verify") if authorized(&headers) => (StatusCode::OK, Json(json!({"success": true, "user": user()}))),
        Some("verify") => (StatusCode::UNAUTHORIZED, Json(json!({"error": "Session expired"}))),
        _ => (StatusCode::BAD_REQUEST, Json(json!({"error": "Unknown action"}))),
    }
}

async fn generate(
    State(backend): State<Backend>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    backend.record("generate", &query, &headers);
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "AUTH_REQUIRED"})));
    }
    (
        StatusCode::OK,
        Json(json!({"success": true, "image_url": "https://cdn.example/1.png", "remaining_free": 2})),
    )
}

async fn save(
    State(backend): State<Backend>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<Value> {
    backend.record("save", &query, &headers);
    Json(json!({"success": true, "image_id": 42}))
}

async fn spawn_backend() -> (String, Backend) {
    let backend = Backend::default();
    let app = Router::new()
        .route("/auth", get(auth).post(auth))
        .route("/generate", post(generate))
        .route("/save", post(save))
        .route("/broken", get(|| async { (StatusCode::BAD_GATEWAY, "upstream timed out") }))
        .route("/html", get(|| async { "<html>maintenance</html>" }))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), backend)
}

fn gateway(base: &str, images: &str) -> Arc<dyn Gateway> {
    let endpoints = Endpoints {
        auth: format!("{}/auth", base),
        generate: format!("{}/generate", base),
        save_image: format!("{}/save", base),
        images: format!("{}{}", base, images),
        admin: String::new(),
        payment: String::new(),
    };
    Arc::new(HttpGateway::new(endpoints, Duration::from_secs(5)).unwrap())
}

fn store(gateway: Arc<dyn Gateway>) -> SessionStore {
    SessionStore::new(
        AuthClient::new(gateway),
        Arc::new(MemoryStorage::new()),
        Duration::from_secs(5),
    )
}

#[tokio::test]
async fn test_login_generate_and_persist() {
    let (base, backend) = spawn_backend().await;
    let gateway = gateway(&base, "/images");
    let store = store(gateway.clone());

    store.login("ann@example.com", "correct-horse").await.unwrap();
    let generation = GenerationClient::new(gateway)
        .run(&store, &GenerationRequest::new("sunset portrait"))
        .await;

    match generation.result {
        GenerationResult::Success { image, remaining } => {
            assert_eq!(image.image_url, "https://cdn.example/1.png");
            assert_eq!(image.id, Some(42));
            assert_eq!(remaining, Remaining::FreeGenerations(2));
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(
        generation.persistence,
        Some(Persistence::Saved {
            id: 42,
            created_at: None
        })
    );
    assert_eq!(store.snapshot().user().unwrap().free_generations_used, 1);

    let hits = backend.hits();
    let login = hits.iter().find(|h| h.path == "auth").unwrap();
    assert_eq!(login.action.as_deref(), Some("login"));
    assert_eq!(login.token, None);
    let gen = hits.iter().find(|h| h.path == "generate").unwrap();
    assert_eq!(gen.token.as_deref(), Some(TOKEN));
    let save = hits.iter().find(|h| h.path == "save").unwrap();
    assert_eq!(save.token, None);
}

#[tokio::test]
async fn test_wrong_password_is_invalid_credentials() {
    let (base, _backend) = spawn_backend().await;
    let store = store(gateway(&base, "/images"));

    let err = store.login("ann@example.com", "nope").await.unwrap_err();
    assert_eq!(err, ClientError::Auth(AuthError::InvalidCredentials));
    assert!(!store.snapshot().is_signed_in());
}

#[tokio::test]
async fn test_non_json_error_body_becomes_server_error() {
    let (base, _backend) = spawn_backend().await;
    let gateway = gateway(&base, "/broken");

    let err = gateway.call(Request::get(Service::Images)).await.unwrap_err();
    assert!(matches!(err, GatewayError::Rejected { status: 502, .. }));
    match ClientError::from(err) {
        ClientError::Server { status, message } => {
            assert_eq!(status, Some(502));
            assert!(message.contains("upstream timed out"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_success_is_malformed() {
    let (base, _backend) = spawn_backend().await;
    let gateway = gateway(&base, "/html");

    let err = gateway.call(Request::get(Service::Images)).await.unwrap_err();
    assert!(matches!(err, GatewayError::Malformed { status: Some(200), .. }));
}

#[tokio::test]
async fn test_unconfigured_endpoint_sends_nothing() {
    let (base, backend) = spawn_backend().await;
    let gateway = gateway(&base, "/images");

    let err = gateway.call(Request::post(Service::Payment)).await.unwrap_err();
    assert_eq!(err, GatewayError::NotConfigured("payment"));
    assert!(matches!(ClientError::from(err), ClientError::Config(_)));
    assert!(backend.hits().is_empty());
}
