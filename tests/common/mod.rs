use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use tempfile::TempDir;

use extgate::config::ServerConfig;
use extgate::server::{AppState, create_router};
use extgate::store::{SqliteStore, Store};

pub const TENANT1_TOKEN: &str = "tenant-one-token";
pub const TENANT2_TOKEN: &str = "tenant-two-token";

/// A request as seen by the mock upstream extension backend.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

type Captured = Arc<Mutex<Vec<CapturedRequest>>>;

/// Boots the gateway, a mock identity provider, and a mock upstream backend,
/// all in-process on ephemeral ports.
pub struct TestServer {
    pub base_url: String,
    pub upstream_url: String,
    pub captured: Captured,
    _temp_dir: TempDir,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with_timeout(Duration::from_secs(30)).await
    }

    pub async fn start_with_timeout(proxy_timeout: Duration) -> Self {
        let identity_url = spawn(identity_router()).await;

        let captured: Captured = Arc::new(Mutex::new(Vec::new()));
        let upstream_url = spawn(upstream_router(captured.clone())).await;

        let temp_dir = TempDir::new().expect("create temp dir");
        let config = ServerConfig {
            data_dir: temp_dir.path().to_path_buf(),
            identity_url,
            identity_api_key: "test-api-key".to_string(),
            max_page_size: 100,
            proxy_timeout,
            ..ServerConfig::default()
        };

        let store = SqliteStore::new(config.db_path()).expect("open store");
        store.initialize().expect("initialize store");

        let state = Arc::new(AppState::new(Arc::new(store), &config).expect("build state"));
        let base_url = spawn(create_router(state)).await;

        Self {
            base_url,
            upstream_url,
            captured,
            _temp_dir: temp_dir,
        }
    }

    pub fn last_captured(&self) -> CapturedRequest {
        self.captured
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("upstream received no request")
    }
}

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{addr}")
}

fn identity_router() -> Router {
    Router::new().route("/api/v1/auth/verify", get(verify))
}

async fn verify(headers: HeaderMap) -> Response {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let principal = match token {
        Some(TENANT1_TOKEN) => serde_json::json!({"user_id": "user-1", "business_id": "tenant-1"}),
        Some(TENANT2_TOKEN) => serde_json::json!({"user_id": "user-2", "business_id": "tenant-2"}),
        _ => return StatusCode::UNAUTHORIZED.into_response(),
    };

    Json(principal).into_response()
}

fn upstream_router(captured: Captured) -> Router {
    Router::new()
        .route("/{*path}", any(upstream_handler))
        .with_state(captured)
}

async fn upstream_handler(State(captured): State<Captured>, request: Request) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);
    let headers = request.headers().clone();
    let body = axum::body::to_bytes(request.into_body(), 1024 * 1024)
        .await
        .unwrap_or_default()
        .to_vec();

    captured.lock().unwrap().push(CapturedRequest {
        method,
        path: path.clone(),
        query,
        headers,
        body,
    });

    if path.ends_with("/forbidden") {
        return (
            StatusCode::FORBIDDEN,
            [("content-type", "application/json")],
            r#"{"error":"forbidden"}"#,
        )
            .into_response();
    }

    if path.ends_with("/slow") {
        tokio::time::sleep(Duration::from_secs(5)).await;
    }

    (
        StatusCode::OK,
        [("content-type", "application/json"), ("x-upstream", "yes")],
        r#"{"ok":true}"#,
    )
        .into_response()
}
