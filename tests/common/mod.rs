//! Shared fixtures: a recording mock backend and an ephemeral gateway.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderName, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use pkd_gateway::{create_router, AppState, Config};
use serde_json::json;
use tokio::net::TcpListener;

/// Nothing listens here; connections are refused.
pub const CLOSED_ORIGIN: &str = "http://127.0.0.1:9";

/// One request as the mock backend saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Recorded {
    pub fn path(&self) -> &str {
        self.uri.split('?').next().unwrap_or_default()
    }
}

// == Mock Backend ==
#[derive(Clone, Default)]
pub struct MockBackend {
    pub origin: String,
    log: Arc<Mutex<Vec<Recorded>>>,
    /// Answer lookups with a 500 or a body that is not JSON
    failing: bool,
}

impl MockBackend {
    pub async fn start() -> Self {
        Self::start_with(false).await
    }

    /// Divisions answer 500; groups and industry answer `200 not json`.
    pub async fn start_failing() -> Self {
        Self::start_with(true).await
    }

    async fn start_with(failing: bool) -> Self {
        let mut mock = MockBackend {
            failing,
            ..MockBackend::default()
        };
        let app = Router::new().fallback(handle).with_state(mock.clone());
        mock.origin = serve(app).await;
        mock
    }

    /// Number of requests received for `path` (query ignored).
    pub fn hits(&self, path: &str) -> usize {
        self.requests().iter().filter(|r| r.path() == path).count()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    pub fn last(&self, path: &str) -> Option<Recorded> {
        self.requests().into_iter().rev().find(|r| r.path() == path)
    }

    fn record(&self, request: Recorded) -> usize {
        let path = request.path().to_string();
        let mut log = self.log.lock().unwrap();
        log.push(request);
        log.iter().filter(|r| r.path() == path).count()
    }
}

async fn handle(
    State(mock): State<MockBackend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let calls = mock.record(Recorded {
        method,
        uri: uri.to_string(),
        headers,
        body: body.clone(),
    });

    if mock.failing {
        return match path.as_str() {
            "/api/divisions" => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"detail": "boom"}))).into_response()
            }
            _ => (StatusCode::OK, "not json").into_response(),
        };
    }

    match path.as_str() {
        "/api/health" => Json(json!({"status": "ok"})).into_response(),
        "/api/divisions" => Json(json!({
            "section": "B",
            "version": "2025",
            "divisions": ["05", "06", "07", "08", "09"],
        }))
        .into_response(),
        "/api/groups" => Json(json!({"groups": ["1", "2", "3"]})).into_response(),
        "/api/industry" => Json(json!({"code": "C", "call": calls})).into_response(),
        "/api/moved" => (StatusCode::FOUND, [(header::LOCATION, "/api/groups")]).into_response(),
        "/api/echo" => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/octet-stream"),
                (HeaderName::from_static("x-upstream"), "mock"),
                (HeaderName::from_static("keep-alive"), "timeout=5"),
            ],
            body,
        )
            .into_response(),
        "/api/economy/snapshot" => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"year": 2024})).into_response()
        }
        _ => (StatusCode::NOT_FOUND, Json(json!({"detail": "not found"}))).into_response(),
    }
}

// == Servers ==
/// Serves `app` on an ephemeral loopback port and returns its origin.
pub async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Starts a gateway in front of `backend` and returns its origin.
pub async fn spawn_gateway(backend: &str) -> String {
    let state = AppState::from_config(&Config::with_backend(backend)).unwrap();
    serve(create_router(state)).await
}

/// Raw HTTP client that leaves redirects to the caller.
pub fn raw_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
