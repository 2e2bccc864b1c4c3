//! Error types for the gateway
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Client Error Enum ==
/// Failures surfaced by the cached API client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// No response was obtained (DNS, refused connection, reset)
    #[error("Network error: {0}")]
    Network(String),

    /// The proxy or backend answered with a non-2xx status
    #[error("Upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The response body was not the expected JSON
    #[error("Decode error: {0}")]
    Decode(String),

    /// The caller cancelled the fetch before it completed
    #[error("Request aborted")]
    Aborted,
}

impl ClientError {
    /// True when the failure came from caller cancellation rather than the network.
    pub fn is_aborted(&self) -> bool {
        matches!(self, ClientError::Aborted)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

// == Proxy Error Enum ==
/// Proxy-level faults. Business errors from the backend are relayed, not wrapped.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// The upstream could not be reached or dropped the connection
    #[error("{0}")]
    Connectivity(String),

    /// A path segment that would resolve outside the backend's `/api`
    #[error("Path segment '{0}' is not allowed")]
    InvalidPath(String),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            ProxyError::Connectivity(_) => (StatusCode::BAD_GATEWAY, "Proxy error"),
            ProxyError::InvalidPath(_) => (StatusCode::BAD_REQUEST, "Invalid path"),
        };
        let body = Json(json!({
            "error": error,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

// == Storage Error Enum ==
/// Persistent storage failures. Callers treat these as "entry absent".
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

// == Api Error Enum ==
/// Errors returned by the typed `/api/...` handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Invalid query parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Backend lookup failed
    #[error(transparent)]
    Client(#[from] ClientError),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            ApiError::Client(ClientError::Upstream { status, body }) => {
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                match serde_json::from_str::<serde_json::Value>(&body) {
                    Ok(value) => (status, Json(value)).into_response(),
                    Err(_) => (status, body).into_response(),
                }
            }
            ApiError::Client(err) => {
                ProxyError::Connectivity(err.to_string()).into_response()
            }
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for client lookups.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Result type for the typed handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_proxy_error_envelope() {
        let response = ProxyError::Connectivity("connection refused".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Proxy error");
        assert_eq!(json["message"], "connection refused");
    }

    #[tokio::test]
    async fn test_invalid_path_is_bad_request() {
        let response = ProxyError::InvalidPath("..".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Invalid path");
        assert!(json["message"].as_str().unwrap().contains(".."));
    }

    #[tokio::test]
    async fn test_upstream_error_relays_status_and_body() {
        let err = ApiError::Client(ClientError::Upstream {
            status: 404,
            body: r#"{"detail":"not found"}"#.to_string(),
        });
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await, json!({"detail": "not found"}));
    }

    #[tokio::test]
    async fn test_invalid_request_is_bad_request() {
        let response = ApiError::InvalidRequest("bad years".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "bad years");
    }

    #[tokio::test]
    async fn test_network_error_maps_to_bad_gateway() {
        let response = ApiError::Client(ClientError::Network("refused".into())).into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(body_json(response).await.get("error").is_some());
    }

    #[test]
    fn test_aborted_is_distinguishable() {
        assert!(ClientError::Aborted.is_aborted());
        assert!(!ClientError::Network("x".into()).is_aborted());
    }
}
