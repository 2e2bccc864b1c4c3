//! Request Proxy
//!
//! Forwards a locally addressed `/api/proxy/...` call to
//! `<backend_origin>/api/...` and relays the answer. Each inbound request
//! maps to exactly one upstream attempt; redirects are relayed, not followed.

mod headers;

use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, warn};

use crate::error::ProxyError;

pub use headers::{forward_request_headers, is_hop_by_hop, relay_response_headers, HOP_BY_HOP};

/// Methods the proxy forwards; anything else is answered locally with 405.
pub const FORWARDED_METHODS: [Method; 7] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
    Method::HEAD,
];

// == Request Proxy ==
#[derive(Debug, Clone)]
pub struct RequestProxy {
    http: reqwest::Client,
    origin: String,
}

impl RequestProxy {
    // == Constructor ==
    /// Creates a proxy for `origin` (e.g. `http://localhost:8000`).
    pub fn new(origin: &str) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            http,
            origin: origin.trim_end_matches('/').to_string(),
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    // == Target URL ==
    /// `<origin>/api[/<segments joined by />][?<query>]`, query untouched.
    pub fn target_url(&self, segments: &[&str], query: Option<&str>) -> String {
        let mut url = format!("{}/api", self.origin);
        if !segments.is_empty() {
            url.push('/');
            url.push_str(&segments.join("/"));
        }
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    // == Forward ==
    /// Forwards one request and always produces a response: the upstream's
    /// own (any status), 405 for unsupported methods, 400 for dot segments,
    /// or a 502 envelope when the upstream cannot be reached.
    pub async fn forward(
        &self,
        method: Method,
        segments: &[&str],
        query: Option<&str>,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Response {
        if !FORWARDED_METHODS.contains(&method) {
            let body = Json(json!({
                "error": "Method not allowed",
                "message": format!("{} is not forwarded", method),
            }));
            return (StatusCode::METHOD_NOT_ALLOWED, body).into_response();
        }

        if let Some(segment) = segments.iter().find(|s| is_dot_segment(s)) {
            return ProxyError::InvalidPath(segment.to_string()).into_response();
        }

        let url = self.target_url(segments, query);
        match self.relay(method, &url, headers, body).await {
            Ok(response) => response,
            Err(err) => {
                warn!(url = %url, error = %err, "upstream unreachable");
                err.into_response()
            }
        }
    }

    async fn relay(
        &self,
        method: Method,
        url: &str,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<Response, ProxyError> {
        debug!(%method, url, "forwarding to backend");

        let carries_body = method != Method::GET && method != Method::HEAD;
        let mut request = self
            .http
            .request(method, url)
            .headers(forward_request_headers(headers));
        if carries_body {
            request = request.body(body);
        }

        let upstream = request
            .send()
            .await
            .map_err(|err| ProxyError::Connectivity(describe(&err)))?;

        let status = upstream.status();
        let headers = relay_response_headers(upstream.headers());
        let bytes = upstream
            .bytes()
            .await
            .map_err(|err| ProxyError::Connectivity(describe(&err)))?;

        debug!(url, status = status.as_u16(), len = bytes.len(), "relaying backend response");

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

/// True for `.` and `..`, percent-encoded dots included in either case.
///
/// The URL parser resolves these, which would move the target outside
/// `<origin>/api`. Backslashes count as separators there too.
pub fn is_dot_segment(segment: &str) -> bool {
    let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
    decoded.split('\\').any(|part| part == "." || part == "..")
}

// reqwest's top-level message omits the cause ("error sending request for url")
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = std::error::Error::source(cause);
    }
    message
}
