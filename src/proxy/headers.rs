//! Header hygiene for forwarded requests and relayed responses.
//!
//! Hop-by-hop headers describe a single connection and are never forwarded.
//! Lengths are recomputed by the transport on each side.

use std::collections::HashSet;

use axum::http::header::{CONNECTION, CONTENT_LENGTH, HOST};
use axum::http::{HeaderMap, HeaderName};

/// Connection-scoped headers dropped in both directions.
pub const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

/// Headers to send upstream.
///
/// `host` is dropped so the upstream sees its own authority, and
/// `content-length` because the body is re-framed by the client.
pub fn forward_request_headers(src: &HeaderMap) -> HeaderMap {
    filter(src, &[HOST, CONTENT_LENGTH])
}

/// Headers to relay back to the caller.
pub fn relay_response_headers(src: &HeaderMap) -> HeaderMap {
    filter(src, &[CONTENT_LENGTH])
}

fn filter(src: &HeaderMap, also_drop: &[HeaderName]) -> HeaderMap {
    let nominated = connection_tokens(src);
    let mut out = HeaderMap::with_capacity(src.len());

    for (name, value) in src.iter() {
        if is_hop_by_hop(name)
            || also_drop.contains(name)
            || nominated.contains(name.as_str())
        {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

// Headers named in `Connection: close, x-foo` are hop-by-hop for this hop too.
fn connection_tokens(headers: &HeaderMap) -> HashSet<String> {
    headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(|token| token.trim().to_ascii_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn test_request_headers_drop_hop_by_hop() {
        let mut pairs: Vec<(&str, &str)> = HOP_BY_HOP.iter().map(|name| (*name, "x")).collect();
        pairs.push(("accept", "application/json"));
        pairs.push(("authorization", "Bearer t"));
        pairs.push(("host", "localhost:3000"));
        pairs.push(("content-length", "12"));

        let out = forward_request_headers(&headers(&pairs));

        for name in HOP_BY_HOP {
            assert!(!out.contains_key(name), "{} should be dropped", name);
        }
        assert!(!out.contains_key("host"));
        assert!(!out.contains_key("content-length"));
        assert_eq!(out.get("accept").unwrap(), "application/json");
        assert_eq!(out.get("authorization").unwrap(), "Bearer t");
    }

    #[test]
    fn test_response_headers_keep_content_type_and_cookies() {
        let src = headers(&[
            ("content-type", "application/json"),
            ("set-cookie", "a=1"),
            ("set-cookie", "b=2"),
            ("content-length", "99"),
            ("transfer-encoding", "chunked"),
            ("connection", "keep-alive"),
        ]);

        let out = relay_response_headers(&src);

        assert_eq!(out.get("content-type").unwrap(), "application/json");
        assert_eq!(out.get_all("set-cookie").iter().count(), 2);
        assert!(!out.contains_key("content-length"));
        assert!(!out.contains_key("transfer-encoding"));
        assert!(!out.contains_key("connection"));
    }

    #[test]
    fn test_connection_nominated_headers_dropped() {
        let src = headers(&[("connection", "close, X-Debug-Trace"), ("x-debug-trace", "1"), ("x-keep", "1")]);

        let out = forward_request_headers(&src);

        assert!(!out.contains_key("x-debug-trace"));
        assert!(out.contains_key("x-keep"));
    }
}
