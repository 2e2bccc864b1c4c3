//! Configuration Module
//!
//! Handles loading and managing gateway configuration from environment variables.

use std::env;
use std::path::PathBuf;

use crate::cache::DEFAULT_TTL_SECS;
use crate::models::DEFAULT_VERSION;

/// Backend used when nothing is configured.
pub const DEFAULT_BACKEND_ORIGIN: &str = "http://localhost:8000";

/// Gateway configuration, built once at startup and shared by reference.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend origin every lookup and forwarded request targets, no trailing slash
    pub backend_origin: String,
    /// HTTP server port
    pub server_port: u16,
    /// Freshness window for cached responses in seconds
    pub cache_ttl: u64,
    /// Directory for the persistent cache tier; memory-only when unset
    pub cache_dir: Option<PathBuf>,
    /// Data version used when a request does not name one
    pub default_version: String,
    /// Largest request body accepted for forwarding, in bytes
    pub max_body_bytes: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `API_BASE` - Full backend URL, takes precedence over `API_IP`/`API_PORT`
    /// - `API_IP`, `API_PORT` - Backend host and port, used together
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_TTL` - Cache TTL in seconds (default: 3600)
    /// - `CACHE_DIR` - Persistent cache directory (default: none)
    /// - `PKD_VERSION` - Default data version (default: 2025)
    /// - `MAX_BODY_BYTES` - Forwarded body limit (default: 16 MiB)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend_origin: resolve_backend_origin(
                env::var("API_BASE").ok().as_deref(),
                env::var("API_IP").ok().as_deref(),
                env::var("API_PORT").ok().as_deref(),
            ),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            cache_ttl: env::var("CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_ttl),
            cache_dir: env::var("CACHE_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            default_version: env::var("PKD_VERSION")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.default_version),
            max_body_bytes: env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_body_bytes),
        }
    }

    /// Same defaults, pointed at `origin`.
    pub fn with_backend(origin: &str) -> Self {
        Self {
            backend_origin: origin.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_origin: DEFAULT_BACKEND_ORIGIN.to_string(),
            server_port: 3000,
            cache_ttl: DEFAULT_TTL_SECS,
            cache_dir: None,
            default_version: DEFAULT_VERSION.to_string(),
            max_body_bytes: 16 * 1024 * 1024,
        }
    }
}

/// Full base URL wins, then `http://ip:port`, then the local default.
pub fn resolve_backend_origin(base: Option<&str>, ip: Option<&str>, port: Option<&str>) -> String {
    if let Some(base) = present(base) {
        return base.trim_end_matches('/').to_string();
    }
    match (present(ip), present(port)) {
        (Some(ip), Some(port)) => format!("http://{}:{}", ip, port),
        _ => DEFAULT_BACKEND_ORIGIN.to_string(),
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
