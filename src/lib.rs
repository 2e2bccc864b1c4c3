//! PKD Gateway - caching API gateway for the PKD industry analytics backend
//!
//! Serves typed lookups through a two-tier TTL cache and forwards
//! `/api/proxy/...` requests to the backend untouched.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod proxy;

pub use api::{create_router, AppState};
pub use cache::ResponseCache;
pub use client::{ApiClient, FetchOptions};
pub use config::Config;
pub use error::{ApiError, ClientError, ProxyError};
pub use proxy::RequestProxy;
