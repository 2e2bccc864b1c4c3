//! API Module
//!
//! HTTP handlers and routing for the gateway.
//!
//! # Endpoints
//! - `GET /health` - Gateway health check
//! - `GET /api/cache/stats` - Cache statistics
//! - `GET /api/...` - Typed, cached lookups against the backend
//! - `ANY /api/proxy/...` - Uncached passthrough to the backend

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
