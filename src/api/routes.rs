//! API Routes
//!
//! Configures the Axum router with all gateway endpoints.

use axum::{
    extract::DefaultBodyLimit,
    routing::{any, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    backend_health_handler, classifications_handler, compare_handler, divisions_handler,
    groups_handler, health_handler, index_handler, industry_handler, proxy_handler,
    rankings_handler, sections_handler, snapshot_handler, stats_handler, translate_handler,
    trends_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Gateway liveness
/// - `GET /api/health` - Backend health, uncached
/// - `GET /api/cache/stats` - Cache counters
/// - `GET /api/{sections,divisions,groups}` - Code lists
/// - `GET /api/{industry,index,compare,trends,rankings,translate}` - Cached lookups
/// - `GET /api/classifications/:kind` - Classified industries
/// - `GET /api/economy/snapshot` - Whole-economy snapshot
/// - `ANY /api/proxy/*path` - Passthrough to `<backend>/api/*path`
///
/// # Middleware
/// - Body limit: `max_body_bytes` from config
/// - CORS: Allows any origin on the gateway's own endpoints. The passthrough
///   is left out so `OPTIONS` reaches the backend like any other method.
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let body_limit = DefaultBodyLimit::max(state.config.max_body_bytes);

    let lookups: Router<AppState> = Router::new()
        .route("/health", get(health_handler))
        .route("/api/health", get(backend_health_handler))
        .route("/api/cache/stats", get(stats_handler))
        .route("/api/sections", get(sections_handler))
        .route("/api/divisions", get(divisions_handler))
        .route("/api/groups", get(groups_handler))
        .route("/api/industry", get(industry_handler))
        .route("/api/index", get(index_handler))
        .route("/api/compare", get(compare_handler))
        .route("/api/trends", get(trends_handler))
        .route("/api/rankings", get(rankings_handler))
        .route("/api/classifications/:kind", get(classifications_handler))
        .route("/api/translate", get(translate_handler))
        .route("/api/economy/snapshot", get(snapshot_handler))
        .layer(cors);

    let passthrough: Router<AppState> = Router::new()
        .route("/api/proxy", any(proxy_handler))
        .route("/api/proxy/*path", any(proxy_handler));

    lookups
        .merge(passthrough)
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
