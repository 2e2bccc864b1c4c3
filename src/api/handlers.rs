//! API Handlers
//!
//! HTTP request handlers for the typed lookups, the passthrough proxy and
//! the gateway's own health and stats endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, Method, Uri},
    response::Response,
    Json,
};
use serde_json::Value;

use crate::cache::{FileStorage, NoStorage, ResponseCache, Storage, SystemClock};
use crate::client::{ApiClient, FetchOptions};
use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::models::pkd::{is_valid_division, is_valid_section};
use crate::models::requests::{
    ClassificationsQuery, CompareQuery, DivisionsQuery, GroupsQuery, IndustryQuery, RankingsQuery,
    SnapshotQuery, TranslateQuery, VersionQuery,
};
use crate::models::{
    ClassificationType, DivisionsResponse, GroupsResponse, HealthResponse, SectionsResponse,
    StatsResponse, YearRange,
};
use crate::proxy::RequestProxy;

/// Path prefix served by the passthrough proxy.
pub const PROXY_PREFIX: &str = "/api/proxy";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cached client talking to the backend directly
    pub client: ApiClient,
    /// Passthrough for `/api/proxy/...`
    pub proxy: Arc<RequestProxy>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates a new AppState from its parts.
    pub fn new(client: ApiClient, proxy: RequestProxy, config: Config) -> Self {
        Self {
            client,
            proxy: Arc::new(proxy),
            config: Arc::new(config),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Uses a file-backed persistent tier when `cache_dir` is set.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let storage: Arc<dyn Storage> = match &config.cache_dir {
            Some(dir) => Arc::new(FileStorage::new(dir)),
            None => Arc::new(NoStorage),
        };
        let cache = ResponseCache::new(
            storage,
            Arc::new(SystemClock),
            Duration::from_secs(config.cache_ttl),
        );
        let client = ApiClient::for_backend(&config.backend_origin, Arc::new(cache))
            .with_default_version(config.default_version.clone());
        let proxy = RequestProxy::new(&config.backend_origin)?;

        Ok(Self::new(client, proxy, config.clone()))
    }
}

fn options(force: bool) -> FetchOptions {
    FetchOptions::default().with_force(force)
}

fn parse_years(years: Option<&str>) -> ApiResult<Option<YearRange>> {
    years
        .filter(|y| !y.is_empty())
        .map(|y| y.parse::<YearRange>())
        .transpose()
        .map_err(ApiError::InvalidRequest)
}

/// Handler for GET /api/sections
pub async fn sections_handler(
    State(state): State<AppState>,
    Query(query): Query<VersionQuery>,
) -> ApiResult<Json<SectionsResponse>> {
    let sections = state
        .client
        .sections(query.version.as_deref(), &options(query.force))
        .await?;
    Ok(Json(sections))
}

/// Handler for GET /api/divisions
///
/// Never fails on backend errors: the generated list is served instead.
pub async fn divisions_handler(
    State(state): State<AppState>,
    Query(query): Query<DivisionsQuery>,
) -> ApiResult<Json<DivisionsResponse>> {
    let section = query.section.to_ascii_uppercase();
    if !is_valid_section(&section) {
        return Err(ApiError::InvalidRequest(format!(
            "Section must be a letter A-U, got '{}'",
            query.section
        )));
    }

    let divisions = state
        .client
        .divisions(&section, query.version.as_deref(), &options(query.force))
        .await?;
    Ok(Json(divisions))
}

/// Handler for GET /api/groups
pub async fn groups_handler(
    State(state): State<AppState>,
    Query(query): Query<GroupsQuery>,
) -> ApiResult<Json<GroupsResponse>> {
    let section = query.section.to_ascii_uppercase();
    if !is_valid_section(&section) || !is_valid_division(&query.division) {
        return Err(ApiError::InvalidRequest(format!(
            "Expected section A-U and division 01-99, got '{}' / '{}'",
            query.section, query.division
        )));
    }

    let groups = state
        .client
        .groups(
            &section,
            &query.division,
            query.version.as_deref(),
            &options(query.force),
        )
        .await?;
    Ok(Json(groups))
}

/// Handler for GET /api/industry
pub async fn industry_handler(
    State(state): State<AppState>,
    Query(query): Query<IndustryQuery>,
) -> ApiResult<Json<Value>> {
    let force = query.force;
    let params = query.into_params().map_err(ApiError::InvalidRequest)?;
    Ok(Json(state.client.industry(&params, &options(force)).await?))
}

/// Handler for GET /api/index
pub async fn index_handler(
    State(state): State<AppState>,
    Query(query): Query<IndustryQuery>,
) -> ApiResult<Json<Value>> {
    let force = query.force;
    let params = query.into_params().map_err(ApiError::InvalidRequest)?;
    Ok(Json(state.client.index(&params, &options(force)).await?))
}

/// Handler for GET /api/compare
pub async fn compare_handler(
    State(state): State<AppState>,
    Query(query): Query<CompareQuery>,
) -> ApiResult<Json<Value>> {
    let codes = query.code_list();
    if codes.is_empty() {
        return Err(ApiError::InvalidRequest("At least one code is required".to_string()));
    }
    let years = parse_years(query.years.as_deref())?;

    let data = state
        .client
        .compare(&codes, years, query.version.as_deref(), &options(query.force))
        .await?;
    Ok(Json(data))
}

/// Handler for GET /api/trends
pub async fn trends_handler(
    State(state): State<AppState>,
    Query(query): Query<CompareQuery>,
) -> ApiResult<Json<Value>> {
    let codes = query.code_list();
    if codes.is_empty() {
        return Err(ApiError::InvalidRequest("At least one code is required".to_string()));
    }
    let years = parse_years(query.years.as_deref())?;

    let data = state
        .client
        .trends(&codes, years, query.metrics.as_deref(), &options(query.force))
        .await?;
    Ok(Json(data))
}

/// Handler for GET /api/rankings
pub async fn rankings_handler(
    State(state): State<AppState>,
    Query(query): Query<RankingsQuery>,
) -> ApiResult<Json<Value>> {
    let data = state
        .client
        .rankings(&query.to_params(), &options(query.force))
        .await?;
    Ok(Json(data))
}

/// Handler for GET /api/classifications/:kind
pub async fn classifications_handler(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<ClassificationsQuery>,
) -> ApiResult<Json<Value>> {
    let kind: ClassificationType = kind.parse().map_err(ApiError::InvalidRequest)?;

    let data = state
        .client
        .classifications(kind, query.version.as_deref(), query.limit, &options(query.force))
        .await?;
    Ok(Json(data))
}

/// Handler for GET /api/translate
pub async fn translate_handler(
    State(state): State<AppState>,
    Query(query): Query<TranslateQuery>,
) -> ApiResult<Json<Value>> {
    let data = state
        .client
        .translate(
            &query.code,
            &query.from_version,
            &query.to_version,
            &options(query.force),
        )
        .await?;
    Ok(Json(data))
}

/// Handler for GET /api/economy/snapshot
pub async fn snapshot_handler(
    State(state): State<AppState>,
    Query(query): Query<SnapshotQuery>,
) -> ApiResult<Json<Value>> {
    let data = state
        .client
        .economy_snapshot(query.version.as_deref(), query.year, &options(query.force))
        .await?;
    Ok(Json(data))
}

/// Handler for GET /api/health: the backend's own health check, uncached.
pub async fn backend_health_handler(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    Ok(Json(state.client.health().await?))
}

/// Handler for any method on /api/proxy and /api/proxy/*path
///
/// Path segments and query string are taken from the raw URI so
/// percent-encoding reaches the backend unchanged.
pub async fn proxy_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let rest = uri.path().strip_prefix(PROXY_PREFIX).unwrap_or_default();
    let rest = rest.strip_prefix('/').unwrap_or(rest);
    let segments: Vec<&str> = if rest.is_empty() {
        Vec::new()
    } else {
        rest.split('/').collect()
    };

    state
        .proxy
        .forward(method, &segments, uri.query(), &headers, body)
        .await
}

/// Handler for GET /api/cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.client.cache();
    let stats = cache.stats().await;

    Json(StatsResponse::new(stats, cache.ttl().as_secs()))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.proxy.origin()))
}
