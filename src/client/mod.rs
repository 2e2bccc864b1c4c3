//! Cached API Client
//!
//! Typed accessors over the PKD backend. Reads go through the two-tier
//! [`ResponseCache`]; a miss (or `force`) costs exactly one HTTP request.
//! Divisions and groups degrade to generated lists when that request fails,
//! every other lookup propagates the failure.

mod fallback;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::{CacheKey, ResponseCache};
use crate::error::{ClientError, Result};
use crate::models::{
    ClassificationType, DivisionsResponse, GroupsResponse, IndexParams, RankingsParams,
    SectionsResponse, YearRange, DEFAULT_VERSION,
};

pub use fallback::{fallback_divisions, fallback_groups};

type Query = Vec<(&'static str, Option<String>)>;

// == Fetch Options ==
/// Per-call options shared by every accessor.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Skip both cache tiers for the read; the result is still cached.
    pub force: bool,
    /// Cancels the network request. A cancelled fetch writes nothing and
    /// returns [`ClientError::Aborted`].
    pub cancel: Option<CancellationToken>,
}

impl FetchOptions {
    pub fn forced() -> Self {
        Self {
            force: true,
            cancel: None,
        }
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

// == Api Client ==
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    /// Prefix every lookup path is appended to, without trailing slash
    base_url: String,
    cache: Arc<ResponseCache>,
    default_version: String,
}

impl ApiClient {
    // == Constructors ==
    /// Creates a client whose lookups resolve to `<base_url>/<endpoint>`.
    pub fn new(base_url: impl Into<String>, cache: Arc<ResponseCache>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            cache,
            default_version: DEFAULT_VERSION.to_string(),
        }
    }

    /// Talks to the backend directly: `<origin>/api/<endpoint>`.
    pub fn for_backend(origin: &str, cache: Arc<ResponseCache>) -> Self {
        Self::new(format!("{}/api", origin.trim_end_matches('/')), cache)
    }

    /// Goes through a gateway's passthrough: `<gateway>/api/proxy/<endpoint>`.
    pub fn through_proxy(gateway: &str, cache: Arc<ResponseCache>) -> Self {
        Self::new(format!("{}/api/proxy", gateway.trim_end_matches('/')), cache)
    }

    pub fn with_default_version(mut self, version: impl Into<String>) -> Self {
        self.default_version = version.into();
        self
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    fn version<'a>(&'a self, version: Option<&'a str>) -> &'a str {
        version.unwrap_or(&self.default_version)
    }

    // == Health ==
    /// Backend health check. Never cached.
    pub async fn health(&self) -> Result<Value> {
        self.fetch("health", Vec::new(), None).await
    }

    // == Code Lists ==
    pub async fn sections(
        &self,
        version: Option<&str>,
        opts: &FetchOptions,
    ) -> Result<SectionsResponse> {
        let version = self.version(version);
        let key = CacheKey::new("sections").finish(version);
        let query = vec![("version", Some(version.to_string()))];
        self.cached_fetch(key, "sections", query, opts).await
    }

    /// Divisions of `section`; falls back to `"01"..="99"` on failure.
    pub async fn divisions(
        &self,
        section: &str,
        version: Option<&str>,
        opts: &FetchOptions,
    ) -> Result<DivisionsResponse> {
        let version = self.version(version);
        let key = CacheKey::new("divisions").param(Some(section)).finish(version);
        let query = vec![
            ("section", Some(section.to_string())),
            ("version", Some(version.to_string())),
        ];

        match self.cached_fetch(key, "divisions", query, opts).await {
            Err(err) if !err.is_aborted() => {
                warn!(section, error = %err, "divisions unavailable, serving generated list");
                self.cache.record_fallback().await;
                Ok(DivisionsResponse {
                    section: section.to_string(),
                    version: version.to_string(),
                    divisions: fallback_divisions(),
                })
            }
            result => result,
        }
    }

    /// Groups of `section`/`division`; falls back to `"1"..="99"` on failure.
    pub async fn groups(
        &self,
        section: &str,
        division: &str,
        version: Option<&str>,
        opts: &FetchOptions,
    ) -> Result<GroupsResponse> {
        let version = self.version(version);
        let key = CacheKey::new("groups")
            .param(Some(section))
            .param(Some(division))
            .finish(version);
        let query = vec![
            ("section", Some(section.to_string())),
            ("division", Some(division.to_string())),
            ("version", Some(version.to_string())),
        ];

        match self.cached_fetch(key, "groups", query, opts).await {
            Err(err) if !err.is_aborted() => {
                warn!(section, division, error = %err, "groups unavailable, serving generated list");
                self.cache.record_fallback().await;
                Ok(GroupsResponse {
                    section: section.to_string(),
                    division: division.to_string(),
                    version: version.to_string(),
                    groups: fallback_groups(),
                })
            }
            result => result,
        }
    }

    // == Industry Data ==
    /// Financial, unit and bankruptcy series for one code.
    pub async fn industry(&self, params: &IndexParams, opts: &FetchOptions) -> Result<Value> {
        let (key, query) = self.index_request("industry", params, false);
        self.cached_fetch(key, "industry", query, opts).await
    }

    /// Scored trend and forecast for one code.
    pub async fn index(&self, params: &IndexParams, opts: &FetchOptions) -> Result<Value> {
        let (key, query) = self.index_request("index", params, true);
        self.cached_fetch(key, "index", query, opts).await
    }

    fn index_request(
        &self,
        endpoint: &str,
        params: &IndexParams,
        with_forecast: bool,
    ) -> (String, Query) {
        let version = self.version(params.version.as_deref()).to_string();
        let forecast_years = params.forecast_years.filter(|_| with_forecast);

        let key = CacheKey::new(endpoint)
            .param(params.section.as_deref())
            .param(params.division.as_deref())
            .param(params.group.as_deref())
            .param(params.subclass.as_deref())
            .param(params.year_from)
            .param(params.year_to)
            .param(forecast_years)
            .finish(&version);
        let query = vec![
            ("section", params.section.clone()),
            ("division", params.division.clone()),
            ("group", params.group.clone()),
            ("subclass", params.subclass.clone()),
            ("version", Some(version)),
            ("year_from", params.year_from.map(|y| y.to_string())),
            ("year_to", params.year_to.map(|y| y.to_string())),
            ("forecast_years", forecast_years.map(|n| n.to_string())),
        ];
        (key, query)
    }

    // == Comparison ==
    /// Aggregated series for several codes over an optional year range.
    pub async fn compare(
        &self,
        codes: &[String],
        years: Option<YearRange>,
        version: Option<&str>,
        opts: &FetchOptions,
    ) -> Result<Value> {
        let version = self.version(version);
        let codes = codes.join(",");
        let key = CacheKey::new("compare")
            .param(Some(&codes))
            .param(years)
            .finish(version);
        let query = vec![
            ("codes", Some(codes.clone())),
            ("years", years.map(|y| y.to_string())),
            ("version", Some(version.to_string())),
        ];
        self.cached_fetch(key, "compare", query, opts).await
    }

    /// Metric trends over time for several codes.
    pub async fn trends(
        &self,
        codes: &[String],
        years: Option<YearRange>,
        metrics: Option<&str>,
        opts: &FetchOptions,
    ) -> Result<Value> {
        let codes = codes.join(",");
        let key = CacheKey::new("trends")
            .param(Some(&codes))
            .param(years)
            .param(metrics)
            .finish(&self.default_version);
        let query = vec![
            ("codes", Some(codes.clone())),
            ("years", years.map(|y| y.to_string())),
            ("metrics", metrics.map(str::to_string)),
        ];
        self.cached_fetch(key, "trends", query, opts).await
    }

    // == Rankings and Classifications ==
    pub async fn rankings(&self, params: &RankingsParams, opts: &FetchOptions) -> Result<Value> {
        let version = self.version(params.version.as_deref());
        let key = CacheKey::new("rankings")
            .param(params.level)
            .param(params.limit)
            .param(params.min_score)
            .param(params.order)
            .finish(version);
        let query = vec![
            ("level", params.level.map(|l| l.to_string())),
            ("version", Some(version.to_string())),
            ("limit", params.limit.map(|n| n.to_string())),
            ("min_score", params.min_score.map(|s| s.to_string())),
            ("order", params.order.map(|o| o.to_string())),
        ];
        self.cached_fetch(key, "rankings", query, opts).await
    }

    pub async fn classifications(
        &self,
        kind: ClassificationType,
        version: Option<&str>,
        limit: Option<u32>,
        opts: &FetchOptions,
    ) -> Result<Value> {
        let version = self.version(version);
        let key = CacheKey::new("classifications")
            .param(Some(kind))
            .param(limit)
            .finish(version);
        let query = vec![
            ("version", Some(version.to_string())),
            ("limit", limit.map(|n| n.to_string())),
        ];
        let path = format!("classifications/{}", kind);
        self.cached_fetch(key, &path, query, opts).await
    }

    // == Misc Lookups ==
    /// Translates a code between PKD versions (2007 and 2025).
    pub async fn translate(
        &self,
        code: &str,
        from_version: &str,
        to_version: &str,
        opts: &FetchOptions,
    ) -> Result<Value> {
        let key = CacheKey::new("translate")
            .param(Some(code))
            .param(Some(from_version))
            .finish(to_version);
        let query = vec![
            ("code", Some(code.to_string())),
            ("from_version", Some(from_version.to_string())),
            ("to_version", Some(to_version.to_string())),
        ];
        self.cached_fetch(key, "translate", query, opts).await
    }

    /// Whole-economy snapshot for one year.
    pub async fn economy_snapshot(
        &self,
        version: Option<&str>,
        year: Option<i32>,
        opts: &FetchOptions,
    ) -> Result<Value> {
        let version = self.version(version);
        let key = CacheKey::new("economy/snapshot").param(year).finish(version);
        let query = vec![
            ("version", Some(version.to_string())),
            ("year", year.map(|y| y.to_string())),
        ];
        self.cached_fetch(key, "economy/snapshot", query, opts).await
    }

    // == Cached Fetch ==
    /// Serves `key` from cache unless forced, otherwise fetches `path` and
    /// caches the body. Bodies that do not decode as `T` are never cached.
    async fn cached_fetch<T: DeserializeOwned>(
        &self,
        key: String,
        path: &str,
        query: Query,
        opts: &FetchOptions,
    ) -> Result<T> {
        if !opts.force {
            if let Some(cached) = self.cache.lookup(&key).await {
                match serde_json::from_value(cached) {
                    Ok(value) => return Ok(value),
                    Err(err) => debug!(key, error = %err, "cached entry has unexpected shape"),
                }
            }
        }

        let fetched = self.fetch(path, query, opts.cancel.as_ref()).await;

        // A caller that cancelled sees Aborted, whatever the response was
        if opts.cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
            return Err(ClientError::Aborted);
        }
        let body = fetched?;
        let value = serde_json::from_value(body.clone())?;
        self.cache.store(&key, body).await;
        Ok(value)
    }

    // == Fetch ==
    /// One GET against `<base_url>/<path>`, absent parameters omitted.
    async fn fetch(
        &self,
        path: &str,
        query: Query,
        cancel: Option<&CancellationToken>,
    ) -> Result<Value> {
        let request = self.request(path, query);
        match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(ClientError::Aborted),
                result = request => result,
            },
            None => request.await,
        }
    }

    async fn request(&self, path: &str, query: Query) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, path);
        let query: Vec<(&str, String)> = query
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name, v)))
            .collect();
        debug!(url = %url, ?query, "fetching from backend");

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
