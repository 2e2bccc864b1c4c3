//! Response DTOs
//!
//! Code-list payloads returned by the backend (and by the fallback
//! generators), plus the gateway's own health and stats bodies.

use serde::{Deserialize, Serialize};

use crate::cache::CacheStats;

/// Body of `GET /api/sections`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionsResponse {
    #[serde(default)]
    pub version: String,
    pub sections: Vec<String>,
}

/// Body of `GET /api/divisions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisionsResponse {
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub version: String,
    pub divisions: Vec<String>,
}

/// Body of `GET /api/groups`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupsResponse {
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub division: String,
    #[serde(default)]
    pub version: String,
    pub groups: Vec<String>,
}

/// Response body for the stats endpoint (GET /api/cache/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Hit rate across both tiers
    pub hit_rate: f64,
    /// Freshness window in seconds
    pub ttl_secs: u64,
}

impl StatsResponse {
    pub fn new(stats: CacheStats, ttl_secs: u64) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            stats,
            ttl_secs,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// Backend origin this gateway forwards to
    pub backend: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(backend: impl Into<String>) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            backend: backend.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divisions_response_tolerates_missing_metadata() {
        let parsed: DivisionsResponse = serde_json::from_str(r#"{"divisions":["05","06"]}"#).unwrap();
        assert_eq!(parsed.divisions, vec!["05", "06"]);
        assert!(parsed.section.is_empty());
    }

    #[test]
    fn test_groups_response_requires_list() {
        assert!(serde_json::from_str::<GroupsResponse>(r#"{"section":"C"}"#).is_err());
    }

    #[test]
    fn test_stats_response_flattens_counters() {
        let mut stats = CacheStats::new();
        stats.record_memory_hit();
        stats.record_miss();

        let json = serde_json::to_value(StatsResponse::new(stats, 3600)).unwrap();
        assert_eq!(json["memory_hits"], 1);
        assert_eq!(json["misses"], 1);
        assert_eq!(json["ttl_secs"], 3600);
        assert!((json["hit_rate"].as_f64().unwrap() - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy("http://localhost:8000");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
        assert!(json.contains("localhost:8000"));
    }
}
