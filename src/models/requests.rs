//! Request DTOs for the gateway API
//!
//! Query strings accepted by the typed `/api/...` endpoints. Every query
//! takes an optional `force=true` that bypasses the cache for the read.

use serde::Deserialize;

use crate::models::{IndexParams, RankingLevel, RankingsParams, SortOrder};

/// `?version=` only
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionQuery {
    pub version: Option<String>,
    #[serde(default)]
    pub force: bool,
}

/// Query for `GET /api/divisions`
#[derive(Debug, Clone, Deserialize)]
pub struct DivisionsQuery {
    pub section: String,
    pub version: Option<String>,
    #[serde(default)]
    pub force: bool,
}

/// Query for `GET /api/groups`
#[derive(Debug, Clone, Deserialize)]
pub struct GroupsQuery {
    pub section: String,
    pub division: String,
    pub version: Option<String>,
    #[serde(default)]
    pub force: bool,
}

/// Query for `GET /api/industry` and `GET /api/index`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndustryQuery {
    pub section: Option<String>,
    pub division: Option<String>,
    pub group: Option<String>,
    pub subclass: Option<String>,
    pub version: Option<String>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub forecast_years: Option<u32>,
    #[serde(default)]
    pub force: bool,
}

impl IndustryQuery {
    /// Validates the year bounds and converts into lookup parameters.
    pub fn into_params(self) -> Result<IndexParams, String> {
        if let (Some(from), Some(to)) = (self.year_from, self.year_to) {
            if from > to {
                return Err(format!("year_from {} is after year_to {}", from, to));
            }
        }
        Ok(IndexParams {
            section: self.section,
            division: self.division,
            group: self.group,
            subclass: self.subclass,
            version: self.version,
            year_from: self.year_from,
            year_to: self.year_to,
            forecast_years: self.forecast_years,
        })
    }
}

/// Query for `GET /api/compare` and `GET /api/trends`
#[derive(Debug, Clone, Deserialize)]
pub struct CompareQuery {
    /// Comma-separated codes, e.g. `46,47,G,C`
    pub codes: String,
    /// `<from>-<to>`
    pub years: Option<String>,
    pub version: Option<String>,
    pub metrics: Option<String>,
    #[serde(default)]
    pub force: bool,
}

impl CompareQuery {
    /// Splits the code list, dropping blanks.
    pub fn code_list(&self) -> Vec<String> {
        self.codes
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Query for `GET /api/rankings`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RankingsQuery {
    pub level: Option<RankingLevel>,
    pub version: Option<String>,
    pub limit: Option<u32>,
    pub min_score: Option<f64>,
    pub order: Option<SortOrder>,
    #[serde(default)]
    pub force: bool,
}

impl RankingsQuery {
    pub fn to_params(&self) -> RankingsParams {
        RankingsParams {
            level: self.level,
            version: self.version.clone(),
            limit: self.limit,
            min_score: self.min_score,
            order: self.order,
        }
    }
}

/// Query for `GET /api/classifications/{type}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassificationsQuery {
    pub version: Option<String>,
    pub limit: Option<u32>,
    #[serde(default)]
    pub force: bool,
}

/// Query for `GET /api/translate`
#[derive(Debug, Clone, Deserialize)]
pub struct TranslateQuery {
    pub code: String,
    pub from_version: String,
    pub to_version: String,
    #[serde(default)]
    pub force: bool,
}

/// Query for `GET /api/economy/snapshot`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotQuery {
    pub version: Option<String>,
    pub year: Option<i32>,
    #[serde(default)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_code_list() {
        let query = CompareQuery {
            codes: "46, 47,,G,C ".to_string(),
            years: None,
            version: None,
            metrics: None,
            force: false,
        };
        assert_eq!(query.code_list(), vec!["46", "47", "G", "C"]);
    }

    #[test]
    fn test_industry_query_rejects_inverted_years() {
        let query = IndustryQuery {
            year_from: Some(2020),
            year_to: Some(2010),
            ..IndustryQuery::default()
        };
        assert!(query.into_params().is_err());
    }

    #[test]
    fn test_industry_query_into_params() {
        let query = IndustryQuery {
            section: Some("C".to_string()),
            division: Some("10".to_string()),
            year_from: Some(2015),
            ..IndustryQuery::default()
        };
        let params = query.into_params().unwrap();
        assert_eq!(params.section.as_deref(), Some("C"));
        assert_eq!(params.year_from, Some(2015));
        assert!(params.year_to.is_none());
    }

    #[test]
    fn test_rankings_query_deserialize() {
        let query: RankingsQuery =
            serde_json::from_str(r#"{"level":"division","order":"asc","limit":10}"#).unwrap();
        let params = query.to_params();
        assert_eq!(params.level, Some(RankingLevel::Division));
        assert_eq!(params.order, Some(SortOrder::Asc));
        assert_eq!(params.limit, Some(10));
        assert!(!query.force);
    }
}
