//! PKD domain types
//!
//! Code selections, year ranges and the enumerations accepted by the
//! ranking and classification lookups.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Data version used when a caller does not name one.
pub const DEFAULT_VERSION: &str = "2025";

// == PKD Selection ==
/// One PKD code picked by the user, at section, division or class depth.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PkdSelection {
    /// Section letter A–U
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Two-digit division "01".."99"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,
    /// One or two digit class suffix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composed_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_code: Option<String>,
}

impl PkdSelection {
    /// Builds a normalized selection: upper-case section, zero-padded
    /// division, and the dotted code (`B.02.31`) filled in.
    ///
    /// Empty strings are treated as absent. Returns an error message naming
    /// the first invalid part.
    pub fn new(
        section: Option<&str>,
        division: Option<&str>,
        suffix: Option<&str>,
    ) -> Result<Self, String> {
        let section = non_empty(section).map(|s| s.to_ascii_uppercase());
        let division = non_empty(division).map(pad_division);
        let suffix = non_empty(suffix).map(str::to_string);

        if let Some(s) = &section {
            if !is_valid_section(s) {
                return Err(format!("Section must be a letter A-U, got '{}'", s));
            }
        }
        if let Some(d) = &division {
            if !is_valid_division(d) {
                return Err(format!("Division must be two digits 01-99, got '{}'", d));
            }
            if section.is_none() {
                return Err("Division requires a section".to_string());
            }
        }
        if let Some(s) = &suffix {
            if !is_valid_suffix(s) {
                return Err(format!("Class must be 1-2 digits, got '{}'", s));
            }
            if division.is_none() {
                return Err("Class requires a division".to_string());
            }
        }

        let mut selection = Self {
            section,
            division,
            suffix,
            composed_code: None,
            display_code: None,
        };
        selection.composed_code = selection.compose();
        selection.display_code = selection.composed_code.clone();
        Ok(selection)
    }

    /// Dotted code of the selected parts, or `None` if nothing is selected.
    pub fn compose(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.section, &self.division, &self.suffix]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("."))
        }
    }

    /// The identifier used in comparison lists: the deepest selected level
    /// without the section prefix (`02.31`, `02`), or the section letter.
    pub fn comparison_code(&self) -> Option<String> {
        match (&self.section, &self.division, &self.suffix) {
            (_, Some(d), Some(s)) => Some(format!("{}.{}", d, s)),
            (_, Some(d), None) => Some(d.clone()),
            (Some(sec), None, _) => Some(sec.clone()),
            _ => None,
        }
    }

    /// Query parameters for the industry and index lookups.
    pub fn to_index_params(&self) -> IndexParams {
        IndexParams {
            section: self.section.clone(),
            division: self.division.clone(),
            group: self.suffix.clone(),
            ..IndexParams::default()
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn pad_division(value: &str) -> String {
    if value.len() == 1 && value.chars().all(|c| c.is_ascii_digit()) {
        format!("0{}", value)
    } else {
        value.to_string()
    }
}

pub fn is_valid_section(value: &str) -> bool {
    value.len() == 1 && matches!(value.as_bytes()[0], b'A'..=b'U' | b'a'..=b'u')
}

pub fn is_valid_division(value: &str) -> bool {
    value.len() == 2
        && value.chars().all(|c| c.is_ascii_digit())
        && value.parse::<u8>().map(|n| (1..=99).contains(&n)).unwrap_or(false)
}

pub fn is_valid_suffix(value: &str) -> bool {
    (1..=2).contains(&value.len()) && value.chars().all(|c| c.is_ascii_digit())
}

// == Index Params ==
/// Parameters shared by the industry and index lookups. `None` fields are
/// left out of the query string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexParams {
    pub section: Option<String>,
    pub division: Option<String>,
    pub group: Option<String>,
    pub subclass: Option<String>,
    pub version: Option<String>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub forecast_years: Option<u32>,
}

impl IndexParams {
    pub fn with_years(mut self, years: YearRange) -> Self {
        self.year_from = Some(years.from);
        self.year_to = Some(years.to);
        self
    }
}

// == Year Range ==
/// Inclusive year range, written `from-to` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub from: i32,
    pub to: i32,
}

impl YearRange {
    pub fn new(from: i32, to: i32) -> Result<Self, String> {
        if from > to {
            return Err(format!("Year range starts after it ends: {}-{}", from, to));
        }
        Ok(Self { from, to })
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

impl FromStr for YearRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (from, to) = s
            .split_once('-')
            .ok_or_else(|| format!("Expected years as <from>-<to>, got '{}'", s))?;
        let from = from
            .trim()
            .parse()
            .map_err(|_| format!("Invalid start year '{}'", from))?;
        let to = to
            .trim()
            .parse()
            .map_err(|_| format!("Invalid end year '{}'", to))?;
        Self::new(from, to)
    }
}

// == Ranking Level ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingLevel {
    Section,
    Division,
    Group,
}

impl RankingLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankingLevel::Section => "section",
            RankingLevel::Division => "division",
            RankingLevel::Group => "group",
        }
    }
}

impl fmt::Display for RankingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Sort Order ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Rankings Params ==
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankingsParams {
    pub level: Option<RankingLevel>,
    pub version: Option<String>,
    pub limit: Option<u32>,
    pub min_score: Option<f64>,
    pub order: Option<SortOrder>,
}

// == Classification Type ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassificationType {
    Risky,
    Growing,
    HighCreditNeeds,
    Stable,
}

impl ClassificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassificationType::Risky => "risky",
            ClassificationType::Growing => "growing",
            ClassificationType::HighCreditNeeds => "high-credit-needs",
            ClassificationType::Stable => "stable",
        }
    }
}

impl fmt::Display for ClassificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "risky" => Ok(ClassificationType::Risky),
            "growing" => Ok(ClassificationType::Growing),
            "high-credit-needs" => Ok(ClassificationType::HighCreditNeeds),
            "stable" => Ok(ClassificationType::Stable),
            other => Err(format!(
                "Unknown classification '{}', expected risky, growing, high-credit-needs or stable",
                other
            )),
        }
    }
}
