//! Domain types and DTOs
//!
//! PKD selections and lookup parameters, the query strings accepted by the
//! gateway, and the response bodies it produces.

pub mod pkd;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use pkd::{
    ClassificationType, IndexParams, PkdSelection, RankingLevel, RankingsParams, SortOrder,
    YearRange, DEFAULT_VERSION,
};
pub use responses::{
    DivisionsResponse, GroupsResponse, HealthResponse, SectionsResponse, StatsResponse,
};
