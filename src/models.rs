use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============ Provider Models ============

/// One entry of a provider's category taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    /// Provider category identifier (Yelp calls this the alias).
    pub id: String,
    /// Human readable title.
    pub title: String,
}

/// A category attached to a business in a provider response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCategory {
    /// Provider category identifier, when the provider exposes one.
    pub id: Option<String>,
    /// Display title.
    pub title: Option<String>,
}

/// Address parts as returned by a provider. Any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAddress {
    /// Single-line formatted address.
    pub formatted: Option<String>,
    /// Multi-line display address.
    pub display_lines: Vec<String>,
    pub street: Option<String>,
    pub locality: Option<String>,
    pub region: Option<String>,
}

/// Provider-agnostic business record produced by every provider adapter.
///
/// Adapters fill in whatever the upstream payload carries and leave the rest
/// unset; the lead normalizer takes care of defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBusiness {
    pub id: Option<String>,
    pub name: Option<String>,
    pub categories: Vec<RawCategory>,
    pub rating: Option<f64>,
    pub review_count: Option<u64>,
    pub address: RawAddress,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
}

// ============ API Models ============

/// Normalized business record returned to callers and exported to CSV.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    /// Identifier, unique within one result set.
    pub id: String,
    /// Search job this lead belongs to. Attached once the search completes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u64>,
    /// Primary category label.
    #[serde(default)]
    pub category: String,
    /// All category labels in provider order.
    #[serde(default)]
    pub all_categories: Vec<String>,
    #[serde(default)]
    pub image_url: String,
    /// Relevance score in [0, 1], present once the lead has been scored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
}

/// Where a category resolution came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategorySource {
    /// Hit in the built-in niche table.
    Static,
    /// Fuzzy match against the provider taxonomy.
    Dynamic,
}

/// Validated search input.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub city: String,
    pub niche: String,
    pub limit: u32,
}

/// Query string accepted by the search endpoint.
///
/// The aliases keep the parameter names older clients used for each provider
/// (`term`/`location` for Yelp and SerpApi, `query`/`near` for Foursquare).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQueryParams {
    #[serde(alias = "location", alias = "near")]
    pub city: Option<String>,
    #[serde(alias = "term", alias = "query")]
    pub niche: Option<String>,
    pub limit: Option<u32>,
    pub sort: Option<SortField>,
    pub order: Option<SortOrder>,
}

/// Fields the result list can be re-sorted by after ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Relevance,
    Name,
    Rating,
    Reviews,
    Category,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Lifecycle of a single search as seen by API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
}

/// In-memory handle for one search request.
///
/// A job is driven by the outcome of exactly one search future; it is not a
/// queued or persisted entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchJob {
    pub id: String,
    pub city: String,
    pub niche: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchJob {
    pub fn new(city: &str, niche: &str) -> Self {
        Self {
            id: format!("job-{}", Uuid::new_v4()),
            city: city.to_string(),
            niche: niche.to_string(),
            status: JobStatus::Pending,
            created_at: Utc::now(),
            error: None,
        }
    }

    pub fn start(&mut self) {
        self.status = JobStatus::Running;
    }

    /// Marks the job completed, recording the failure message if the search failed.
    pub fn complete<T, E: std::fmt::Display>(&mut self, outcome: &Result<T, E>) {
        self.status = JobStatus::Completed;
        self.error = outcome.as_ref().err().map(|e| e.to_string());
    }
}

/// Response body of the search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub job: SearchJob,
    pub results: Vec<Lead>,
    pub total: usize,
    pub categories: Vec<String>,
    /// Absent when the search failed before categories were reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_source: Option<CategorySource>,
}

impl SearchResponse {
    /// Record of a completed job whose search failed. Carries no results.
    pub fn failed(job: SearchJob) -> Self {
        Self {
            job,
            results: Vec::new(),
            total: 0,
            categories: Vec::new(),
            category_source: None,
        }
    }
}

/// Body accepted by the CSV export endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportRequest {
    pub city: String,
    pub niche: String,
    #[serde(default)]
    pub leads: Vec<Lead>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolveQueryParams {
    #[serde(alias = "term")]
    pub niche: Option<String>,
}

/// Response body of the category resolution endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveResponse {
    pub niche: String,
    pub categories: Vec<String>,
    pub source: CategorySource,
    pub irrelevant_categories: Vec<String>,
}
