use crate::config::Config;
use crate::errors::AppError;
use crate::models::{CategoryEntry, RawAddress, RawBusiness, RawCategory};
use crate::providers::{LeadProvider, ProviderKind, TaxonomySource, MAX_CATEGORY_FILTERS};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Yelp and Foursquare both cap a single search page at 50 results.
const MAX_PAGE_SIZE: u32 = 50;

fn build_client(kind: ProviderKind, timeout_secs: u64) -> Result<Client, AppError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AppError::InternalError(format!("Failed to create {} client: {}", kind, e)))
}

fn require_key(config: &Config, kind: ProviderKind) -> Result<String, AppError> {
    config
        .api_key_for(kind)
        .map(str::to_string)
        .ok_or_else(|| AppError::Configuration(format!("{} API key not configured", kind)))
}

/// Sends a prepared request and returns the JSON body, mapping transport and
/// status failures onto the provider error taxonomy.
async fn fetch_json(kind: ProviderKind, request: reqwest::RequestBuilder) -> Result<Value, AppError> {
    let response = request
        .send()
        .await
        .map_err(|e| AppError::ProviderUnavailable(format!("{} request failed: {}", kind, e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        tracing::error!("{} API returned error {}: {}", kind, status, error_text);
        return Err(AppError::ProviderError {
            status: status.as_u16(),
            message: format!("{} API error: {}", kind, error_text),
        });
    }

    response.json::<Value>().await.map_err(|e| AppError::ProviderError {
        status: reqwest::StatusCode::BAD_GATEWAY.as_u16(),
        message: format!("Failed to parse {} response: {}", kind, e),
    })
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn f64_field(value: &Value, key: &str) -> Option<f64> {
    value.get(key).and_then(Value::as_f64)
}

fn u64_field(value: &Value, key: &str) -> Option<u64> {
    value.get(key).and_then(Value::as_u64)
}

fn array_field<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

// ============ Yelp Fusion ============

/// Adapter for the Yelp Fusion API. The only provider with a category taxonomy.
#[derive(Clone)]
pub struct YelpService {
    client: Client,
    base_url: String,
    api_key: String,
}

impl YelpService {
    /// Creates a new `YelpService`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The Yelp API base URL, e.g. `https://api.yelp.com/v3`.
    /// * `api_key` - The bearer token.
    /// * `timeout_secs` - Per-request timeout.
    pub fn new(base_url: String, api_key: String, timeout_secs: u64) -> Result<Self, AppError> {
        Ok(Self {
            client: build_client(ProviderKind::Yelp, timeout_secs)?,
            base_url,
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let api_key = require_key(config, ProviderKind::Yelp)?;
        Self::new(
            config.yelp_base_url.clone(),
            api_key,
            config.provider_timeout_secs,
        )
    }

    fn get(&self, url: reqwest::Url) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
    }
}

/// Maps one entry of Yelp's `businesses` array.
pub fn yelp_business(value: &Value) -> RawBusiness {
    let location = value.get("location").unwrap_or(&Value::Null);
    RawBusiness {
        id: str_field(value, "id"),
        name: str_field(value, "name"),
        categories: array_field(value, "categories")
            .iter()
            .map(|c| RawCategory {
                id: str_field(c, "alias"),
                title: str_field(c, "title"),
            })
            .collect(),
        rating: f64_field(value, "rating"),
        review_count: u64_field(value, "review_count"),
        address: RawAddress {
            formatted: None,
            display_lines: array_field(location, "display_address")
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            street: str_field(location, "address1"),
            locality: str_field(location, "city"),
            region: str_field(location, "state"),
        },
        phone: str_field(value, "display_phone").or_else(|| str_field(value, "phone")),
        website: str_field(value, "url"),
        email: None,
        image_url: str_field(value, "image_url"),
    }
}

impl TaxonomySource for YelpService {
    async fn fetch_taxonomy(&self) -> Result<Vec<CategoryEntry>, AppError> {
        let url = reqwest::Url::parse(&format!("{}/categories", self.base_url))
            .map_err(|e| AppError::InternalError(format!("Failed to build URL: {}", e)))?;

        tracing::info!("Fetching Yelp category taxonomy");
        let data = fetch_json(ProviderKind::Yelp, self.get(url)).await?;

        let entries: Vec<CategoryEntry> = array_field(&data, "categories")
            .iter()
            .filter_map(|c| {
                let id = str_field(c, "alias")?;
                let title = str_field(c, "title").unwrap_or_else(|| id.clone());
                Some(CategoryEntry { id, title })
            })
            .collect();

        tracing::info!("Fetched {} Yelp categories", entries.len());
        Ok(entries)
    }
}

impl LeadProvider for YelpService {
    async fn search(
        &self,
        term: &str,
        location: &str,
        limit: u32,
        categories: &[String],
    ) -> Result<Vec<RawBusiness>, AppError> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE).to_string();
        let mut params = vec![
            ("term", term.to_string()),
            ("location", location.to_string()),
            ("limit", limit),
            ("sort_by", "best_match".to_string()),
        ];
        if !categories.is_empty() {
            let filter: Vec<&str> = categories
                .iter()
                .take(MAX_CATEGORY_FILTERS)
                .map(String::as_str)
                .collect();
            params.push(("categories", filter.join(",")));
        }

        // Query values are percent-encoded by the URL builder
        let url = reqwest::Url::parse_with_params(
            &format!("{}/businesses/search", self.base_url),
            &params,
        )
        .map_err(|e| AppError::InternalError(format!("Failed to build URL: {}", e)))?;

        tracing::info!("Searching Yelp for '{}' in '{}'", term, location);
        tracing::debug!("Yelp URL: {}", url);

        let data = fetch_json(ProviderKind::Yelp, self.get(url)).await?;
        let businesses: Vec<RawBusiness> = array_field(&data, "businesses")
            .iter()
            .map(yelp_business)
            .collect();

        tracing::info!(
            "Yelp returned {} businesses (total {})",
            businesses.len(),
            u64_field(&data, "total").unwrap_or(businesses.len() as u64)
        );
        Ok(businesses)
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Yelp
    }
}

// ============ Foursquare Places ============

/// Adapter for the Foursquare Places API.
#[derive(Clone)]
pub struct FoursquareService {
    client: Client,
    base_url: String,
    api_key: String,
}

impl FoursquareService {
    pub fn new(base_url: String, api_key: String, timeout_secs: u64) -> Result<Self, AppError> {
        Ok(Self {
            client: build_client(ProviderKind::Foursquare, timeout_secs)?,
            base_url,
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let api_key = require_key(config, ProviderKind::Foursquare)?;
        Self::new(
            config.foursquare_base_url.clone(),
            api_key,
            config.provider_timeout_secs,
        )
    }
}

/// Maps one entry of Foursquare's `results` array.
///
/// Foursquare categories carry numeric ids unrelated to the Yelp aliases used
/// by the niche tables, so only titles are kept.
pub fn foursquare_place(value: &Value) -> RawBusiness {
    let location = value.get("location").unwrap_or(&Value::Null);
    RawBusiness {
        id: str_field(value, "fsq_id"),
        name: str_field(value, "name"),
        categories: array_field(value, "categories")
            .iter()
            .map(|c| RawCategory {
                id: None,
                title: str_field(c, "name"),
            })
            .collect(),
        rating: f64_field(value, "rating"),
        review_count: None,
        address: RawAddress {
            formatted: str_field(location, "formatted_address"),
            display_lines: Vec::new(),
            street: str_field(location, "address"),
            locality: str_field(location, "locality"),
            region: str_field(location, "region"),
        },
        phone: str_field(value, "tel"),
        website: str_field(value, "website"),
        email: str_field(value, "email"),
        image_url: None,
    }
}

impl TaxonomySource for FoursquareService {
    async fn fetch_taxonomy(&self) -> Result<Vec<CategoryEntry>, AppError> {
        Err(AppError::TaxonomyUnavailable(
            "Foursquare does not expose a compatible category taxonomy".to_string(),
        ))
    }
}

impl LeadProvider for FoursquareService {
    async fn search(
        &self,
        term: &str,
        location: &str,
        limit: u32,
        _categories: &[String],
    ) -> Result<Vec<RawBusiness>, AppError> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE).to_string();
        let url = reqwest::Url::parse_with_params(
            &format!("{}/places/search", self.base_url),
            &[
                ("query", term),
                ("near", location),
                ("limit", limit.as_str()),
                (
                    "fields",
                    "fsq_id,name,location,tel,website,email,categories,rating",
                ),
            ],
        )
        .map_err(|e| AppError::InternalError(format!("Failed to build URL: {}", e)))?;

        tracing::info!("Searching Foursquare for '{}' near '{}'", term, location);

        let request = self
            .client
            .get(url)
            .header("Authorization", self.api_key.as_str())
            .header("Accept", "application/json");
        let data = fetch_json(ProviderKind::Foursquare, request).await?;

        let places: Vec<RawBusiness> = array_field(&data, "results")
            .iter()
            .map(foursquare_place)
            .collect();
        tracing::info!("Foursquare returned {} places", places.len());
        Ok(places)
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Foursquare
    }
}

// ============ SerpApi (Google Maps) ============

/// Adapter for SerpApi's Google Maps engine.
#[derive(Clone)]
pub struct SerpApiService {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SerpApiService {
    pub fn new(base_url: String, api_key: String, timeout_secs: u64) -> Result<Self, AppError> {
        Ok(Self {
            client: build_client(ProviderKind::SerpApi, timeout_secs)?,
            base_url,
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let api_key = require_key(config, ProviderKind::SerpApi)?;
        Self::new(
            config.serpapi_base_url.clone(),
            api_key,
            config.provider_timeout_secs,
        )
    }
}

/// Maps one entry of SerpApi's `local_results` array.
pub fn serpapi_result(value: &Value) -> RawBusiness {
    RawBusiness {
        id: str_field(value, "place_id"),
        name: str_field(value, "title"),
        categories: str_field(value, "type")
            .map(|title| {
                vec![RawCategory {
                    id: None,
                    title: Some(title),
                }]
            })
            .unwrap_or_default(),
        rating: f64_field(value, "rating"),
        review_count: u64_field(value, "reviews"),
        address: RawAddress {
            formatted: str_field(value, "address"),
            ..RawAddress::default()
        },
        phone: str_field(value, "phone"),
        website: str_field(value, "website"),
        email: None,
        image_url: str_field(value, "thumbnail"),
    }
}

impl TaxonomySource for SerpApiService {
    async fn fetch_taxonomy(&self) -> Result<Vec<CategoryEntry>, AppError> {
        Err(AppError::TaxonomyUnavailable(
            "SerpApi does not expose a category taxonomy".to_string(),
        ))
    }
}

impl LeadProvider for SerpApiService {
    async fn search(
        &self,
        term: &str,
        location: &str,
        limit: u32,
        _categories: &[String],
    ) -> Result<Vec<RawBusiness>, AppError> {
        let query = format!("{} in {}", term, location);
        let url = reqwest::Url::parse_with_params(
            &format!("{}/search.json", self.base_url),
            &[
                ("engine", "google_maps"),
                ("q", query.as_str()),
                ("type", "search"),
                ("api_key", self.api_key.as_str()),
            ],
        )
        .map_err(|e| AppError::InternalError(format!("Failed to build URL: {}", e)))?;

        tracing::info!("Searching SerpApi for: {}", query);

        let data = fetch_json(ProviderKind::SerpApi, self.client.get(url)).await?;

        // SerpApi reports some failures inside a 200 body
        if let Some(message) = str_field(&data, "error") {
            tracing::error!("SerpApi returned error: {}", message);
            return Err(AppError::ProviderError {
                status: reqwest::StatusCode::BAD_REQUEST.as_u16(),
                message,
            });
        }

        let results: Vec<RawBusiness> = array_field(&data, "local_results")
            .iter()
            .take(limit as usize)
            .map(serpapi_result)
            .collect();
        tracing::info!("SerpApi returned {} local results", results.len());
        Ok(results)
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::SerpApi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_yelp_business_full_record() {
        let raw = yelp_business(&json!({
            "id": "abc",
            "name": "Austin Family Dentist",
            "url": "https://yelp.com/biz/abc",
            "phone": "+15125550100",
            "display_phone": "(512) 555-0100",
            "rating": 4.5,
            "review_count": 20,
            "categories": [{"alias": "dentists", "title": "General Dentistry"}],
            "location": {"display_address": ["1 Main St", "Austin, TX 78701"]},
            "image_url": "https://img/abc.jpg"
        }));

        assert_eq!(raw.id.as_deref(), Some("abc"));
        assert_eq!(raw.phone.as_deref(), Some("(512) 555-0100"));
        assert_eq!(raw.categories[0].id.as_deref(), Some("dentists"));
        assert_eq!(raw.review_count, Some(20));
        assert_eq!(raw.address.display_lines.len(), 2);
    }

    #[test]
    fn test_yelp_business_tolerates_garbage() {
        let raw = yelp_business(&json!({
            "name": 42,
            "categories": "not-a-list",
            "location": null,
            "rating": "five"
        }));
        assert_eq!(raw, RawBusiness::default());
    }

    #[test]
    fn test_foursquare_place_mapping() {
        let raw = foursquare_place(&json!({
            "fsq_id": "4b0",
            "name": "Lift Gym",
            "tel": "555-1234",
            "email": "hi@lift.example",
            "categories": [{"id": 18021, "name": "Gym"}],
            "location": {"address": "12 Oak Ave", "locality": "Denver", "region": "CO"}
        }));

        assert_eq!(raw.categories[0].id, None);
        assert_eq!(raw.categories[0].title.as_deref(), Some("Gym"));
        assert_eq!(raw.email.as_deref(), Some("hi@lift.example"));
        assert_eq!(raw.address.street.as_deref(), Some("12 Oak Ave"));
    }

    #[test]
    fn test_serpapi_result_mapping() {
        let raw = serpapi_result(&json!({
            "place_id": "ChIJ",
            "title": "Joe's Plumbing",
            "type": "Plumber",
            "reviews": 87,
            "address": "5 Pipe Rd, Austin, TX"
        }));

        assert_eq!(raw.categories.len(), 1);
        assert_eq!(raw.review_count, Some(87));
        assert_eq!(raw.address.formatted.as_deref(), Some("5 Pipe Rd, Austin, TX"));
    }

    #[test]
    fn test_missing_key_is_configuration_error() {
        let config = Config {
            port: 3000,
            provider: ProviderKind::Yelp,
            yelp_api_key: None,
            yelp_base_url: "https://api.yelp.com/v3".to_string(),
            foursquare_api_key: None,
            foursquare_base_url: "https://api.foursquare.com/v3".to_string(),
            serp_api_key: None,
            serpapi_base_url: "https://serpapi.com".to_string(),
            min_relevance_score: 0.4,
            default_result_limit: 20,
            provider_timeout_secs: 30,
        };

        match YelpService::from_config(&config) {
            Err(AppError::Configuration(msg)) => assert_eq!(msg, "Yelp API key not configured"),
            _ => panic!("expected configuration error"),
        }
    }
}
