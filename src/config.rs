use crate::providers::ProviderKind;
use serde::Deserialize;

pub const DEFAULT_YELP_BASE_URL: &str = "https://api.yelp.com/v3";
pub const DEFAULT_FOURSQUARE_BASE_URL: &str = "https://api.foursquare.com/v3";
pub const DEFAULT_SERPAPI_BASE_URL: &str = "https://serpapi.com";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub provider: ProviderKind,
    pub yelp_api_key: Option<String>,
    pub yelp_base_url: String,
    pub foursquare_api_key: Option<String>,
    pub foursquare_base_url: String,
    pub serp_api_key: Option<String>,
    pub serpapi_base_url: String,
    pub min_relevance_score: f64,
    pub default_result_limit: u32,
    pub provider_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            provider: std::env::var("LEAD_PROVIDER")
                .unwrap_or_else(|_| "yelp".to_string())
                .parse()
                .map_err(|e| anyhow::anyhow!("LEAD_PROVIDER: {}", e))?,
            yelp_api_key: optional_secret("YELP_API_KEY"),
            yelp_base_url: base_url("YELP_BASE_URL", DEFAULT_YELP_BASE_URL)?,
            foursquare_api_key: optional_secret("FOURSQUARE_API_KEY"),
            foursquare_base_url: base_url("FOURSQUARE_BASE_URL", DEFAULT_FOURSQUARE_BASE_URL)?,
            serp_api_key: optional_secret("SERP_API_KEY"),
            serpapi_base_url: base_url("SERPAPI_BASE_URL", DEFAULT_SERPAPI_BASE_URL)?,
            min_relevance_score: std::env::var("MIN_RELEVANCE_SCORE")
                .unwrap_or_else(|_| "0.4".to_string())
                .parse::<f64>()
                .map_err(|_| anyhow::anyhow!("MIN_RELEVANCE_SCORE must be a number"))
                .and_then(|score| {
                    if !(0.0..=1.0).contains(&score) {
                        anyhow::bail!("MIN_RELEVANCE_SCORE must be between 0 and 1");
                    }
                    Ok(score)
                })?,
            default_result_limit: std::env::var("DEFAULT_RESULT_LIMIT")
                .unwrap_or_else(|_| "20".to_string())
                .parse::<u32>()
                .map_err(|_| anyhow::anyhow!("DEFAULT_RESULT_LIMIT must be a positive number"))
                .and_then(|limit| {
                    if limit == 0 {
                        anyhow::bail!("DEFAULT_RESULT_LIMIT cannot be zero");
                    }
                    Ok(limit)
                })?,
            provider_timeout_secs: std::env::var("PROVIDER_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PROVIDER_TIMEOUT_SECS must be a valid number"))?,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::info!("Lead provider: {}", config.provider);
        if config.api_key_for(config.provider).is_none() {
            tracing::warn!(
                "{} API key not configured; searches will fail until it is set",
                config.provider
            );
        }
        tracing::debug!("Yelp Base URL: {}", config.yelp_base_url);
        tracing::debug!("Foursquare Base URL: {}", config.foursquare_base_url);
        tracing::debug!("SerpApi Base URL: {}", config.serpapi_base_url);
        tracing::debug!("Minimum relevance score: {}", config.min_relevance_score);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Returns the API key configured for `kind`, if any.
    pub fn api_key_for(&self, kind: ProviderKind) -> Option<&str> {
        match kind {
            ProviderKind::Yelp => self.yelp_api_key.as_deref(),
            ProviderKind::Foursquare => self.foursquare_api_key.as_deref(),
            ProviderKind::SerpApi => self.serp_api_key.as_deref(),
        }
    }
}

fn optional_secret(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn base_url(name: &str, default: &str) -> anyhow::Result<String> {
    let url = std::env::var(name).unwrap_or_else(|_| default.to_string());
    if url.trim().is_empty() {
        anyhow::bail!("{} cannot be empty", name);
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("{} must start with http:// or https://", name);
    }
    Ok(url.trim_end_matches('/').to_string())
}
