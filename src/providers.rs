//! Capability interface shared by every local-business search provider.
//!
//! Each provider adapter in [`crate::services`] implements [`LeadProvider`]
//! so the category resolver, scorer and ranker stay provider-agnostic.

use crate::config::Config;
use crate::errors::AppError;
use crate::models::{CategoryEntry, RawBusiness};
use crate::services::{FoursquareService, SerpApiService, YelpService};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::str::FromStr;

/// Maximum number of category filters forwarded to a provider search.
pub const MAX_CATEGORY_FILTERS: usize = 10;

/// Supported upstream providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Yelp,
    Foursquare,
    #[serde(rename = "serpapi")]
    SerpApi,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderKind::Yelp => "Yelp",
            ProviderKind::Foursquare => "Foursquare",
            ProviderKind::SerpApi => "SerpApi",
        };
        f.write_str(name)
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yelp" => Ok(ProviderKind::Yelp),
            "foursquare" => Ok(ProviderKind::Foursquare),
            "serpapi" | "serp" | "google_maps" => Ok(ProviderKind::SerpApi),
            other => Err(format!(
                "unknown provider '{}', expected yelp, foursquare or serpapi",
                other
            )),
        }
    }
}

/// Source of the full provider category taxonomy.
pub trait TaxonomySource: Send + Sync {
    /// Fetch every category the provider knows about.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::TaxonomyUnavailable`] when the provider has no
    /// taxonomy endpoint, or a transport/provider error when the fetch fails.
    fn fetch_taxonomy(
        &self,
    ) -> impl Future<Output = Result<Vec<CategoryEntry>, AppError>> + Send;
}

/// A local-business search backend.
pub trait LeadProvider: TaxonomySource {
    /// Search for businesses matching `term` near `location`.
    ///
    /// `categories` is an optional provider category filter; adapters whose
    /// provider cannot filter by these identifiers ignore it.
    fn search(
        &self,
        term: &str,
        location: &str,
        limit: u32,
        categories: &[String],
    ) -> impl Future<Output = Result<Vec<RawBusiness>, AppError>> + Send;

    /// Which provider this adapter talks to.
    fn kind(&self) -> ProviderKind;
}

/// The provider adapter selected by configuration.
#[derive(Clone)]
pub enum Provider {
    Yelp(YelpService),
    Foursquare(FoursquareService),
    SerpApi(SerpApiService),
}

impl Provider {
    /// Builds the adapter for `config.provider`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Configuration`] when the provider's API key is missing.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let provider = match config.provider {
            ProviderKind::Yelp => Provider::Yelp(YelpService::from_config(config)?),
            ProviderKind::Foursquare => {
                Provider::Foursquare(FoursquareService::from_config(config)?)
            }
            ProviderKind::SerpApi => Provider::SerpApi(SerpApiService::from_config(config)?),
        };
        Ok(provider)
    }
}

impl TaxonomySource for Provider {
    async fn fetch_taxonomy(&self) -> Result<Vec<CategoryEntry>, AppError> {
        match self {
            Provider::Yelp(s) => s.fetch_taxonomy().await,
            Provider::Foursquare(s) => s.fetch_taxonomy().await,
            Provider::SerpApi(s) => s.fetch_taxonomy().await,
        }
    }
}

impl LeadProvider for Provider {
    async fn search(
        &self,
        term: &str,
        location: &str,
        limit: u32,
        categories: &[String],
    ) -> Result<Vec<RawBusiness>, AppError> {
        match self {
            Provider::Yelp(s) => s.search(term, location, limit, categories).await,
            Provider::Foursquare(s) => s.search(term, location, limit, categories).await,
            Provider::SerpApi(s) => s.search(term, location, limit, categories).await,
        }
    }

    fn kind(&self) -> ProviderKind {
        match self {
            Provider::Yelp(_) => ProviderKind::Yelp,
            Provider::Foursquare(_) => ProviderKind::Foursquare,
            Provider::SerpApi(_) => ProviderKind::SerpApi,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_parsing() {
        assert_eq!("Yelp".parse::<ProviderKind>().unwrap(), ProviderKind::Yelp);
        assert_eq!(
            " foursquare ".parse::<ProviderKind>().unwrap(),
            ProviderKind::Foursquare
        );
        assert_eq!(
            "serpapi".parse::<ProviderKind>().unwrap(),
            ProviderKind::SerpApi
        );
        assert!("bing".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_provider_kind_display() {
        assert_eq!(ProviderKind::SerpApi.to_string(), "SerpApi");
        assert_eq!(ProviderKind::Yelp.to_string(), "Yelp");
    }
}
