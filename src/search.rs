/// Lead search pipeline shared by the HTTP handlers and the integration tests.
///
/// 1. Validate the request (no network call on bad input)
/// 2. Resolve the niche into provider categories
/// 3. Query the provider with at most ten category filters
/// 4. Normalize and score every returned business
/// 5. Threshold, rank and cap the result list
use crate::categories::{irrelevant_categories, CategoryResolver};
use crate::errors::{AppError, ResultExt};
use crate::models::{CategorySource, Lead, SearchQueryParams, SearchRequest};
use crate::normalize::normalize_lead;
use crate::providers::{LeadProvider, MAX_CATEGORY_FILTERS};
use crate::ranking::rank;
use crate::relevance::score_business;

/// Ranked leads plus the categories used to find them.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub leads: Vec<Lead>,
    pub categories: Vec<String>,
    pub category_source: CategorySource,
}

impl SearchRequest {
    /// Builds a request from query parameters, rejecting blank city or niche
    /// and a zero limit.
    pub fn from_params(params: &SearchQueryParams, default_limit: u32) -> Result<Self, AppError> {
        let city = params.city.as_deref().map(str::trim).unwrap_or_default();
        let niche = params.niche.as_deref().map(str::trim).unwrap_or_default();

        if city.is_empty() || niche.is_empty() {
            return Err(AppError::BadRequest(
                "Missing required parameters: city and niche".to_string(),
            ));
        }

        let limit = params.limit.unwrap_or(default_limit);
        if limit == 0 {
            return Err(AppError::BadRequest(
                "limit must be a positive integer".to_string(),
            ));
        }

        Ok(Self {
            city: city.to_string(),
            niche: niche.to_string(),
            limit,
        })
    }
}

/// Runs one search against `provider`.
///
/// Category resolution never fails the search; provider failures always do.
pub async fn search_leads<P: LeadProvider>(
    provider: &P,
    resolver: &CategoryResolver,
    request: &SearchRequest,
    min_score: f64,
) -> Result<SearchOutcome, AppError> {
    let resolution = resolver.resolve(&request.niche, provider).await;
    let filters: Vec<String> = resolution
        .categories
        .iter()
        .take(MAX_CATEGORY_FILTERS)
        .cloned()
        .collect();

    tracing::info!(
        "Searching {} for '{}' in '{}' ({:?} categories: {:?})",
        provider.kind(),
        request.niche,
        request.city,
        resolution.source,
        filters
    );

    let businesses = provider
        .search(&request.niche, &request.city, request.limit, &filters)
        .await
        .with_context(|| format!("{} search for '{}'", provider.kind(), request.niche))?;

    let irrelevant = irrelevant_categories(&request.niche);
    let scored: Vec<Lead> = businesses
        .iter()
        .enumerate()
        .map(|(index, business)| {
            let mut lead = normalize_lead(business, index);
            lead.relevance_score = Some(score_business(
                business,
                &request.niche,
                &resolution.categories,
                irrelevant,
            ));
            lead
        })
        .collect();

    let received = scored.len();
    let leads = rank(scored, min_score, request.limit as usize);
    tracing::info!(
        "Kept {} of {} results above relevance {}",
        leads.len(),
        received,
        min_score
    );

    Ok(SearchOutcome {
        leads,
        categories: resolution.categories,
        category_source: resolution.source,
    })
}
