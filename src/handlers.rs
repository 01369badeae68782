use crate::categories::{irrelevant_categories, CategoryResolver};
use crate::config::Config;
use crate::errors::AppError;
use crate::export::{content_disposition, export_filename, leads_to_csv};
use crate::models::*;
use crate::providers::Provider;
use crate::ranking::sort_leads;
use crate::search::search_leads;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use moka::future::Cache;
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Adapter for the configured provider. `None` when its API key is missing.
    pub provider: Option<Provider>,
    /// Niche → category resolver, sharing one taxonomy cache across requests.
    pub category_resolver: CategoryResolver,
    /// Completed searches by job id (1 hour TTL), backing job lookup and export.
    pub recent_jobs: Cache<String, Arc<SearchResponse>>,
}

impl AppState {
    fn provider(&self) -> Result<&Provider, AppError> {
        self.provider.as_ref().ok_or_else(|| {
            AppError::Configuration(format!("{} API key not configured", self.config.provider))
        })
    }
}

/// Health check endpoint.
///
/// Returns the service status, version, and configured provider.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "rust-leadgen-api",
            "version": env!("CARGO_PKG_VERSION"),
            "provider": state.config.provider,
            "providerConfigured": state.provider.is_some(),
        })),
    )
}

/// GET /api/v1/leads/search
///
/// Searches the configured provider for businesses of a niche in a city and
/// returns them ranked by relevance.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `params` - `city`, `niche`, optional `limit`, `sort` and `order`.
///
/// # Returns
///
/// * `Result<Json<SearchResponse>, AppError>` - The completed job and its leads, or an error.
pub async fn search_leads_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQueryParams>,
) -> Result<Json<SearchResponse>, AppError> {
    tracing::info!("GET /leads/search - params: {:?}", params);

    let request = SearchRequest::from_params(&params, state.config.default_result_limit)?;
    let provider = state.provider()?;

    let mut job = SearchJob::new(&request.city, &request.niche);
    job.start();

    let outcome = search_leads(
        provider,
        &state.category_resolver,
        &request,
        state.config.min_relevance_score,
    )
    .await;
    job.complete(&outcome);
    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            let job_id = job.id.clone();
            tracing::warn!("Search job {} failed: {}", job_id, e);
            state
                .recent_jobs
                .insert(job_id.clone(), Arc::new(SearchResponse::failed(job)))
                .await;
            return Err(AppError::FailedJob {
                job_id,
                source: Box::new(e),
            });
        }
    };

    let mut results = outcome.leads;
    for lead in results.iter_mut() {
        lead.job_id = Some(job.id.clone());
    }
    sort_leads(
        &mut results,
        params.sort.unwrap_or_default(),
        params.order.unwrap_or_default(),
    );

    let response = Arc::new(SearchResponse {
        job,
        total: results.len(),
        results,
        categories: outcome.categories,
        category_source: Some(outcome.category_source),
    });
    state
        .recent_jobs
        .insert(response.job.id.clone(), Arc::clone(&response))
        .await;

    tracing::info!(
        "Search job {} completed with {} leads",
        response.job.id,
        response.total
    );
    Ok(Json(response.as_ref().clone()))
}

/// GET /api/v1/jobs/:id
///
/// Returns a recently completed search by job id.
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SearchResponse>, AppError> {
    let response = state
        .recent_jobs
        .get(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Search job {} not found", id)))?;
    Ok(Json(response.as_ref().clone()))
}

fn csv_attachment(leads: &[Lead], niche: &str, city: &str) -> Result<Response, AppError> {
    let body = leads_to_csv(leads)?;
    let filename = export_filename(niche, city, Utc::now().date_naive());
    tracing::info!("Exporting {} leads as {}", leads.len(), filename);

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                "text/csv; charset=utf-8".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&filename),
            ),
        ],
        body,
    )
        .into_response())
}

/// POST /api/v1/leads/export
///
/// Renders the posted leads as a CSV download.
pub async fn export_leads(Json(payload): Json<ExportRequest>) -> Result<Response, AppError> {
    if payload.city.trim().is_empty() || payload.niche.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Missing required fields: city and niche".to_string(),
        ));
    }
    csv_attachment(&payload.leads, &payload.niche, &payload.city)
}

/// GET /api/v1/jobs/:id/export
///
/// Renders the leads of a recent search job as a CSV download.
pub async fn export_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let response = state
        .recent_jobs
        .get(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Search job {} not found", id)))?;
    if let Some(error) = &response.job.error {
        return Err(AppError::BadRequest(format!(
            "Search job {} failed and has no leads to export: {}",
            id, error
        )));
    }
    csv_attachment(&response.results, &response.job.niche, &response.job.city)
}

/// GET /api/v1/categories/resolve
///
/// Shows how a niche maps to provider categories without running a search.
pub async fn resolve_categories(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ResolveQueryParams>,
) -> Result<Json<ResolveResponse>, AppError> {
    let niche = params
        .niche
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing required parameter: niche".to_string()))?;
    let provider = state.provider()?;

    let resolution = state.category_resolver.resolve(niche, provider).await;
    Ok(Json(ResolveResponse {
        niche: niche.to_string(),
        categories: resolution.categories,
        source: resolution.source,
        irrelevant_categories: irrelevant_categories(niche)
            .iter()
            .map(|c| c.to_string())
            .collect(),
    }))
}
