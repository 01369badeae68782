use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application-specific error types.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Missing or invalid search parameters. Raised before any network call.
    BadRequest(String),
    /// Resource not found error.
    NotFound(String),
    /// The selected provider is missing credentials or is misconfigured.
    Configuration(String),
    /// Transport-level failure reaching the provider.
    ProviderUnavailable(String),
    /// The provider answered with a non-success status or an error payload.
    ProviderError {
        /// HTTP status reported by the provider.
        status: u16,
        /// Provider message, passed through unchanged.
        message: String,
    },
    /// The provider category taxonomy could not be fetched and nothing is cached.
    TaxonomyUnavailable(String),
    /// Internal server error.
    InternalError(String),
    /// A search job failed. The job stays retrievable under `job_id`.
    FailedJob {
        /// Id of the recorded job.
        job_id: String,
        /// Why the search failed.
        source: Box<AppError>,
    },
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl AppError {
    /// Returns the innermost error, skipping any context wrappers.
    pub fn root(&self) -> &AppError {
        match self {
            AppError::WithContext { source, .. } | AppError::FailedJob { source, .. } => {
                source.root()
            }
            other => other,
        }
    }
}

impl fmt::Display for AppError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            AppError::ProviderUnavailable(msg) => write!(f, "Provider unavailable: {}", msg),
            AppError::ProviderError { status, message } => {
                write!(f, "Provider error ({}): {}", status, message)
            }
            AppError::TaxonomyUnavailable(msg) => write!(f, "Taxonomy unavailable: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            AppError::FailedJob { job_id, source } => {
                write!(f, "Search job {} failed: {}", job_id, source)
            }
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Maps each error variant to an HTTP status code and JSON body.
    ///
    /// Provider errors keep the provider's status code so callers can tell
    /// credential problems (401/403) from transient upstream failures.
    fn status_and_body(&self) -> (StatusCode, serde_json::Value) {
        match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg }))
            }
            AppError::ProviderUnavailable(msg) => {
                tracing::error!("Provider unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({ "error": "Lead provider unavailable" }),
                )
            }
            AppError::ProviderError { status, message } => {
                tracing::error!("Provider returned {}: {}", status, message);
                let code = StatusCode::from_u16(*status)
                    .ok()
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY);
                (code, json!({ "error": message, "status": status }))
            }
            AppError::TaxonomyUnavailable(msg) => {
                tracing::warn!("Taxonomy unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({ "error": "Category taxonomy unavailable" }),
                )
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
            AppError::FailedJob { job_id, source } => {
                let (status, mut body) = source.status_and_body();
                body["jobId"] = json!(job_id);
                (status, body)
            }
            AppError::WithContext { source, context } => {
                // Log full context chain for debugging
                tracing::error!("Error with context: {} -> {}", context, source);
                source.status_and_body()
            }
        }
    }
}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: f(),
        })
    }
}
