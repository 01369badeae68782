//! In-memory cache of the provider category taxonomy.
//!
//! The taxonomy is fetched lazily on first use and kept for [`TAXONOMY_TTL_HOURS`].
//! After that it turns stale but stays readable: the next lookup tries to
//! refresh it and falls back to the stale copy if the provider is down.
//! Refreshes replace the whole snapshot, so readers never see a partial list.

use crate::errors::AppError;
use crate::models::CategoryEntry;
use crate::providers::TaxonomySource;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, RwLock};

/// How long a fetched taxonomy is considered fresh.
pub const TAXONOMY_TTL_HOURS: i64 = 24;

/// Time source for cache expiry, injectable for tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
struct Snapshot {
    entries: Arc<Vec<CategoryEntry>>,
    fetched_at: DateTime<Utc>,
}

/// Process-wide taxonomy cache, shared by reference between requests.
pub struct CategoryCache {
    clock: Box<dyn Clock>,
    ttl: Duration,
    snapshot: RwLock<Option<Snapshot>>,
}

impl Default for CategoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryCache {
    /// Creates an empty cache using the system clock and the default TTL.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Creates an empty cache driven by `clock`.
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            ttl: Duration::hours(TAXONOMY_TTL_HOURS),
            snapshot: RwLock::new(None),
        }
    }

    fn current(&self) -> Option<Snapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn expired(&self, snapshot: &Snapshot) -> bool {
        self.clock.now() - snapshot.fetched_at >= self.ttl
    }

    /// True when nothing is cached yet or the cached taxonomy is older than the TTL.
    pub fn is_expired(&self) -> bool {
        match self.current() {
            Some(snapshot) => self.expired(&snapshot),
            None => true,
        }
    }

    /// Returns the cached taxonomy, fetching it from `source` when missing or stale.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::TaxonomyUnavailable`] only when the fetch fails and
    /// there is no previous taxonomy to fall back on.
    pub async fn get_taxonomy<S: TaxonomySource>(
        &self,
        source: &S,
    ) -> Result<Arc<Vec<CategoryEntry>>, AppError> {
        let previous = self.current();
        if let Some(snapshot) = &previous {
            if !self.expired(snapshot) {
                return Ok(Arc::clone(&snapshot.entries));
            }
            tracing::info!("Category taxonomy is stale, refreshing");
        }

        match source.fetch_taxonomy().await {
            Ok(entries) => {
                let entries = Arc::new(entries);
                let snapshot = Snapshot {
                    entries: Arc::clone(&entries),
                    fetched_at: self.clock.now(),
                };
                *self
                    .snapshot
                    .write()
                    .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(snapshot);
                tracing::info!("Cached {} categories", entries.len());
                Ok(entries)
            }
            Err(e) => match previous {
                Some(stale) => {
                    tracing::warn!("Taxonomy refresh failed, serving stale copy: {}", e);
                    Ok(stale.entries)
                }
                None => {
                    tracing::warn!("Taxonomy fetch failed with nothing cached: {}", e);
                    if matches!(e.root(), AppError::TaxonomyUnavailable(_)) {
                        Err(e)
                    } else {
                        Err(AppError::TaxonomyUnavailable(e.to_string()))
                    }
                }
            },
        }
    }
}
