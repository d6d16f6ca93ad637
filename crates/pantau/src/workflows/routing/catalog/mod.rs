//! Department catalog snapshots with a fixed freshness window.
//!
//! The cache never holds a lock while the source is queried. Two callers that
//! both observe an expired snapshot will both refresh and the later write wins;
//! department rows are read-only so the duplicate fetch is harmless.

mod source;

pub use source::{parse_catalog, CsvDepartmentSource, StaticDepartmentSource};

use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::domain::DepartmentProfile;

/// Read-all access to the external department table.
#[async_trait]
pub trait DepartmentSource: Send + Sync {
    async fn fetch_departments(&self) -> Result<Vec<DepartmentProfile>, CatalogError>;
}

/// Monotonic time used to age catalog snapshots.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Failure reaching or decoding the department store.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("department store unavailable: {0}")]
    Unavailable(String),
    #[error("failed to read department catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid department catalog data: {0}")]
    Csv(#[from] csv::Error),
}

struct Snapshot {
    departments: Arc<[DepartmentProfile]>,
    fetched_at: Instant,
}

pub struct CatalogCache {
    source: Arc<dyn DepartmentSource>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    snapshot: RwLock<Option<Snapshot>>,
}

impl CatalogCache {
    pub fn new(source: Arc<dyn DepartmentSource>, ttl: Duration) -> Self {
        Self::with_clock(source, Arc::new(SystemClock), ttl)
    }

    pub fn with_clock(
        source: Arc<dyn DepartmentSource>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        Self {
            source,
            clock,
            ttl,
            snapshot: RwLock::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Current catalog, or an empty one when the store cannot be reached.
    pub async fn departments(&self) -> Arc<[DepartmentProfile]> {
        match self.try_departments().await {
            Ok(departments) => departments,
            Err(err) => {
                warn!(error = %err, "department catalog unavailable, routing with empty catalog");
                Arc::from(Vec::new())
            }
        }
    }

    /// Current catalog, refreshing from the source once the snapshot has aged past the TTL.
    pub async fn try_departments(&self) -> Result<Arc<[DepartmentProfile]>, CatalogError> {
        if let Some(departments) = self.fresh_snapshot() {
            return Ok(departments);
        }

        let rows = self.source.fetch_departments().await?;
        let departments: Arc<[DepartmentProfile]> = Arc::from(rows);
        let fetched_at = self.clock.now();

        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Some(Snapshot {
            departments: departments.clone(),
            fetched_at,
        });

        info!(departments = departments.len(), "department catalog refreshed");
        Ok(departments)
    }

    fn fresh_snapshot(&self) -> Option<Arc<[DepartmentProfile]>> {
        let guard = self.snapshot.read().unwrap_or_else(PoisonError::into_inner);
        let snapshot = guard.as_ref()?;
        let age = self.clock.now().saturating_duration_since(snapshot.fetched_at);
        if age < self.ttl {
            Some(snapshot.departments.clone())
        } else {
            debug!(age_secs = age.as_secs(), "department catalog snapshot expired");
            None
        }
    }
}

impl std::fmt::Debug for CatalogCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
