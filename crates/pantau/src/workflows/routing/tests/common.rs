use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::workflows::routing::catalog::{CatalogCache, CatalogError, Clock, DepartmentSource};
use crate::workflows::routing::classifier::{ClassificationEngine, ClassifierConfig};
use crate::workflows::routing::domain::{DepartmentId, DepartmentProfile};
use crate::workflows::routing::repository::{
    AssignmentNotice, AssignmentNotifier, NotifyError, ReportId, ReportRecord, ReportRepository,
    ReportStatus, RepositoryError,
};
use crate::workflows::routing::service::ReportRoutingService;
use crate::config::RoutingConfig;

pub(super) const PARKS_ID: &str = "dinas-pertamanan";
pub(super) const TRANSPORT_ID: &str = "dinas-perhubungan";

pub(super) fn department(
    id: &str,
    name: &str,
    keywords: &[&str],
    priority_keywords: &[&str],
    weight: f64,
) -> DepartmentProfile {
    DepartmentProfile {
        id: DepartmentId::new(id),
        name: name.to_string(),
        email: format!("{id}@pantau.example"),
        category: "umum".to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        priority_keywords: priority_keywords.iter().map(|k| k.to_string()).collect(),
        weight,
    }
}

pub(super) fn city_catalog() -> Vec<DepartmentProfile> {
    vec![
        department(
            "dinas-bina-marga",
            "Dinas Bina Marga",
            &["jalan", "aspal", "lubang", "trotoar", "jembatan"],
            &["jalan amblas", "jembatan putus"],
            1.2,
        ),
        department(
            PARKS_ID,
            "Dinas Perumahan dan Pertamanan",
            &["taman", "ranting", "rumput", "pemangkasan"],
            &[],
            1.0,
        ),
        department(
            TRANSPORT_ID,
            "Dinas Perhubungan",
            &["lampu lalu lintas", "rambu", "parkir liar", "kemacetan", "halte"],
            &["kecelakaan"],
            1.1,
        ),
        department(
            "dinas-lingkungan-hidup",
            "Dinas Lingkungan Hidup",
            &["sampah", "limbah", "bau", "polusi"],
            &["limbah b3"],
            1.0,
        ),
        department(
            "bpbd",
            "Badan Penanggulangan Bencana Daerah",
            &["banjir", "longsor", "genangan"],
            &["banjir bandang", "tanah longsor", "kebakaran"],
            2.0,
        ),
        department(
            "dinas-sda",
            "Dinas Sumber Daya Air",
            &["saluran", "gorong-gorong", "drainase", "tanggul"],
            &[],
            1.0,
        ),
    ]
}

pub(super) fn routing_config() -> RoutingConfig {
    RoutingConfig {
        fallen_tree_parks_id: Some(PARKS_ID.to_string()),
        fallen_tree_transport_id: Some(TRANSPORT_ID.to_string()),
    }
}

pub(super) fn engine() -> ClassificationEngine {
    ClassificationEngine::new(ClassifierConfig::from_routing(&routing_config()))
}

/// Test clock that only moves when told to.
pub(super) struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub(super) fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub(super) fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("clock mutex poisoned");
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().expect("clock mutex poisoned")
    }
}

/// Source that counts fetches and can be switched into failure mode.
pub(super) struct CountingSource {
    departments: Mutex<Vec<DepartmentProfile>>,
    fetches: AtomicUsize,
    failing: AtomicBool,
}

impl CountingSource {
    pub(super) fn new(departments: Vec<DepartmentProfile>) -> Self {
        Self {
            departments: Mutex::new(departments),
            fetches: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    pub(super) fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub(super) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(super) fn replace(&self, departments: Vec<DepartmentProfile>) {
        *self.departments.lock().expect("source mutex poisoned") = departments;
    }
}

#[async_trait]
impl DepartmentSource for CountingSource {
    async fn fetch_departments(&self) -> Result<Vec<DepartmentProfile>, CatalogError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(CatalogError::Unavailable("connection refused".to_string()));
        }
        Ok(self.departments.lock().expect("source mutex poisoned").clone())
    }
}

pub(super) fn cache_with(
    source: Arc<CountingSource>,
    clock: Arc<ManualClock>,
) -> CatalogCache {
    CatalogCache::with_clock(source, clock, Duration::from_secs(300))
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<ReportId, ReportRecord>>>,
}

impl ReportRepository for MemoryRepository {
    fn insert(&self, record: ReportRecord) -> Result<ReportRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("lock");
        if guard.contains_key(&record.report_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.report_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ReportId) -> Result<Option<ReportRecord>, RepositoryError> {
        Ok(self.records.lock().expect("lock").get(id).cloned())
    }

    fn by_status(&self, status: ReportStatus) -> Result<Vec<ReportRecord>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("lock")
            .values()
            .filter(|record| record.status == status)
            .cloned()
            .collect())
    }
}

pub(super) struct UnavailableRepository;

impl ReportRepository for UnavailableRepository {
    fn insert(&self, _record: ReportRecord) -> Result<ReportRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ReportId) -> Result<Option<ReportRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn by_status(&self, _status: ReportStatus) -> Result<Vec<ReportRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    notices: Arc<Mutex<Vec<AssignmentNotice>>>,
}

impl MemoryNotifier {
    pub(super) fn notices(&self) -> Vec<AssignmentNotice> {
        self.notices.lock().expect("lock").clone()
    }
}

impl AssignmentNotifier for MemoryNotifier {
    fn notify(&self, notice: AssignmentNotice) -> Result<(), NotifyError> {
        self.notices.lock().expect("lock").push(notice);
        Ok(())
    }
}

pub(super) fn build_service() -> (
    ReportRoutingService<MemoryRepository, MemoryNotifier>,
    Arc<MemoryRepository>,
    Arc<MemoryNotifier>,
) {
    let source = Arc::new(CountingSource::new(city_catalog()));
    let cache = Arc::new(cache_with(source, Arc::new(ManualClock::new())));
    let repository = Arc::new(MemoryRepository::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service =
        ReportRoutingService::new(cache, engine(), repository.clone(), notifier.clone());
    (service, repository, notifier)
}
