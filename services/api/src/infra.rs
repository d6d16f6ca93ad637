use metrics_exporter_prometheus::PrometheusHandle;
use pantau::config::{CatalogConfig, RoutingConfig};
use pantau::workflows::routing::catalog::parse_catalog;
use pantau::workflows::routing::{
    AssignmentNotice, AssignmentNotifier, CatalogCache, CatalogError, ClassificationEngine,
    ClassifierConfig, CsvDepartmentSource, DepartmentSource, NotifyError, ReportId,
    ReportRecord, ReportRepository, ReportRoutingService, ReportStatus, RepositoryError,
    StaticDepartmentSource,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Department export bundled with the binary, used when no catalog path is configured.
const DEMO_CATALOG_CSV: &str = include_str!("../../../data/departments.csv");
const DEMO_PARKS_ID: &str = "dinas-pertamanan";
const DEMO_TRANSPORT_ID: &str = "dinas-perhubungan";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryReportRepository {
    records: Arc<Mutex<HashMap<ReportId, ReportRecord>>>,
}

impl ReportRepository for InMemoryReportRepository {
    fn insert(&self, record: ReportRecord) -> Result<ReportRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.report_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.report_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ReportId) -> Result<Option<ReportRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn by_status(&self, status: ReportStatus) -> Result<Vec<ReportRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<_> = guard
            .values()
            .filter(|record| record.status == status)
            .cloned()
            .collect();
        records.sort_by(|left, right| left.report_id.cmp(&right.report_id));
        Ok(records)
    }
}

/// Records notices and logs them; stands in for the e-mail adapter.
#[derive(Default, Clone)]
pub(crate) struct LoggingNotifier {
    notices: Arc<Mutex<Vec<AssignmentNotice>>>,
}

impl AssignmentNotifier for LoggingNotifier {
    fn notify(&self, notice: AssignmentNotice) -> Result<(), NotifyError> {
        info!(
            template = %notice.template,
            report_id = %notice.report_id,
            department = notice.department_id.as_ref().map(|id| id.as_str()).unwrap_or("review-desk"),
            "assignment notice queued"
        );
        let mut guard = self.notices.lock().expect("notifier mutex poisoned");
        guard.push(notice);
        Ok(())
    }
}

impl LoggingNotifier {
    pub(crate) fn notices(&self) -> Vec<AssignmentNotice> {
        self.notices.lock().expect("notifier mutex poisoned").clone()
    }
}

pub(crate) type RoutingService = ReportRoutingService<InMemoryReportRepository, LoggingNotifier>;

pub(crate) fn demo_source() -> Result<StaticDepartmentSource, CatalogError> {
    let departments = parse_catalog(DEMO_CATALOG_CSV.as_bytes())?;
    Ok(StaticDepartmentSource::new(departments))
}

pub(crate) fn department_source(
    path: Option<&Path>,
) -> Result<Arc<dyn DepartmentSource>, CatalogError> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "using CSV department catalog");
            Ok(Arc::new(CsvDepartmentSource::new(path)))
        }
        None => {
            info!("no catalog path configured, using bundled demo catalog");
            Ok(Arc::new(demo_source()?))
        }
    }
}

/// Override ids fall back to the bundled catalog's ids when it is in use.
pub(crate) fn classifier_config(routing: &RoutingConfig, bundled_catalog: bool) -> ClassifierConfig {
    let mut routing = routing.clone();
    if bundled_catalog {
        routing
            .fallen_tree_parks_id
            .get_or_insert_with(|| DEMO_PARKS_ID.to_string());
        routing
            .fallen_tree_transport_id
            .get_or_insert_with(|| DEMO_TRANSPORT_ID.to_string());
    }
    ClassifierConfig::from_routing(&routing)
}

pub(crate) fn build_routing_service(
    catalog: &CatalogConfig,
    routing: &RoutingConfig,
) -> Result<(Arc<RoutingService>, Arc<LoggingNotifier>), CatalogError> {
    let source = department_source(catalog.source_path.as_deref())?;
    let cache = Arc::new(CatalogCache::new(source, catalog.cache_ttl));
    let engine = ClassificationEngine::new(classifier_config(
        routing,
        catalog.source_path.is_none(),
    ));
    let notifier = Arc::new(LoggingNotifier::default());
    let service = Arc::new(ReportRoutingService::new(
        cache,
        engine,
        Arc::new(InMemoryReportRepository::default()),
        notifier.clone(),
    ));
    Ok((service, notifier))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_catalog_parses() {
        let departments = parse_catalog(DEMO_CATALOG_CSV.as_bytes()).expect("bundled csv parses");
        assert!(departments
            .iter()
            .any(|department| department.id.as_str() == DEMO_PARKS_ID));
        assert!(departments
            .iter()
            .any(|department| department.id.as_str() == DEMO_TRANSPORT_ID));
    }

    #[test]
    fn explicit_override_ids_win_over_bundled_defaults() {
        let routing = RoutingConfig {
            fallen_tree_parks_id: Some("taman-kota".to_string()),
            fallen_tree_transport_id: None,
        };

        let config = classifier_config(&routing, true);
        let scenario = &config.overrides[0];
        assert_eq!(scenario.assignments[0].department_id.as_str(), "taman-kota");
        assert_eq!(
            scenario.assignments[1].department_id.as_str(),
            DEMO_TRANSPORT_ID
        );

        assert!(classifier_config(&RoutingConfig::default(), false)
            .overrides
            .is_empty());
    }
}
