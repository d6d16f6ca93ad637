use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::catalog::CatalogCache;
use super::classifier::{ClassificationEngine, ClassificationOutcome, ClassificationResult};
use super::domain::{DepartmentId, DepartmentProfile, ReportInput};
use super::repository::{
    AssignmentNotice, AssignmentNotifier, NotifyError, ReportId, ReportRecord, ReportRepository,
    ReportStatus, RepositoryError,
};

/// Service composing the catalog cache, classifier, repository, and notifier.
pub struct ReportRoutingService<R, N> {
    catalog: Arc<CatalogCache>,
    engine: Arc<ClassificationEngine>,
    repository: Arc<R>,
    notifier: Arc<N>,
    sequence: AtomicU64,
}

impl<R, N> ReportRoutingService<R, N>
where
    R: ReportRepository + 'static,
    N: AssignmentNotifier + 'static,
{
    pub fn new(
        catalog: Arc<CatalogCache>,
        engine: ClassificationEngine,
        repository: Arc<R>,
        notifier: Arc<N>,
    ) -> Self {
        Self {
            catalog,
            engine: Arc::new(engine),
            repository,
            notifier,
            sequence: AtomicU64::new(1),
        }
    }

    /// Current department catalog; empty when the store is unreachable.
    pub async fn departments(&self) -> Arc<[DepartmentProfile]> {
        self.catalog.departments().await
    }

    /// Route a report without persisting anything.
    pub async fn classify(&self, report: &ReportInput) -> ClassificationResult {
        let departments = self.catalog.departments().await;
        self.engine.classify(report, &departments)
    }

    /// Route a report, store the decision, and notify whoever has to act on it.
    pub async fn submit(&self, report: ReportInput) -> Result<ReportRecord, RoutingServiceError> {
        let classification = self.classify(&report).await;
        let status = ReportStatus::from_result(&classification);
        let report_id = self.next_report_id();

        let record = ReportRecord {
            report_id,
            input: report,
            status,
            classification,
            submitted_at: Utc::now(),
        };

        let stored = self.repository.insert(record)?;
        info!(
            report_id = %stored.report_id,
            status = stored.status.label(),
            departments = stored.classification.all_department_ids.len(),
            "report routed"
        );

        for notice in notices_for(&stored) {
            self.notifier.notify(notice)?;
        }

        Ok(stored)
    }

    pub fn get(&self, report_id: &ReportId) -> Result<ReportRecord, RoutingServiceError> {
        let record = self
            .repository
            .fetch(report_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Reports waiting for an operator to confirm the department.
    pub fn review_queue(&self) -> Result<Vec<ReportRecord>, RoutingServiceError> {
        Ok(self.repository.by_status(ReportStatus::NeedsReview)?)
    }

    fn next_report_id(&self) -> ReportId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        ReportId(format!("rpt-{id:06}"))
    }
}

/// Primary department first, then the review desk, then every other routed department.
fn notices_for(record: &ReportRecord) -> Vec<AssignmentNotice> {
    let classification = &record.classification;
    let mut details = BTreeMap::new();
    details.insert("title".to_string(), record.input.title.clone());
    details.insert("urgency".to_string(), record.input.urgency.label().to_string());
    if let Some(location) = &record.input.location {
        details.insert("location".to_string(), location.clone());
    }

    let mut notices = Vec::new();
    let primary_id = match &classification.outcome {
        ClassificationOutcome::Accepted { primary } => {
            let mut details = details.clone();
            details.insert("confidence".to_string(), primary.confidence.to_string());
            let related: Vec<&str> = classification
                .related_departments
                .iter()
                .map(|department| department.name.as_str())
                .collect();
            if !related.is_empty() {
                details.insert("related".to_string(), related.join(", "));
            }
            notices.push(notice(record, "report_assigned", Some(primary.id.clone()), details));
            Some(&primary.id)
        }
        ClassificationOutcome::Rejected { candidate } => {
            let mut details = details.clone();
            details.insert("candidate".to_string(), candidate.name.clone());
            details.insert("confidence".to_string(), candidate.confidence.to_string());
            notices.push(notice(record, "report_needs_review", None, details));
            None
        }
        ClassificationOutcome::NoMatch if classification.all_department_ids.is_empty() => {
            return notices;
        }
        ClassificationOutcome::NoMatch => {
            notices.push(notice(record, "report_needs_review", None, details.clone()));
            None
        }
    };

    for id in &classification.all_department_ids {
        if Some(id) == primary_id {
            continue;
        }
        let mut details = details.clone();
        if let Some(related) = classification
            .related_departments
            .iter()
            .find(|related| &related.id == id)
        {
            details.insert("confidence".to_string(), related.confidence.to_string());
        }
        notices.push(notice(record, "report_related", Some(id.clone()), details));
    }

    notices
}

fn notice(
    record: &ReportRecord,
    template: &str,
    department_id: Option<DepartmentId>,
    details: BTreeMap<String, String>,
) -> AssignmentNotice {
    AssignmentNotice {
        template: template.to_string(),
        report_id: record.report_id.clone(),
        department_id,
        details,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RoutingServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}
