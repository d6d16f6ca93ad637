use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::classifier::{ClassificationOutcome, ClassificationResult, DepartmentAssignment};
use super::domain::{DepartmentId, ReportInput};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(pub String);

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Routing state of a stored report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// A primary department was chosen automatically.
    Assigned,
    /// No primary was chosen but departments are implicated; an operator confirms.
    NeedsReview,
    /// Nothing in the catalog matched the report.
    Unrouted,
}

impl ReportStatus {
    /// Scenario overrides can implicate departments even when nothing scored,
    /// so the department list counts alongside the outcome.
    pub fn from_result(result: &ClassificationResult) -> Self {
        match &result.outcome {
            ClassificationOutcome::Accepted { .. } => Self::Assigned,
            ClassificationOutcome::Rejected { .. } => Self::NeedsReview,
            ClassificationOutcome::NoMatch if result.all_department_ids.is_empty() => {
                Self::Unrouted
            }
            ClassificationOutcome::NoMatch => Self::NeedsReview,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Assigned => "Assigned",
            Self::NeedsReview => "Needs Review",
            Self::Unrouted => "Unrouted",
        }
    }
}

/// Report plus the routing decision handed to storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub report_id: ReportId,
    pub input: ReportInput,
    pub status: ReportStatus,
    pub classification: ClassificationResult,
    pub submitted_at: DateTime<Utc>,
}

impl ReportRecord {
    pub fn status_view(&self) -> ReportStatusView {
        ReportStatusView {
            report_id: self.report_id.clone(),
            status: self.status.label(),
            routing_summary: self.classification.outcome.summary(),
            primary_department: self.classification.primary_department().cloned(),
            related_departments: self.classification.related_departments.clone(),
        }
    }
}

/// Storage abstraction for routed reports.
pub trait ReportRepository: Send + Sync {
    fn insert(&self, record: ReportRecord) -> Result<ReportRecord, RepositoryError>;
    fn fetch(&self, id: &ReportId) -> Result<Option<ReportRecord>, RepositoryError>;
    fn by_status(&self, status: ReportStatus) -> Result<Vec<ReportRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("report already exists")]
    Conflict,
    #[error("report not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook telling departments (or the review desk) about a routed report.
pub trait AssignmentNotifier: Send + Sync {
    fn notify(&self, notice: AssignmentNotice) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentNotice {
    pub template: String,
    pub report_id: ReportId,
    /// Department addressed by the notice; `None` targets the manual review desk.
    pub department_id: Option<DepartmentId>,
    pub details: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Public representation of a report's routing state.
#[derive(Debug, Clone, Serialize)]
pub struct ReportStatusView {
    pub report_id: ReportId,
    pub status: &'static str,
    pub routing_summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_department: Option<DepartmentAssignment>,
    pub related_departments: Vec<DepartmentAssignment>,
}
