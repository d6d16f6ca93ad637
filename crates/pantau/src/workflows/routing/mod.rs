//! Routing of citizen reports to the government departments responsible for them.
//!
//! Reports are scored against a cached department catalog using weighted keyword
//! rules; the outcome is persisted through [`ReportRepository`] and announced via
//! [`AssignmentNotifier`].

pub mod catalog;
pub mod classifier;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use catalog::{
    CatalogCache, CatalogError, Clock, CsvDepartmentSource, DepartmentSource,
    StaticDepartmentSource, SystemClock,
};
pub use classifier::{
    ClassificationEngine, ClassificationOutcome, ClassificationResult, ClassifierConfig,
    DepartmentAssignment, OverrideAssignment, ScenarioOverride,
};
pub use domain::{DepartmentId, DepartmentProfile, ReportInput, ReportSubmission, Urgency};
pub use repository::{
    AssignmentNotice, AssignmentNotifier, NotifyError, ReportId, ReportRecord, ReportRepository,
    ReportStatus, ReportStatusView, RepositoryError,
};
pub use router::report_router;
pub use service::{ReportRoutingService, RoutingServiceError};
