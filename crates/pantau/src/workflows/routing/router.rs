use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::json;

use crate::error::AppError;

use super::classifier::{ClassificationResult, DepartmentAssignment};
use super::domain::{ReportInput, ReportSubmission};
use super::repository::{AssignmentNotifier, ReportId, ReportRepository, RepositoryError};
use super::service::{ReportRoutingService, RoutingServiceError};

/// Classification payload with the primary department surfaced for form callers.
#[derive(Debug, Serialize)]
pub struct ClassificationView {
    pub primary_department: Option<DepartmentAssignment>,
    #[serde(flatten)]
    pub result: ClassificationResult,
}

impl From<ClassificationResult> for ClassificationView {
    fn from(result: ClassificationResult) -> Self {
        Self {
            primary_department: result.primary_department().cloned(),
            result,
        }
    }
}

/// Router builder exposing report routing endpoints.
pub fn report_router<R, N>(service: Arc<ReportRoutingService<R, N>>) -> Router
where
    R: ReportRepository + 'static,
    N: AssignmentNotifier + 'static,
{
    Router::new()
        .route("/api/v1/reports", post(submit_handler::<R, N>))
        .route("/api/v1/reports/classify", post(classify_handler::<R, N>))
        .route("/api/v1/reports/:report_id", get(status_handler::<R, N>))
        .route("/api/v1/review-queue", get(review_queue_handler::<R, N>))
        .route("/api/v1/departments", get(departments_handler::<R, N>))
        .with_state(service)
}

pub(crate) async fn classify_handler<R, N>(
    State(service): State<Arc<ReportRoutingService<R, N>>>,
    axum::Json(submission): axum::Json<ReportSubmission>,
) -> Response
where
    R: ReportRepository + 'static,
    N: AssignmentNotifier + 'static,
{
    let input = ReportInput::from(submission);
    let result = service.classify(&input).await;
    (StatusCode::OK, axum::Json(ClassificationView::from(result))).into_response()
}

pub(crate) async fn submit_handler<R, N>(
    State(service): State<Arc<ReportRoutingService<R, N>>>,
    axum::Json(submission): axum::Json<ReportSubmission>,
) -> Response
where
    R: ReportRepository + 'static,
    N: AssignmentNotifier + 'static,
{
    match service.submit(ReportInput::from(submission)).await {
        Ok(record) => (StatusCode::ACCEPTED, axum::Json(record.status_view())).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn status_handler<R, N>(
    State(service): State<Arc<ReportRoutingService<R, N>>>,
    Path(report_id): Path<String>,
) -> Response
where
    R: ReportRepository + 'static,
    N: AssignmentNotifier + 'static,
{
    let id = ReportId(report_id);
    match service.get(&id) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(RoutingServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "report_id": id.0,
                "error": "report not found",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn review_queue_handler<R, N>(
    State(service): State<Arc<ReportRoutingService<R, N>>>,
) -> Response
where
    R: ReportRepository + 'static,
    N: AssignmentNotifier + 'static,
{
    match service.review_queue() {
        Ok(records) => {
            let views: Vec<_> = records.iter().map(|record| record.status_view()).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn departments_handler<R, N>(
    State(service): State<Arc<ReportRoutingService<R, N>>>,
) -> Response
where
    R: ReportRepository + 'static,
    N: AssignmentNotifier + 'static,
{
    let departments = service.departments().await;
    (StatusCode::OK, axum::Json(departments.to_vec())).into_response()
}
