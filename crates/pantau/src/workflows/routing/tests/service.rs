use std::sync::Arc;

use super::common::*;
use crate::workflows::routing::domain::{ReportInput, Urgency};
use crate::workflows::routing::repository::{ReportId, ReportRepository, ReportStatus};
use crate::workflows::routing::service::{ReportRoutingService, RoutingServiceError};
use crate::workflows::routing::classifier::ClassificationOutcome;

fn pothole_report() -> ReportInput {
    ReportInput::new(
        "Jalan amblas di depan pasar",
        "Aspal retak dan lubang besar di jalan",
        "infrastruktur",
    )
    .with_location("Jl. Sudirman")
}

#[tokio::test]
async fn accepted_report_is_assigned_and_department_notified() {
    let (service, repository, notifier) = build_service();

    let record = service.submit(pothole_report()).await.expect("submit succeeds");

    assert_eq!(record.status, ReportStatus::Assigned);
    let primary = record
        .classification
        .primary_department()
        .expect("primary department");
    assert_eq!(primary.id.as_str(), "dinas-bina-marga");
    assert_eq!(primary.confidence, 99);

    let stored = repository
        .fetch(&record.report_id)
        .expect("repo fetch")
        .expect("record stored");
    assert_eq!(stored.status, ReportStatus::Assigned);

    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].template, "report_assigned");
    assert_eq!(
        notices[0].department_id.as_ref().map(|id| id.as_str()),
        Some("dinas-bina-marga")
    );
    assert_eq!(
        notices[0].details.get("location").map(String::as_str),
        Some("Jl. Sudirman")
    );
}

#[tokio::test]
async fn low_confidence_report_goes_to_review_queue() {
    let (service, _, notifier) = build_service();

    let record = service
        .submit(ReportInput::new("Ada sampah", "", "kebersihan"))
        .await
        .expect("submit succeeds");

    assert_eq!(record.status, ReportStatus::NeedsReview);
    assert!(matches!(
        record.classification.outcome,
        ClassificationOutcome::Rejected { .. }
    ));

    let queue = service.review_queue().expect("queue loads");
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].report_id, record.report_id);

    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].template, "report_needs_review");
    assert!(notices[0].department_id.is_none());
    assert_eq!(
        notices[0].details.get("candidate").map(String::as_str),
        Some("Dinas Lingkungan Hidup")
    );
}

#[tokio::test]
async fn unmatched_report_is_stored_without_notification() {
    let (service, _, notifier) = build_service();

    let record = service
        .submit(ReportInput::new("Tolong dibantu", "Halo admin", "lainnya"))
        .await
        .expect("submit succeeds");

    assert_eq!(record.status, ReportStatus::Unrouted);
    assert!(notifier.notices().is_empty());
}

#[tokio::test]
async fn report_ids_are_sequential() {
    let (service, _, _) = build_service();

    let first = service.submit(pothole_report()).await.expect("first");
    let second = service.submit(pothole_report()).await.expect("second");

    assert_eq!(first.report_id, ReportId("rpt-000001".to_string()));
    assert_eq!(second.report_id, ReportId("rpt-000002".to_string()));
    let fetched = service.get(&second.report_id).expect("report found");
    assert_eq!(fetched.input.location.as_deref(), Some("Jl. Sudirman"));
}

#[tokio::test]
async fn unknown_report_is_not_found() {
    let (service, _, _) = build_service();

    match service.get(&ReportId("rpt-999999".to_string())) {
        Err(RoutingServiceError::Repository(err)) => {
            assert_eq!(err.to_string(), "report not found");
        }
        other => panic!("expected not found, got {other:?}"),
    }
}

#[tokio::test]
async fn repository_failure_surfaces_to_caller() {
    let source = Arc::new(CountingSource::new(city_catalog()));
    let cache = Arc::new(cache_with(source, Arc::new(ManualClock::new())));
    let service = ReportRoutingService::new(
        cache,
        engine(),
        Arc::new(UnavailableRepository),
        Arc::new(MemoryNotifier::default()),
    );

    let err = service
        .submit(pothole_report())
        .await
        .expect_err("repository is offline");
    assert!(matches!(err, RoutingServiceError::Repository(_)));
}

#[tokio::test]
async fn classify_uses_catalog_and_urgency() {
    let (service, repository, _) = build_service();

    let input = ReportInput::new("Banjir bandang", "Air setinggi lutut", "bencana")
        .with_urgency(Urgency::High);
    let result = service.classify(&input).await;

    assert_eq!(
        result.primary_department().map(|primary| primary.id.as_str()),
        Some("bpbd")
    );
    assert!(repository.records.lock().expect("lock").is_empty());
    assert_eq!(service.departments().await.len(), city_catalog().len());
}

#[tokio::test]
async fn fallen_tree_without_keywords_is_queued_and_departments_notified() {
    let (service, _, notifier) = build_service();

    let record = service
        .submit(ReportInput::new("Pohon roboh", "di gang sempit", "lainnya"))
        .await
        .expect("submit succeeds");

    assert!(matches!(
        record.classification.outcome,
        ClassificationOutcome::NoMatch
    ));
    assert_eq!(record.status, ReportStatus::NeedsReview);

    let queue = service.review_queue().expect("queue loads");
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].report_id, record.report_id);

    let notices = notifier.notices();
    let routed: Vec<_> = notices
        .iter()
        .map(|notice| {
            (
                notice.template.as_str(),
                notice.department_id.as_ref().map(|id| id.as_str()),
                notice.details.get("confidence").map(String::as_str),
            )
        })
        .collect();
    assert_eq!(
        routed,
        vec![
            ("report_needs_review", None, None),
            ("report_related", Some(PARKS_ID), Some("80")),
            ("report_related", Some(TRANSPORT_ID), Some("75")),
        ]
    );
}

#[tokio::test]
async fn accepted_report_notifies_override_departments_too() {
    let (service, _, notifier) = build_service();

    let record = service
        .submit(ReportInput::new(
            "Pohon tumbang menutup jalan",
            "Aspal retak dan lubang besar",
            "infrastruktur",
        ))
        .await
        .expect("submit succeeds");

    assert_eq!(record.status, ReportStatus::Assigned);
    let primary = record
        .classification
        .primary_department()
        .expect("primary department");
    assert_eq!(primary.id.as_str(), "dinas-bina-marga");

    let notices = notifier.notices();
    let targets: Vec<_> = notices
        .iter()
        .map(|notice| {
            (
                notice.template.as_str(),
                notice.department_id.as_ref().map(|id| id.as_str()),
            )
        })
        .collect();
    assert_eq!(
        targets,
        vec![
            ("report_assigned", Some("dinas-bina-marga")),
            ("report_related", Some(PARKS_ID)),
            ("report_related", Some(TRANSPORT_ID)),
        ]
    );
    assert_eq!(
        notices[0].details.get("related").map(String::as_str),
        Some("Dinas Perumahan dan Pertamanan, Dinas Perhubungan")
    );
}
