use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use pantau::workflows::routing::{
    report_router, AssignmentNotifier, ReportRepository, ReportRoutingService,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_report_routes<R, N>(service: Arc<ReportRoutingService<R, N>>) -> axum::Router
where
    R: ReportRepository + 'static,
    N: AssignmentNotifier + 'static,
{
    report_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::build_routing_service;
    use axum::body::Body;
    use axum::http::Request;
    use pantau::config::{CatalogConfig, RoutingConfig};
    use tower::ServiceExt;

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn routing_endpoints_use_bundled_catalog() {
        let (service, notifier) =
            build_routing_service(&CatalogConfig::default(), &RoutingConfig::default())
                .expect("service builds");
        let router = with_report_routes(service);

        let response = router
            .oneshot(
                Request::post("/api/v1/reports")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({
                            "title": "Pohon tumbang",
                            "description": "Pohon besar roboh, ranting menutup taman dan rambu rusak",
                            "category": "pertamanan",
                        })
                        .to_string(),
                    ))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::ACCEPTED);
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
                ("report_assigned", Some("dinas-pertamanan")),
                ("report_related", Some("dinas-perhubungan")),
            ]
        );
    }
}
