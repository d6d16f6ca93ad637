use crate::cli::ServeArgs;
use crate::infra::{build_routing_service, AppState};
use crate::routes::with_report_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use pantau::config::AppConfig;
use pantau::error::AppError;
use pantau::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let (routing_service, _notifier) = build_routing_service(&config.catalog, &config.routing)?;
    let departments = routing_service.departments().await;
    info!(
        departments = departments.len(),
        ttl_secs = config.catalog.cache_ttl.as_secs(),
        "department catalog primed"
    );

    let app = with_report_routes(routing_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "report routing service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
