use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::routing::{CatalogError, RepositoryError, RoutingServiceError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Catalog(CatalogError),
    Routing(RoutingServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Catalog(err) => write!(f, "catalog error: {}", err),
            AppError::Routing(err) => write!(f, "routing error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Catalog(err) => Some(err),
            AppError::Routing(err) => Some(err),
        }
    }
}

impl AppError {
    /// HTTP status a report-routing client sees for this failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Catalog(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Routing(RoutingServiceError::Repository(err)) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict => StatusCode::CONFLICT,
                RepositoryError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            AppError::Routing(RoutingServiceError::Notify(_)) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) | AppError::Telemetry(_) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::Catalog(_) => "catalog_unavailable",
            AppError::Routing(RoutingServiceError::Repository(RepositoryError::NotFound)) => {
                "report_not_found"
            }
            AppError::Routing(RoutingServiceError::Repository(RepositoryError::Conflict)) => {
                "report_exists"
            }
            AppError::Routing(RoutingServiceError::Repository(_)) => "report_store_unavailable",
            AppError::Routing(RoutingServiceError::Notify(_)) => "department_notification_failed",
            AppError::Config(_) | AppError::Telemetry(_) | AppError::Io(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string(), "kind": self.kind() }));
        (self.status_code(), body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<CatalogError> for AppError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

impl From<RoutingServiceError> for AppError {
    fn from(value: RoutingServiceError) -> Self {
        Self::Routing(value)
    }
}
