use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::warn;

use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::approvals::{ChainError, HrServiceError, StoreError};

/// Failures surfaced by the binaries and the HTTP handlers. `status` is the single
/// error-to-status mapping.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("http server: {0}")]
    Server(#[from] axum::Error),
    #[error("record store: {0}")]
    Store(#[from] StoreError),
    #[error("hr workflow: {0}")]
    Service(#[from] HrServiceError),
    #[error("blocking task: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Service(error) => service_status(error),
            Self::Config(_)
            | Self::Telemetry(_)
            | Self::Io(_)
            | Self::Server(_)
            | Self::Store(_)
            | Self::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn service_status(error: &HrServiceError) -> StatusCode {
    match error {
        HrServiceError::Validation(_) | HrServiceError::Chain(ChainError::InvalidSplit { .. }) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        HrServiceError::Chain(_) | HrServiceError::InvalidTransition { .. } => {
            StatusCode::CONFLICT
        }
        HrServiceError::EmployeeNotFound(_)
        | HrServiceError::RequestNotFound(_)
        | HrServiceError::Effect(_) => StatusCode::NOT_FOUND,
        HrServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(error = %self, "request failed");
        }
        // Clients see the workflow message without the `hr workflow:` prefix.
        let message = match &self {
            Self::Service(error) => error.to_string(),
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
