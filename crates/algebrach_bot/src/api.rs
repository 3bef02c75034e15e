//! HTTP liveness endpoint.

use algebrach_error::StorageErrorKind;
use algebrach_storage::KekStorage;
use axum::{Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use std::sync::Arc;
use tracing::{error, instrument};

/// Result of one read through the kek storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    /// HTTP status to answer with
    pub status: StatusCode,
    /// Plain text body
    pub body: String,
}

impl HealthReport {
    /// Whether the storage answered.
    pub fn is_healthy(&self) -> bool {
        self.status.is_success()
    }
}

/// Read the kek list once and report how it went.
#[instrument(skip_all)]
pub async fn check_health(storage: &KekStorage) -> HealthReport {
    match storage.list_records().await {
        Ok(records) => HealthReport {
            status: StatusCode::OK,
            body: format!("OK - {} keks available", records.len()),
        },
        Err(e) if *e.kind() == StorageErrorKind::Timeout => {
            error!("Health check failed: storage timeout");
            HealthReport {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: "ERROR: Storage timeout".to_string(),
            }
        }
        Err(e) => {
            error!(error = %e, "Health check failed");
            HealthReport {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: format!("ERROR: {}", e.kind()),
            }
        }
    }
}

/// State shared by the health routes.
#[derive(Clone)]
pub struct HealthState {
    storage: Arc<KekStorage>,
}

impl HealthState {
    /// Health state reading from `storage`.
    pub fn new(storage: Arc<KekStorage>) -> Self {
        Self { storage }
    }
}

/// `GET /health` and `GET /`.
pub fn create_router(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/", get(health_check))
        .with_state(state)
}

async fn health_check(State(state): State<HealthState>) -> impl IntoResponse {
    let report = check_health(&state.storage).await;
    (report.status, report.body)
}
