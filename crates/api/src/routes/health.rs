use axum::extract::State;
use axum::{routing::get, Json, Router};
use cohort_sheets::SheetBackend;
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// `google` or `memory`.
    pub sheets_backend: &'static str,
    /// Whether the spreadsheet answered a worksheet listing.
    pub sheets_healthy: bool,
}

/// GET /health -- returns service and spreadsheet health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let session = state.sheets.session();
    let sheets_healthy = match session.backend().worksheet_names().await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Spreadsheet health check failed");
            false
        }
    };

    let status = if sheets_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        sheets_backend: state.config.sheets_backend.as_str(),
        sheets_healthy,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
