use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cohort_core::error::CoreError;
use cohort_sheets::SheetError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`SheetError`] for spreadsheet
/// failures, and adds HTTP-specific variants. Implements [`IntoResponse`] to
/// produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `cohort_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A spreadsheet error from `cohort_sheets`.
    #[error(transparent)]
    Sheet(#[from] SheetError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::Sheet(err) => classify_sheet_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn classify_core_error(core: &CoreError) -> (StatusCode, &'static str, String) {
    match core {
        CoreError::NotFound { entity, key } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} '{key}' not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

/// Classify a spreadsheet error into an HTTP status, error code, and message.
///
/// - Quota exhaustion with nothing cached maps to 429.
/// - Rows that moved underneath a write and unexpected header rows map to 409.
/// - Every other remote failure maps to 502 with a sanitized message.
fn classify_sheet_error(err: &SheetError) -> (StatusCode, &'static str, String) {
    match err {
        SheetError::Core(core) => classify_core_error(core),
        SheetError::RateLimited => (
            StatusCode::TOO_MANY_REQUESTS,
            "RATE_LIMITED",
            "The spreadsheet service is busy. Please try again in a minute.".to_string(),
        ),
        SheetError::StaleRow { .. } => (
            StatusCode::CONFLICT,
            "STALE_ROW",
            format!("{err}. Reload and try again."),
        ),
        SheetError::HeaderMismatch { .. } => {
            tracing::warn!(error = %err, "Worksheet headers differ from the expected layout");
            (StatusCode::CONFLICT, "HEADER_MISMATCH", err.to_string())
        }
        SheetError::WorksheetNotFound(_)
        | SheetError::Http(_)
        | SheetError::Api { .. }
        | SheetError::Auth(_) => {
            tracing::error!(error = %err, "Spreadsheet error");
            (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                "The spreadsheet service could not be reached".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use cohort_core::schema::Table;

    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn sheet_errors_map_to_statuses() {
        assert_eq!(
            status_of(SheetError::RateLimited.into()),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            status_of(SheetError::StaleRow { table: Table::Teams, row: 3 }.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(
                SheetError::Api {
                    status: 500,
                    message: "boom".into()
                }
                .into()
            ),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn wrapped_core_errors_keep_their_status() {
        let err: AppError = SheetError::from(CoreError::not_found("Team", "Team9")).into();
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);

        let err: AppError = SheetError::from(CoreError::Conflict("dup".into())).into();
        assert_eq!(status_of(err), StatusCode::CONFLICT);
    }
}
