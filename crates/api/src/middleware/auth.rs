//! JWT-based authentication extractor for Axum handlers.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use cohort_core::error::CoreError;
use cohort_sheets::SheetSession;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from a JWT Bearer token in the `Authorization`
/// header, together with the sheet session registered at login.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     let teams = TeamRepo::list(&user.sheets).await?;
///     Ok(Json(()))
/// }
/// ```
#[derive(Clone)]
pub struct AuthUser {
    /// Account email (from `claims.sub`).
    pub email: String,
    /// `"admin"` or `"participant"`.
    pub role: String,
    /// Token id, the key of the login session.
    pub jti: String,
    /// Sheet session owned by this login.
    pub sheets: Arc<SheetSession>,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        let session = state
            .sessions
            .get(&claims.jti, chrono::Utc::now().timestamp())
            .filter(|s| s.email == claims.sub && s.role == claims.role)
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Session has ended. Please log in again".into(),
                ))
            })?;

        Ok(AuthUser {
            email: claims.sub,
            role: claims.role,
            jti: claims.jti,
            sheets: session.sheets,
        })
    }
}
