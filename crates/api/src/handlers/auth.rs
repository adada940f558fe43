//! Handlers for the `/auth` resource (login, logout).
//!
//! Two disjoint credential paths: the static admin credential from the
//! secrets file, then participant rows with a stored password hash. The
//! admin path never reads the spreadsheet.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use cohort_core::error::CoreError;
use cohort_core::roles::{ROLE_ADMIN, ROLE_PARTICIPANT};
use cohort_sheets::repositories::ParticipantRepo;
use cohort_sheets::SheetSession;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::password_matches;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::sessions::LoginSession;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful authentication response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Public account info embedded in [`AuthResponse`].
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub email: String,
    pub name: String,
    pub role: String,
    pub team: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Returns an access token bound to a
/// fresh sheet session.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let email = input.email.trim();
    if email.is_empty() || input.password.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Email and password are required".into(),
        )));
    }

    // 1. Static admin credential.
    if state.admin.matches(email, &input.password) {
        let user = UserInfo {
            email: email.to_string(),
            name: "Admin".to_string(),
            role: ROLE_ADMIN.to_string(),
            team: None,
        };
        return Ok(Json(start_session(&state, user, state.sheets.session())?));
    }

    // 2. Participant with a stored hash.
    let sheets = state.sheets.session();
    let participant = ParticipantRepo::find_by_email(&sheets, email)
        .await?
        .ok_or_else(invalid_credentials)?;

    let Some(hash) = participant.password_hash.as_deref() else {
        return Err(AppError::Core(CoreError::Unauthorized(
            "No password has been set for this account. Please contact the admin.".into(),
        )));
    };

    if !password_matches(&input.password, hash) {
        tracing::info!(email, "Rejected participant login");
        return Err(invalid_credentials());
    }

    let user = UserInfo {
        email: participant.email.clone(),
        name: participant.display_name().to_string(),
        role: ROLE_PARTICIPANT.to_string(),
        team: participant.team.clone(),
    };
    Ok(Json(start_session(&state, user, sheets)?))
}

/// POST /api/v1/auth/logout
///
/// End the caller's session and drop its cached sheet data. Returns 204.
pub async fn logout(State(state): State<AppState>, user: AuthUser) -> AppResult<StatusCode> {
    state.sessions.remove(&user.jti);
    tracing::info!(email = %user.email, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
}

/// Issue a token for `user` and register `sheets` under its `jti`.
fn start_session(
    state: &AppState,
    user: UserInfo,
    sheets: SheetSession,
) -> AppResult<AuthResponse> {
    let (access_token, claims) = generate_access_token(&user.email, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    state.sessions.insert(
        &claims.jti,
        LoginSession {
            email: claims.sub.clone(),
            role: claims.role.clone(),
            expires_at: claims.exp,
            sheets: Arc::new(sheets),
        },
        claims.iat,
    );
    tracing::info!(email = %user.email, role = %user.role, "User logged in");

    Ok(AuthResponse {
        access_token,
        expires_in: state.config.jwt.expires_in(),
        user,
    })
}
