//! Route definitions for the `/me` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::participant;
use crate::state::AppState;

/// Routes mounted at `/me`. Participant accounts only.
///
/// ```text
/// GET  /dashboard  -> dashboard
/// POST /updates    -> post_update
/// POST /password   -> change_password
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(participant::dashboard))
        .route("/updates", post(participant::post_update))
        .route("/password", post(participant::change_password))
}
