//! Route definitions for the `/updates` feed.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::feed;
use crate::state::AppState;

/// Routes mounted at `/updates`. Any logged-in account.
///
/// ```text
/// GET  /                 -> list_updates
/// POST /{id}/like        -> toggle_like
/// POST /{id}/comments    -> add_comment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(feed::list_updates))
        .route("/{id}/like", post(feed::toggle_like))
        .route("/{id}/comments", post(feed::add_comment))
}
