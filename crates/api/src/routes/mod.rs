pub mod admin;
pub mod auth;
pub mod health;
pub mod me;
pub mod updates;

use axum::routing::post;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /signup                                          signup (public)
///
/// /auth/login                                      login (public)
/// /auth/logout                                     logout (requires auth)
///
/// /admin/participants                              list (admin only)
/// /admin/participants/{email}/reset-password       reset password (POST)
/// /admin/teams                                     list, create
/// /admin/teams/{name}                              delete
/// /admin/teams/{name}/members                      assign + notify (POST)
/// /admin/projects                                  list, create
/// /admin/projects/{name}                           delete
/// /admin/projects/{name}/notify                    notify team (POST)
/// /admin/projects/{name}/progress                  get, update (GET, PUT)
/// /admin/tables/{table}/reset-headers              clear + rewrite headers (POST)
///
/// /me/dashboard                                    participant dashboard (GET)
/// /me/updates                                      post update (POST)
/// /me/password                                     change password (POST)
///
/// /updates                                         feed (?team=)
/// /updates/{id}/like                               toggle like (POST)
/// /updates/{id}/comments                           add comment (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(handlers::signup::signup))
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .nest("/me", me::router())
        .nest("/updates", updates::router())
}
