//! Route definitions for the `/admin` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET    /participants                         -> list_participants
/// POST   /participants/{email}/reset-password  -> reset_password
/// GET    /teams                                -> list_teams
/// POST   /teams                                -> create_team
/// DELETE /teams/{name}                         -> delete_team
/// POST   /teams/{name}/members                 -> assign_members
/// GET    /projects                             -> list_projects
/// POST   /projects                             -> create_project
/// DELETE /projects/{name}                      -> delete_project
/// POST   /projects/{name}/notify               -> notify_project
/// GET    /projects/{name}/progress             -> get_progress
/// PUT    /projects/{name}/progress             -> update_progress
/// POST   /tables/{table}/reset-headers         -> reset_headers
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/participants", get(admin::list_participants))
        .route(
            "/participants/{email}/reset-password",
            post(admin::reset_password),
        )
        .route("/teams", get(admin::list_teams).post(admin::create_team))
        .route("/teams/{name}", delete(admin::delete_team))
        .route("/teams/{name}/members", post(admin::assign_members))
        .route(
            "/projects",
            get(admin::list_projects).post(admin::create_project),
        )
        .route("/projects/{name}", delete(admin::delete_project))
        .route("/projects/{name}/notify", post(admin::notify_project))
        .route(
            "/projects/{name}/progress",
            get(admin::get_progress).put(admin::update_progress),
        )
        .route("/tables/{table}/reset-headers", post(admin::reset_headers))
}
