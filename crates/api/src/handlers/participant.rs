//! Handlers for the `/me` resource: the participant dashboard, posting
//! updates and changing one's own password.

use axum::http::StatusCode;
use axum::Json;
use cohort_core::error::CoreError;
use cohort_core::models::{Participant, Update};
use cohort_core::phase::SdlcPhase;
use cohort_core::schema::Table;
use cohort_core::validation::validate_new_password;
use cohort_sheets::repositories::{ParticipantRepo, ProjectRepo, TeamRepo, UpdateRepo};
use cohort_sheets::SheetSession;
use serde::{Deserialize, Serialize};

use super::admin::{progress_view, MemberInfo, ProjectProgressView};
use crate::auth::password::{hash_password, password_matches};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireParticipant;
use crate::response::DataResponse;

/// How many of the team's latest updates the dashboard shows.
const DASHBOARD_UPDATES: usize = 10;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct TeamView {
    pub name: String,
    pub description: String,
    pub members: Vec<MemberInfo>,
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub display_name: String,
    pub participant: Participant,
    /// `None` until the admin assigns a team.
    pub team: Option<TeamView>,
    pub projects: Vec<ProjectProgressView>,
    pub recent_updates: Vec<Update>,
}

#[derive(Debug, Deserialize)]
pub struct PostUpdateRequest {
    pub text: String,
    pub phase: Option<SdlcPhase>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/me/dashboard
///
/// The caller's profile, team, team projects with progress, and the team's
/// latest updates.
pub async fn dashboard(
    RequireParticipant(user): RequireParticipant,
) -> AppResult<Json<DataResponse<Dashboard>>> {
    let participant = current_participant(&user.sheets, &user.email).await?;

    let (team, projects, recent_updates) = match participant.team.as_deref() {
        None => (None, Vec::new(), Vec::new()),
        Some(team_name) => {
            let description = TeamRepo::find(&user.sheets, team_name)
                .await?
                .map(|t| t.description)
                .unwrap_or_default();
            let members = ParticipantRepo::list_by_team(&user.sheets, team_name)
                .await?
                .iter()
                .map(MemberInfo::from)
                .collect();

            let mut projects = Vec::new();
            for project in ProjectRepo::list_by_team(&user.sheets, team_name).await? {
                projects.push(progress_view(&user.sheets, project).await?);
            }

            let mut updates = UpdateRepo::list(&user.sheets, Some(team_name)).await?;
            updates.truncate(DASHBOARD_UPDATES);

            let team = TeamView {
                name: team_name.to_string(),
                description,
                members,
            };
            (Some(team), projects, updates)
        }
    };

    Ok(Json(DataResponse {
        data: Dashboard {
            display_name: participant.display_name().to_string(),
            participant,
            team,
            projects,
            recent_updates,
        },
    }))
}

/// POST /api/v1/me/updates
///
/// Post a status update for the caller's team.
pub async fn post_update(
    RequireParticipant(user): RequireParticipant,
    Json(input): Json<PostUpdateRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Update>>)> {
    let participant = current_participant(&user.sheets, &user.email).await?;
    let team = participant.team.ok_or_else(|| {
        CoreError::Forbidden("You need to be assigned to a team before posting updates".into())
    })?;

    let update = UpdateRepo::create(&user.sheets, &team, &user.email, &input.text, input.phase)
        .await?;
    tracing::info!(id = %update.id, team = %team, "Update posted");
    Ok((StatusCode::CREATED, Json(DataResponse { data: update })))
}

/// POST /api/v1/me/password
///
/// Change the caller's password. Returns 204.
pub async fn change_password(
    RequireParticipant(user): RequireParticipant,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    let participant = current_participant(&user.sheets, &user.email).await?;
    let current_ok = participant
        .password_hash
        .as_deref()
        .is_some_and(|hash| password_matches(&input.current_password, hash));
    if !current_ok {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Current password is incorrect".into(),
        )));
    }

    validate_new_password(&input.new_password, &input.confirm_password)?;
    let hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    ParticipantRepo::set_password_hash(&user.sheets, &user.email, &hash).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn current_participant(sheets: &SheetSession, email: &str) -> AppResult<Participant> {
    ParticipantRepo::find_by_email(sheets, email)
        .await?
        .ok_or_else(|| CoreError::not_found(Table::Participants.entity(), email).into())
}
