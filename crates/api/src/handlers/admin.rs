//! Handlers for the `/admin` resource: participants, teams, projects,
//! progress tracking and worksheet maintenance.
//!
//! Every handler requires the admin role and works against the admin's own
//! sheet session.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use cohort_core::error::CoreError;
use cohort_core::models::{NewProject, Participant, PhaseProgress, Project, Team};
use cohort_core::notification::{Message, Recipient};
use cohort_core::phase::{PhaseStatus, SdlcPhase};
use cohort_core::schema::Table;
use cohort_core::types::Date;
use cohort_core::validation::{validate_new_password, validate_progress};
use cohort_events::NotificationReport;
use cohort_sheets::repositories::{ParticipantRepo, ProgressRepo, ProjectRepo, TeamRepo};
use cohort_sheets::SheetSession;
use serde::{Deserialize, Serialize};

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// A participant as listed for the admin.
#[derive(Debug, Serialize)]
pub struct ParticipantSummary {
    pub name: String,
    pub display_name: String,
    pub email: String,
    pub status: String,
    pub team: Option<String>,
    pub has_password: bool,
}

impl From<&Participant> for ParticipantSummary {
    fn from(p: &Participant) -> Self {
        Self {
            name: p.name.clone(),
            display_name: p.display_name().to_string(),
            email: p.email.clone(),
            status: p.status.clone(),
            team: p.team.clone(),
            has_password: p.has_password(),
        }
    }
}

/// Name and address of a team member.
#[derive(Debug, Clone, Serialize)]
pub struct MemberInfo {
    pub name: String,
    pub email: String,
}

impl From<&Participant> for MemberInfo {
    fn from(p: &Participant) -> Self {
        Self {
            name: p.display_name().to_string(),
            email: p.email.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TeamOverview {
    pub name: String,
    pub description: String,
    pub members: Vec<MemberInfo>,
    pub projects: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TeamsResponse {
    pub teams: Vec<TeamOverview>,
    /// Participants without a team.
    pub unassigned: Vec<MemberInfo>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTeamRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteTeamResponse {
    pub team: String,
    /// Emails of the former members, now without a team.
    pub unassigned: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignMembersRequest {
    pub emails: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AssignMembersResponse {
    pub team: String,
    pub assigned: Vec<String>,
    /// Emails whose team cell could not be written; they were not notified.
    pub failed: Vec<String>,
    pub notifications: NotificationReport,
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    #[serde(flatten)]
    pub project: NewProject,
    /// Mail every member of the assigned team once the project exists.
    #[serde(default)]
    pub notify_team: bool,
}

#[derive(Debug, Serialize)]
pub struct CreateProjectResponse {
    pub project: Project,
    pub notifications: Option<NotificationReport>,
}

/// A project with its per-phase progress rows, in phase order.
#[derive(Debug, Serialize)]
pub struct ProjectProgressView {
    pub project: Project,
    pub phases: Vec<PhaseProgress>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProgressRequest {
    pub phase: SdlcPhase,
    pub status: PhaseStatus,
    pub start_date: Option<Date>,
    /// Kept only when `status` is `Completed`.
    pub end_date: Option<Date>,
    #[serde(default)]
    pub comments: String,
    /// Overall project progress, 0 to 100.
    pub progress: u8,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
    pub confirm_password: String,
    /// Send the participant a password-reset mail.
    #[serde(default)]
    pub notify: bool,
}

#[derive(Debug, Serialize)]
pub struct ResetPasswordResponse {
    pub email: String,
    /// Whether the mail went out; absent when none was requested.
    pub notified: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ResetHeadersRequest {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize)]
pub struct ResetHeadersResponse {
    pub table: &'static str,
    pub headers: Vec<String>,
}

// ---------------------------------------------------------------------------
// Participants
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/participants
pub async fn list_participants(
    RequireAdmin(admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<ParticipantSummary>>>> {
    let participants = ParticipantRepo::list(&admin.sheets).await?;
    Ok(Json(DataResponse {
        data: participants.iter().map(ParticipantSummary::from).collect(),
    }))
}

/// POST /api/v1/admin/participants/{email}/reset-password
///
/// Set a new password for a participant, optionally mailing them about it.
pub async fn reset_password(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<Json<DataResponse<ResetPasswordResponse>>> {
    validate_new_password(&input.new_password, &input.confirm_password)?;
    let hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    ParticipantRepo::set_password_hash(&admin.sheets, &email, &hash).await?;
    tracing::info!(email = email.trim(), admin = %admin.email, "Participant password reset");

    let notified = if input.notify {
        let participant = ParticipantRepo::find_by_email(&admin.sheets, &email)
            .await?
            .ok_or_else(|| CoreError::not_found(Table::Participants.entity(), email.trim()))?;
        let recipient = Recipient::new(&participant.email, participant.display_name());
        Some(state.notifier.notify(&recipient, &Message::PasswordReset).await)
    } else {
        None
    };

    Ok(Json(DataResponse {
        data: ResetPasswordResponse {
            email: email.trim().to_string(),
            notified,
        },
    }))
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/teams
///
/// Every team with its members and projects, plus the unassigned participants.
pub async fn list_teams(
    RequireAdmin(admin): RequireAdmin,
) -> AppResult<Json<DataResponse<TeamsResponse>>> {
    let teams = TeamRepo::list(&admin.sheets).await?;
    let participants = ParticipantRepo::list(&admin.sheets).await?;
    let projects = ProjectRepo::list(&admin.sheets).await?;

    let teams = teams
        .into_iter()
        .map(|team| TeamOverview {
            members: participants
                .iter()
                .filter(|p| p.is_on_team(&team.name))
                .map(MemberInfo::from)
                .collect(),
            projects: projects
                .iter()
                .filter(|p| p.assigned_team == team.name)
                .map(|p| p.name.clone())
                .collect(),
            name: team.name,
            description: team.description,
        })
        .collect();

    let unassigned = participants
        .iter()
        .filter(|p| p.team.is_none() && !p.email.is_empty())
        .map(MemberInfo::from)
        .collect();

    Ok(Json(DataResponse {
        data: TeamsResponse { teams, unassigned },
    }))
}

/// POST /api/v1/admin/teams
pub async fn create_team(
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateTeamRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Team>>)> {
    let team = TeamRepo::create(&admin.sheets, &input.name, &input.description).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: team })))
}

/// DELETE /api/v1/admin/teams/{name}
///
/// Unassign every member, then delete the team row.
pub async fn delete_team(
    RequireAdmin(admin): RequireAdmin,
    Path(name): Path<String>,
) -> AppResult<Json<DataResponse<DeleteTeamResponse>>> {
    let unassigned = TeamRepo::delete(&admin.sheets, &name).await?;
    Ok(Json(DataResponse {
        data: DeleteTeamResponse {
            team: name.trim().to_string(),
            unassigned,
        },
    }))
}

/// POST /api/v1/admin/teams/{name}/members
///
/// Assign participants to a team and mail each of them a team-assignment
/// notice. Every address is checked before anything is written. Each member
/// is notified right after their own write; a failed write is reported in
/// `failed` and the rest carry on. Fails only when no member was assigned.
pub async fn assign_members(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(team): Path<String>,
    Json(input): Json<AssignMembersRequest>,
) -> AppResult<Json<DataResponse<AssignMembersResponse>>> {
    if input.emails.is_empty() {
        return Err(AppError::BadRequest(
            "Select at least one participant to assign".into(),
        ));
    }
    let team = team.trim().to_string();
    if TeamRepo::find(&admin.sheets, &team).await?.is_none() {
        return Err(CoreError::not_found(Table::Teams.entity(), team).into());
    }
    let recipients = recipients_for(&admin.sheets, &input.emails).await?;
    let message = Message::TeamAssignment { team: team.clone() };

    let mut assigned = Vec::with_capacity(recipients.len());
    let mut failed = Vec::new();
    let mut notifications = NotificationReport::default();
    let mut first_error = None;
    for recipient in &recipients {
        if let Err(e) = ParticipantRepo::assign_team(&admin.sheets, &recipient.email, &team).await {
            tracing::warn!(email = %recipient.email, team = %team, error = %e, "Team assignment failed");
            failed.push(recipient.email.clone());
            first_error.get_or_insert(e);
            continue;
        }
        assigned.push(recipient.email.clone());
        if state.notifier.notify(recipient, &message).await {
            notifications.sent.push(recipient.name.clone());
        } else {
            notifications.failed.push(recipient.name.clone());
        }
    }

    if assigned.is_empty() {
        if let Some(e) = first_error {
            return Err(e.into());
        }
    }
    tracing::info!(
        team = %team,
        assigned = assigned.len(),
        failed = failed.len(),
        notified = notifications.sent.len(),
        "Team members assigned"
    );

    Ok(Json(DataResponse {
        data: AssignMembersResponse {
            team,
            assigned,
            failed,
            notifications,
        },
    }))
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/projects
pub async fn list_projects(
    RequireAdmin(admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let projects = ProjectRepo::list(&admin.sheets).await?;
    Ok(Json(DataResponse { data: projects }))
}

/// POST /api/v1/admin/projects
///
/// Create a project in its initial phase, optionally notifying the team.
pub async fn create_project(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateProjectRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<CreateProjectResponse>>)> {
    let project = ProjectRepo::create(&admin.sheets, input.project).await?;

    let notifications = if input.notify_team {
        Some(notify_project_team(&state, &admin.sheets, &project).await?)
    } else {
        None
    };

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CreateProjectResponse {
                project,
                notifications,
            },
        }),
    ))
}

/// DELETE /api/v1/admin/projects/{name}
///
/// Progress rows of the project are left in place.
pub async fn delete_project(
    RequireAdmin(admin): RequireAdmin,
    Path(name): Path<String>,
) -> AppResult<StatusCode> {
    ProjectRepo::delete(&admin.sheets, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/projects/{name}/notify
///
/// Mail every member of the project's team a project-assignment notice.
pub async fn notify_project(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<DataResponse<NotificationReport>>> {
    let project = find_project(&admin.sheets, &name).await?;
    let report = notify_project_team(&state, &admin.sheets, &project).await?;
    Ok(Json(DataResponse { data: report }))
}

/// GET /api/v1/admin/projects/{name}/progress
pub async fn get_progress(
    RequireAdmin(admin): RequireAdmin,
    Path(name): Path<String>,
) -> AppResult<Json<DataResponse<ProjectProgressView>>> {
    let project = find_project(&admin.sheets, &name).await?;
    let view = progress_view(&admin.sheets, project).await?;
    Ok(Json(DataResponse { data: view }))
}

/// PUT /api/v1/admin/projects/{name}/progress
///
/// Record the status of one phase and move the project's current phase and
/// overall progress.
pub async fn update_progress(
    RequireAdmin(admin): RequireAdmin,
    Path(name): Path<String>,
    Json(input): Json<UpdateProgressRequest>,
) -> AppResult<Json<DataResponse<ProjectProgressView>>> {
    validate_progress(input.progress)?;
    let project = find_project(&admin.sheets, &name).await?;

    let entry = PhaseProgress::new(
        &project.name,
        input.phase,
        input.status,
        input.start_date,
        input.end_date,
        input.comments,
    );
    let appended = ProgressRepo::upsert(&admin.sheets, &entry).await?;
    ProjectRepo::set_phase_and_progress(&admin.sheets, &project.name, input.phase, input.progress)
        .await?;
    tracing::info!(
        project = %project.name,
        phase = %input.phase,
        status = %input.status,
        progress = input.progress,
        appended,
        "Project progress updated"
    );

    let project = find_project(&admin.sheets, &project.name).await?;
    let view = progress_view(&admin.sheets, project).await?;
    Ok(Json(DataResponse { data: view }))
}

// ---------------------------------------------------------------------------
// Worksheet maintenance
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/tables/{table}/reset-headers
///
/// Clear a worksheet and rewrite its prescribed header row. Erases every data
/// row, so the body must carry `"confirm": true`.
pub async fn reset_headers(
    RequireAdmin(admin): RequireAdmin,
    Path(table): Path<String>,
    Json(input): Json<ResetHeadersRequest>,
) -> AppResult<Json<DataResponse<ResetHeadersResponse>>> {
    let table: Table = table.parse()?;
    let ws = admin.sheets.reset_headers(table, input.confirm).await?;
    tracing::warn!(table = %table, admin = %admin.email, "Worksheet cleared and headers reset");
    Ok(Json(DataResponse {
        data: ResetHeadersResponse {
            table: ws.name(),
            headers: ws.headers,
        },
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) async fn find_project(sheets: &SheetSession, name: &str) -> AppResult<Project> {
    ProjectRepo::find(sheets, name)
        .await?
        .ok_or_else(|| CoreError::not_found(Table::Projects.entity(), name.trim()).into())
}

pub(crate) async fn progress_view(
    sheets: &SheetSession,
    project: Project,
) -> AppResult<ProjectProgressView> {
    let phases = ProgressRepo::list_for_project(sheets, &project.name).await?;
    Ok(ProjectProgressView { project, phases })
}

/// Recipients for `emails`, read from a fresh copy of the participant sheet.
async fn recipients_for(sheets: &SheetSession, emails: &[String]) -> AppResult<Vec<Recipient>> {
    let current = sheets.fresh_snapshot(Table::Participants).await?;
    let participants: Vec<Participant> =
        current.records.iter().map(Participant::from_record).collect();

    let mut recipients: Vec<Recipient> = Vec::with_capacity(emails.len());
    for email in emails {
        let email = email.trim();
        if recipients.iter().any(|r| r.email == email) {
            continue;
        }
        let participant = participants
            .iter()
            .find(|p| p.email == email)
            .ok_or_else(|| CoreError::not_found(Table::Participants.entity(), email))?;
        recipients.push(Recipient::new(&participant.email, participant.display_name()));
    }
    Ok(recipients)
}

async fn notify_project_team(
    state: &AppState,
    sheets: &SheetSession,
    project: &Project,
) -> AppResult<NotificationReport> {
    let recipients: Vec<Recipient> =
        ParticipantRepo::list_by_team(sheets, &project.assigned_team)
            .await?
            .iter()
            .map(|p| Recipient::new(&p.email, p.display_name()))
            .collect();

    let report = state
        .notifier
        .notify_all(
            &recipients,
            &Message::ProjectAssignment {
                team: project.assigned_team.clone(),
                project: project.name.clone(),
            },
        )
        .await;
    tracing::info!(
        project = %project.name,
        sent = report.sent.len(),
        failed = report.failed.len(),
        "Project team notified"
    );
    Ok(report)
}
