//! Repository for the `Projects` worksheet.

use cohort_core::error::CoreError;
use cohort_core::models::{NewProject, Project};
use cohort_core::phase::SdlcPhase;
use cohort_core::schema::{Table, COL_CURRENT_PHASE};
use cohort_core::types::now;
use cohort_core::validation::{require_fields, validate_progress};

use crate::error::SheetResult;
use crate::repositories::TeamRepo;
use crate::session::SheetSession;
use crate::snapshot::RowKey;

pub struct ProjectRepo;

impl ProjectRepo {
    pub async fn list(session: &SheetSession) -> SheetResult<Vec<Project>> {
        let snapshot = session.snapshot(Table::Projects).await?;
        Ok(snapshot
            .records
            .iter()
            .map(Project::from_record)
            .filter(|p| !p.name.is_empty())
            .collect())
    }

    pub async fn find(session: &SheetSession, name: &str) -> SheetResult<Option<Project>> {
        let name = name.trim();
        Ok(Self::list(session).await?.into_iter().find(|p| p.name == name))
    }

    /// Projects assigned to `team`, in sheet order.
    pub async fn list_by_team(session: &SheetSession, team: &str) -> SheetResult<Vec<Project>> {
        Ok(Self::list(session)
            .await?
            .into_iter()
            .filter(|p| p.assigned_team == team)
            .collect())
    }

    /// Create a project in its initial phase with zero progress.
    pub async fn create(session: &SheetSession, input: NewProject) -> SheetResult<Project> {
        require_fields(&[
            ("Project name", input.name.as_str()),
            ("Description", input.description.as_str()),
            ("Assigned team", input.assigned_team.as_str()),
        ])?;
        if TeamRepo::find(session, &input.assigned_team).await?.is_none() {
            return Err(CoreError::not_found(Table::Teams.entity(), input.assigned_team.trim()).into());
        }

        let current = session.fresh_snapshot(Table::Projects).await?;
        if current.index().row_of(&RowKey::new([&input.name])).is_some() {
            return Err(CoreError::Conflict(format!(
                "A project named '{}' already exists",
                input.name.trim()
            ))
            .into());
        }

        let project = input.into_project(&now());
        let ws = session.worksheet(Table::Projects).await?;
        session
            .mutator(Table::Projects)
            .append(&project.to_values(&ws.headers))
            .await?;
        tracing::info!(project = %project.name, team = %project.assigned_team, "Project created");
        Ok(project)
    }

    pub async fn delete(session: &SheetSession, name: &str) -> SheetResult<()> {
        session
            .mutator(Table::Projects)
            .delete(&RowKey::new([name]))
            .await?;
        tracing::info!(project = name.trim(), "Project deleted");
        Ok(())
    }

    /// Record the current phase and overall progress of a project.
    pub async fn set_phase_and_progress(
        session: &SheetSession,
        name: &str,
        phase: SdlcPhase,
        progress: u8,
    ) -> SheetResult<()> {
        validate_progress(progress)?;
        // CurrentPhase and Progress are adjacent in the checked header row.
        session
            .mutator(Table::Projects)
            .update_cells(
                &RowKey::new([name]),
                COL_CURRENT_PHASE,
                &[phase.as_str().to_string(), progress.to_string()],
            )
            .await?;
        Ok(())
    }
}
