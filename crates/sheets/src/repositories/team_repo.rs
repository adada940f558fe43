//! Repository for the `Teams` worksheet.

use cohort_core::error::CoreError;
use cohort_core::models::Team;
use cohort_core::schema::Table;
use cohort_core::validation::require_fields;

use crate::error::SheetResult;
use crate::repositories::ParticipantRepo;
use crate::session::SheetSession;
use crate::snapshot::RowKey;

pub struct TeamRepo;

impl TeamRepo {
    /// All teams in sheet order. Rows with a blank name are skipped.
    pub async fn list(session: &SheetSession) -> SheetResult<Vec<Team>> {
        let snapshot = session.snapshot(Table::Teams).await?;
        Ok(snapshot
            .records
            .iter()
            .map(Team::from_record)
            .filter(|t| !t.name.is_empty())
            .collect())
    }

    pub async fn find(session: &SheetSession, name: &str) -> SheetResult<Option<Team>> {
        let name = name.trim();
        Ok(Self::list(session).await?.into_iter().find(|t| t.name == name))
    }

    /// Create a team. Names must be unique.
    pub async fn create(session: &SheetSession, name: &str, description: &str) -> SheetResult<Team> {
        require_fields(&[("Team name", name), ("Description", description)])?;
        let team = Team {
            name: name.trim().to_string(),
            description: description.trim().to_string(),
        };

        let current = session.fresh_snapshot(Table::Teams).await?;
        if current.index().row_of(&RowKey::new([&team.name])).is_some() {
            return Err(CoreError::Conflict(format!(
                "A team named '{}' already exists",
                team.name
            ))
            .into());
        }

        let ws = session.worksheet(Table::Teams).await?;
        session
            .mutator(Table::Teams)
            .append(&team.to_values(&ws.headers))
            .await?;
        Ok(team)
    }

    /// Delete a team, first clearing the team cell of every member.
    ///
    /// Returns the emails of the participants that were unassigned.
    pub async fn delete(session: &SheetSession, name: &str) -> SheetResult<Vec<String>> {
        let key = RowKey::new([name]);
        let current = session.fresh_snapshot(Table::Teams).await?;
        if current.index().row_of(&key).is_none() {
            return Err(CoreError::not_found(Table::Teams.entity(), name.trim()).into());
        }

        let unassigned = ParticipantRepo::clear_team(session, name.trim()).await?;
        session.mutator(Table::Teams).delete(&key).await?;
        tracing::info!(team = name.trim(), members = unassigned.len(), "Team deleted");
        Ok(unassigned)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;

    use super::*;
    use crate::cache::DEFAULT_TTL;
    use crate::error::SheetError;
    use crate::memory::MemoryBackend;

    fn session(backend: &Arc<MemoryBackend>) -> SheetSession {
        SheetSession::new(backend.clone(), DEFAULT_TTL)
    }

    #[tokio::test]
    async fn create_rejects_duplicates() {
        let backend = Arc::new(MemoryBackend::new());
        let s = session(&backend);

        TeamRepo::create(&s, "Team1", "First").await.unwrap();
        assert_matches!(
            TeamRepo::create(&s, " Team1 ", "Again").await,
            Err(SheetError::Core(CoreError::Conflict(_)))
        );
        assert_eq!(TeamRepo::list(&s).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_requires_description() {
        let backend = Arc::new(MemoryBackend::new());
        assert_matches!(
            TeamRepo::create(&session(&backend), "Team1", "").await,
            Err(SheetError::Core(CoreError::Validation(_)))
        );
    }

    #[tokio::test]
    async fn delete_unassigns_members_first() {
        let backend = Arc::new(
            MemoryBackend::new()
                .with_sheet(
                    "Teams",
                    vec![vec!["TeamName", "Description"], vec!["Team1", "a"], vec!["Team2", "b"]],
                )
                .with_sheet(
                    "Participants_list",
                    vec![
                        vec!["Name", "Email", "Team"],
                        vec!["Ada", "ada@x.com", "Team1"],
                        vec!["Bob", "bob@x.com", "Team2"],
                    ],
                ),
        );
        let s = session(&backend);

        let unassigned = TeamRepo::delete(&s, "Team1").await.unwrap();

        assert_eq!(unassigned, vec!["ada@x.com"]);
        let people = backend.rows("Participants_list").unwrap();
        assert_eq!(people[1][2], "");
        assert_eq!(people[2][2], "Team2");
        let teams: Vec<_> = TeamRepo::list(&s).await.unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(teams, vec!["Team2"]);
    }

    #[tokio::test]
    async fn delete_unknown_team_is_not_found() {
        let backend = Arc::new(MemoryBackend::new());
        assert_matches!(
            TeamRepo::delete(&session(&backend), "Ghost").await,
            Err(SheetError::Core(CoreError::NotFound { entity: "Team", .. }))
        );
    }
}
