//! Repository for the participant worksheet.
//!
//! The sheet is shared with the signup form, so its header row is taken as
//! found. Columns the portal writes (`Team`, `PasswordHash`) are appended on
//! first use when missing.

use cohort_core::error::CoreError;
use cohort_core::models::{NewParticipant, Participant};
use cohort_core::schema::{Table, COL_PASSWORD_HASH, COL_TEAM};
use cohort_core::types::Record;
use cohort_core::validation::{require_fields, validate_email};

use crate::error::SheetResult;
use crate::repositories::TeamRepo;
use crate::session::SheetSession;
use crate::snapshot::RowKey;

pub struct ParticipantRepo;

impl ParticipantRepo {
    /// Every participant with a non-blank email, in sheet order.
    pub async fn list(session: &SheetSession) -> SheetResult<Vec<Participant>> {
        let snapshot = session.snapshot(Table::Participants).await?;
        Ok(snapshot
            .records
            .iter()
            .map(Participant::from_record)
            .filter(|p| !p.email.is_empty())
            .collect())
    }

    pub async fn find_by_email(
        session: &SheetSession,
        email: &str,
    ) -> SheetResult<Option<Participant>> {
        let email = email.trim();
        Ok(Self::list(session)
            .await?
            .into_iter()
            .find(|p| p.email == email))
    }

    /// Members of `team`.
    pub async fn list_by_team(session: &SheetSession, team: &str) -> SheetResult<Vec<Participant>> {
        Ok(Self::list(session)
            .await?
            .into_iter()
            .filter(|p| p.is_on_team(team))
            .collect())
    }

    /// Append a signup with status `Pending`. Emails must be unique.
    pub async fn signup(session: &SheetSession, form: &NewParticipant) -> SheetResult<Participant> {
        require_fields(&[("Full Name", form.name.as_str()), ("Email", form.email.as_str())])?;
        validate_email(&form.email)?;

        let current = session.fresh_snapshot(Table::Participants).await?;
        let key = RowKey::new([&form.email]);
        if current.index().row_of(&key).is_some() {
            return Err(CoreError::Conflict(format!(
                "'{}' has already signed up",
                form.email.trim()
            ))
            .into());
        }

        let ws = session.worksheet(Table::Participants).await?;
        let values = form.to_values(&ws.headers);
        session.mutator(Table::Participants).append(&values).await?;

        let record: Record = ws.headers.iter().cloned().zip(values).collect();
        Ok(Participant::from_record(&record))
    }

    /// Set the team of the participant with `email`. The team must exist.
    pub async fn assign_team(session: &SheetSession, email: &str, team: &str) -> SheetResult<()> {
        if TeamRepo::find(session, team).await?.is_none() {
            return Err(CoreError::not_found(Table::Teams.entity(), team.trim()).into());
        }
        Self::require_row(session, email).await?;
        session.ensure_column(Table::Participants, COL_TEAM).await?;
        session
            .mutator(Table::Participants)
            .update_cells(&RowKey::new([email]), COL_TEAM, &[team.trim().to_string()])
            .await?;
        tracing::info!(email = email.trim(), team = team.trim(), "Participant assigned to team");
        Ok(())
    }

    /// Clear the team cell of every member of `team`; returns their emails.
    pub async fn clear_team(session: &SheetSession, team: &str) -> SheetResult<Vec<String>> {
        let members: Vec<String> = session
            .fresh_snapshot(Table::Participants)
            .await?
            .records
            .iter()
            .map(Participant::from_record)
            .filter(|p| !p.email.is_empty() && p.is_on_team(team))
            .map(|p| p.email)
            .collect();

        let mutator = session.mutator(Table::Participants);
        for email in &members {
            mutator
                .update_cells(&RowKey::new([email]), COL_TEAM, &[String::new()])
                .await?;
        }
        Ok(members)
    }

    /// Store a new password hash for the participant with `email`.
    pub async fn set_password_hash(
        session: &SheetSession,
        email: &str,
        password_hash: &str,
    ) -> SheetResult<()> {
        Self::require_row(session, email).await?;
        session
            .ensure_column(Table::Participants, COL_PASSWORD_HASH)
            .await?;
        session
            .mutator(Table::Participants)
            .update_cells(
                &RowKey::new([email]),
                COL_PASSWORD_HASH,
                &[password_hash.to_string()],
            )
            .await?;
        tracing::info!(email = email.trim(), "Participant password updated");
        Ok(())
    }

    /// NotFound unless a fresh read holds a row for `email`. Runs before any
    /// column is added, so a bad address never changes the header row.
    async fn require_row(session: &SheetSession, email: &str) -> SheetResult<()> {
        let current = session.fresh_snapshot(Table::Participants).await?;
        if current.index().row_of(&RowKey::new([email])).is_none() {
            return Err(CoreError::not_found(Table::Participants.entity(), email.trim()).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use cohort_core::schema::PARTICIPANT_HEADERS;

    use super::*;
    use crate::cache::DEFAULT_TTL;
    use crate::error::SheetError;
    use crate::memory::MemoryBackend;

    fn session(backend: &Arc<MemoryBackend>) -> SheetSession {
        SheetSession::new(backend.clone(), DEFAULT_TTL)
    }

    fn ada() -> NewParticipant {
        NewParticipant {
            name: "Ada".into(),
            email: "ada@x.com".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn signup_creates_sheet_and_appends_pending_row() {
        let backend = Arc::new(MemoryBackend::new());
        let s = session(&backend);

        let p = ParticipantRepo::signup(&s, &ada()).await.unwrap();

        assert_eq!(p.status, "Pending");
        let rows = backend.rows("Participants_list").unwrap();
        assert_eq!(rows[0].len(), PARTICIPANT_HEADERS.len());
        assert_eq!(rows[1][0], "Ada");
        assert_eq!(rows[1].last().map(String::as_str), Some("Pending"));
    }

    #[tokio::test]
    async fn duplicate_signup_is_a_conflict() {
        let backend = Arc::new(MemoryBackend::new());
        let s = session(&backend);
        ParticipantRepo::signup(&s, &ada()).await.unwrap();

        assert_matches!(
            ParticipantRepo::signup(&s, &ada()).await,
            Err(SheetError::Core(CoreError::Conflict(_)))
        );
    }

    #[tokio::test]
    async fn signup_validates_email() {
        let backend = Arc::new(MemoryBackend::new());
        let form = NewParticipant {
            email: "nope".into(),
            ..ada()
        };
        assert_matches!(
            ParticipantRepo::signup(&session(&backend), &form).await,
            Err(SheetError::Core(CoreError::Validation(_)))
        );
        assert!(backend.rows("Participants_list").is_none());
    }

    #[tokio::test]
    async fn assign_team_adds_missing_team_column() {
        let backend = Arc::new(
            MemoryBackend::new()
                .with_sheet("Teams", vec![vec!["TeamName", "Description"], vec!["Team1", "x"]])
                .with_sheet(
                    "Participants_list",
                    vec![vec!["Name", "Email", "Status"], vec!["Ada", "ada@x.com", "Pending"]],
                ),
        );
        let s = session(&backend);

        ParticipantRepo::assign_team(&s, "ada@x.com", "Team1")
            .await
            .unwrap();

        let rows = backend.rows("Participants_list").unwrap();
        assert_eq!(rows[0][3], "Team");
        assert_eq!(rows[1][3], "Team1");
        let ada = ParticipantRepo::find_by_email(&s, "ada@x.com")
            .await
            .unwrap()
            .unwrap();
        assert!(ada.is_on_team("Team1"));
    }

    #[tokio::test]
    async fn assign_to_unknown_team_is_rejected() {
        let backend = Arc::new(
            MemoryBackend::new()
                .with_sheet("Teams", vec![vec!["TeamName", "Description"]])
                .with_sheet(
                    "Participants_list",
                    vec![vec!["Name", "Email", "Team"], vec!["Ada", "ada@x.com", ""]],
                ),
        );
        assert_matches!(
            ParticipantRepo::assign_team(&session(&backend), "ada@x.com", "Ghost").await,
            Err(SheetError::Core(CoreError::NotFound { entity: "Team", .. }))
        );
    }

    #[tokio::test]
    async fn password_hash_written_to_its_column() {
        let backend = Arc::new(MemoryBackend::new().with_sheet(
            "Participants_list",
            vec![
                vec!["Name", "Email", "Team"],
                vec!["Bob", "bob@x.com", ""],
                vec!["Ada", "ada@x.com", "Team1"],
            ],
        ));
        let s = session(&backend);

        ParticipantRepo::set_password_hash(&s, "ada@x.com", "$argon2id$hash")
            .await
            .unwrap();

        let rows = backend.rows("Participants_list").unwrap();
        assert_eq!(rows[0][3], "PasswordHash");
        assert_eq!(rows[2][3], "$argon2id$hash");
        assert_eq!(rows[2][2], "Team1");
        assert!(rows[1].get(3).map_or(true, |c| c.is_empty()));
    }

    #[tokio::test]
    async fn unknown_email_leaves_header_row_alone() {
        let backend = Arc::new(
            MemoryBackend::new()
                .with_sheet("Teams", vec![vec!["TeamName", "Description"], vec!["Team1", "x"]])
                .with_sheet(
                    "Participants_list",
                    vec![vec!["Name", "Email"], vec!["Ada", "ada@x.com"]],
                ),
        );
        let s = session(&backend);

        assert_matches!(
            ParticipantRepo::set_password_hash(&s, "ghost@x.com", "h").await,
            Err(SheetError::Core(CoreError::NotFound { entity: "Participant", .. }))
        );
        assert_matches!(
            ParticipantRepo::assign_team(&s, "ghost@x.com", "Team1").await,
            Err(SheetError::Core(CoreError::NotFound { entity: "Participant", .. }))
        );

        let rows = backend.rows("Participants_list").unwrap();
        assert_eq!(rows[0], vec!["Name".to_string(), "Email".to_string()]);
    }
}
