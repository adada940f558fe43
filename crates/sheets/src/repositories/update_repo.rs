//! Repository for the `Updates` worksheet.

use std::cmp::Reverse;

use cohort_core::error::CoreError;
use cohort_core::models::Update;
use cohort_core::phase::SdlcPhase;
use cohort_core::schema::Table;
use cohort_core::types::{format_timestamp, now};

use crate::error::SheetResult;
use crate::session::SheetSession;
use crate::snapshot::RowKey;

pub struct UpdateRepo;

impl UpdateRepo {
    /// Updates newest first, optionally limited to one team. Rows with an
    /// unreadable timestamp sort last.
    pub async fn list(session: &SheetSession, team: Option<&str>) -> SheetResult<Vec<Update>> {
        let snapshot = session.snapshot(Table::Updates).await?;
        let mut updates: Vec<Update> = snapshot
            .records
            .iter()
            .map(Update::from_record)
            .filter(|u| !u.id.is_empty())
            .filter(|u| team.map_or(true, |t| u.team == t))
            .collect();
        updates.sort_by_key(|u| Reverse(u.posted_at()));
        Ok(updates)
    }

    pub async fn find(session: &SheetSession, id: &str) -> SheetResult<Option<Update>> {
        let snapshot = session.snapshot(Table::Updates).await?;
        Ok(snapshot
            .find(&RowKey::new([id]))
            .map(|(_, record)| Update::from_record(record)))
    }

    /// Distinct team names that have posted, sorted.
    pub async fn teams(session: &SheetSession) -> SheetResult<Vec<String>> {
        let mut teams: Vec<String> = Self::list(session, None)
            .await?
            .into_iter()
            .map(|u| u.team)
            .filter(|t| !t.is_empty())
            .collect();
        teams.sort();
        teams.dedup();
        Ok(teams)
    }

    /// Post an update on behalf of `email`, a member of `team`.
    pub async fn create(
        session: &SheetSession,
        team: &str,
        email: &str,
        text: &str,
        phase: Option<SdlcPhase>,
    ) -> SheetResult<Update> {
        if text.trim().is_empty() {
            return Err(CoreError::Validation("Please enter an update before submitting".into()).into());
        }
        let posted = now();
        let update = Update {
            id: Update::new_id(&posted, email),
            timestamp: format_timestamp(&posted),
            team: team.to_string(),
            email: email.to_string(),
            text: text.trim().to_string(),
            phase,
        };

        let current = session.fresh_snapshot(Table::Updates).await?;
        if current.index().row_of(&RowKey::new([&update.id])).is_some() {
            return Err(CoreError::Conflict(
                "An update was already posted this second; try again".into(),
            )
            .into());
        }

        let ws = session.worksheet(Table::Updates).await?;
        session
            .mutator(Table::Updates)
            .append(&update.to_values(&ws.headers))
            .await?;
        tracing::info!(update_id = %update.id, team, "Update posted");
        Ok(update)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cache::DEFAULT_TTL;
    use crate::memory::MemoryBackend;

    fn feed() -> Arc<MemoryBackend> {
        Arc::new(MemoryBackend::new().with_sheet(
            "Updates",
            vec![
                vec!["UpdateID", "Timestamp", "Team", "Email", "Update", "Phase"],
                vec!["u1", "2026-01-01 09:00:00", "Team1", "a@x.com", "first", ""],
                vec!["u2", "2026-01-03 09:00:00", "Team2", "b@x.com", "third", "Design"],
                vec!["u3", "2026-01-02 09:00:00", "Team1", "a@x.com", "second", ""],
                vec!["u4", "garbled", "Team1", "a@x.com", "unknown time", ""],
            ],
        ))
    }

    #[tokio::test]
    async fn newest_first_with_team_filter() {
        let s = SheetSession::new(feed(), DEFAULT_TTL);

        let all: Vec<_> = UpdateRepo::list(&s, None)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(all, vec!["u2", "u3", "u1", "u4"]);

        let team1: Vec<_> = UpdateRepo::list(&s, Some("Team1"))
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(team1, vec!["u3", "u1", "u4"]);

        assert_eq!(UpdateRepo::teams(&s).await.unwrap(), vec!["Team1", "Team2"]);
    }

    #[tokio::test]
    async fn find_by_id() {
        let s = SheetSession::new(feed(), DEFAULT_TTL);
        let u = UpdateRepo::find(&s, "u2").await.unwrap().unwrap();
        assert_eq!(u.phase, Some(SdlcPhase::Design));
        assert!(UpdateRepo::find(&s, "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_appends_row_with_generated_id() {
        let backend = Arc::new(MemoryBackend::new());
        let s = SheetSession::new(backend.clone(), DEFAULT_TTL);

        let update = UpdateRepo::create(&s, "Team1", "ada@x.com", " Done! ", None)
            .await
            .unwrap();

        assert!(update.id.starts_with("upd_"));
        assert!(update.id.ends_with("_ada@x.com"));
        let rows = backend.rows("Updates").unwrap();
        assert_eq!(rows[1][0], update.id);
        assert_eq!(rows[1][4], "Done!");
        assert!(UpdateRepo::create(&s, "Team1", "ada@x.com", "  ", None)
            .await
            .is_err());
    }
}
