//! Repository for the `ProjectProgress` worksheet.

use cohort_core::models::PhaseProgress;
use cohort_core::schema::Table;

use crate::error::SheetResult;
use crate::session::SheetSession;
use crate::snapshot::RowKey;

pub struct ProgressRepo;

impl ProgressRepo {
    /// Phase records of `project`, ordered by phase. Unreadable rows are
    /// skipped with a warning.
    pub async fn list_for_project(
        session: &SheetSession,
        project: &str,
    ) -> SheetResult<Vec<PhaseProgress>> {
        let snapshot = session.snapshot(Table::ProjectProgress).await?;
        let project = project.trim();
        let mut entries: Vec<PhaseProgress> = snapshot
            .records
            .iter()
            .filter_map(|record| match PhaseProgress::from_record(record) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable progress row");
                    None
                }
            })
            .filter(|entry| entry.project == project)
            .collect();
        entries.sort_by_key(|entry| entry.phase);
        Ok(entries)
    }

    /// Overwrite the record for `(project, phase)` or append one.
    ///
    /// Returns `true` when a new row was appended.
    pub async fn upsert(session: &SheetSession, entry: &PhaseProgress) -> SheetResult<bool> {
        let ws = session.worksheet(Table::ProjectProgress).await?;
        let values = entry.to_values(&ws.headers);
        let key = RowKey::new([entry.project.as_str(), entry.phase.as_str()]);

        let current = session.fresh_snapshot(Table::ProjectProgress).await?;
        let mutator = session.mutator(Table::ProjectProgress);
        if current.index().row_of(&key).is_some() {
            mutator.update_row(&key, &values).await?;
            Ok(false)
        } else {
            mutator.append(&values).await?;
            Ok(true)
        }
    }
}
