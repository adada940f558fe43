//! Row Mutator.
//!
//! Writes address rows by key, never by a remembered position: each mutation
//! re-reads the table, builds a key index over that fresh snapshot and writes
//! to the row the key occupies now. Every write drops the session's cached
//! snapshots so the next read reflects it.

use cohort_core::error::CoreError;
use cohort_core::schema::Table;
use cohort_core::types::RowNumber;

use crate::error::{SheetError, SheetResult};
use crate::session::SheetSession;
use crate::snapshot::{RowKey, Snapshot};

pub struct RowMutator<'s> {
    session: &'s SheetSession,
    table: Table,
}

impl<'s> RowMutator<'s> {
    pub(crate) fn new(session: &'s SheetSession, table: Table) -> Self {
        Self { session, table }
    }

    /// Append one row. `values` must already be aligned to the worksheet's
    /// current headers.
    pub async fn append(&self, values: &[String]) -> SheetResult<()> {
        let ws = self.session.worksheet(self.table).await?;
        let result = self.session.backend().append_row(ws.name(), values).await;
        self.session.invalidate();
        result?;
        tracing::info!(table = %self.table, "Appended row");
        Ok(())
    }

    /// Overwrite the whole row identified by `key`.
    pub async fn update_row(&self, key: &RowKey, values: &[String]) -> SheetResult<RowNumber> {
        let (_, row) = self.locate(key).await?;
        let result = self
            .session
            .backend()
            .update_row(self.table.sheet_name(), row, values)
            .await;
        self.session.invalidate();
        result?;
        tracing::info!(table = %self.table, key = %key, row, "Updated row");
        Ok(row)
    }

    /// Overwrite consecutive cells of the row identified by `key`, starting
    /// at the column headed `first_column`.
    pub async fn update_cells(
        &self,
        key: &RowKey,
        first_column: &str,
        values: &[String],
    ) -> SheetResult<RowNumber> {
        let (snapshot, row) = self.locate(key).await?;
        let column = snapshot.column_index(first_column).ok_or_else(|| {
            CoreError::Validation(format!(
                "Column '{first_column}' is missing from {}",
                self.table
            ))
        })?;
        let result = self
            .session
            .backend()
            .update_cells(self.table.sheet_name(), row, column, values)
            .await;
        self.session.invalidate();
        result?;
        tracing::info!(
            table = %self.table,
            key = %key,
            row,
            column = first_column,
            "Updated cells"
        );
        Ok(row)
    }

    /// Delete the row identified by `key`.
    pub async fn delete(&self, key: &RowKey) -> SheetResult<RowNumber> {
        let (_, row) = self.locate(key).await?;
        self.delete_row(row, key).await
    }

    /// Delete the row at `position` of a snapshot the caller already holds.
    ///
    /// The table is re-read first; if the row at that position no longer
    /// carries the same key, nothing is written and [`SheetError::StaleRow`]
    /// is returned.
    pub async fn delete_at(&self, snapshot: &Snapshot, position: usize) -> SheetResult<RowNumber> {
        let key = snapshot.key_at(position).ok_or_else(|| {
            CoreError::not_found(self.table.entity(), format!("position {position}"))
        })?;
        let fresh = self.session.fresh_snapshot(self.table).await?;
        let row = Snapshot::row_number(position);
        if fresh.key_at(position).as_ref() != Some(&key) {
            return Err(SheetError::StaleRow {
                table: self.table,
                row,
            });
        }
        self.delete_row(row, &key).await
    }

    async fn delete_row(&self, row: RowNumber, key: &RowKey) -> SheetResult<RowNumber> {
        let result = self
            .session
            .backend()
            .delete_row(self.table.sheet_name(), row)
            .await;
        self.session.invalidate();
        result?;
        tracing::info!(table = %self.table, key = %key, row, "Deleted row");
        Ok(row)
    }

    /// Current remote row of `key`, with the snapshot it was found in.
    async fn locate(&self, key: &RowKey) -> SheetResult<(std::sync::Arc<Snapshot>, RowNumber)> {
        let snapshot = self.session.fresh_snapshot(self.table).await?;
        let row = snapshot
            .index()
            .row_of(key)
            .ok_or_else(|| CoreError::not_found(self.table.entity(), key.to_string()))?;
        Ok((snapshot, row))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;

    use super::*;
    use crate::backend::SheetBackend;
    use crate::cache::DEFAULT_TTL;
    use crate::memory::{MemoryBackend, Operation};

    fn teams_backend(names: &[&str]) -> Arc<MemoryBackend> {
        let mut rows = vec![vec!["TeamName", "Description"]];
        rows.extend(names.iter().map(|n| vec![*n, ""]));
        Arc::new(MemoryBackend::new().with_sheet("Teams", rows))
    }

    fn deletes(backend: &MemoryBackend) -> Vec<RowNumber> {
        backend
            .operations()
            .into_iter()
            .filter_map(|op| match op {
                Operation::DeleteRow { row, .. } => Some(row),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn delete_at_position_k_removes_remote_row_k_plus_2() {
        let backend = teams_backend(&["A", "B", "C", "D"]);
        let session = SheetSession::new(backend.clone(), DEFAULT_TTL);
        let snapshot = session.snapshot(Table::Teams).await.unwrap();

        let row = session
            .mutator(Table::Teams)
            .delete_at(&snapshot, 2)
            .await
            .unwrap();

        assert_eq!(row, 4);
        assert_eq!(deletes(&backend), vec![4]);
        let names: Vec<_> = backend
            .rows("Teams")
            .unwrap()
            .into_iter()
            .map(|r| r[0].clone())
            .collect();
        assert_eq!(names, vec!["TeamName", "A", "B", "D"]);
    }

    #[tokio::test]
    async fn delete_at_refuses_shifted_rows() {
        let backend = teams_backend(&["A", "B", "C"]);
        let session = SheetSession::new(backend.clone(), DEFAULT_TTL);
        let snapshot = session.snapshot(Table::Teams).await.unwrap();

        // Another session removes "A"; "C" now sits where "B" was.
        backend.delete_row("Teams", 2).await.unwrap();
        backend.clear_operations();

        let err = session
            .mutator(Table::Teams)
            .delete_at(&snapshot, 1)
            .await
            .unwrap_err();

        assert_matches!(err, SheetError::StaleRow { table: Table::Teams, row: 3 });
        assert!(deletes(&backend).is_empty());
    }

    #[tokio::test]
    async fn keyed_delete_follows_the_row() {
        let backend = teams_backend(&["A", "B", "C"]);
        let session = SheetSession::new(backend.clone(), DEFAULT_TTL);
        session.snapshot(Table::Teams).await.unwrap();

        backend.delete_row("Teams", 2).await.unwrap();
        backend.clear_operations();

        session
            .mutator(Table::Teams)
            .delete(&RowKey::new(["C"]))
            .await
            .unwrap();

        assert_eq!(deletes(&backend), vec![3]);
        assert_eq!(backend.rows("Teams").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn writes_invalidate_the_cache() {
        let backend = teams_backend(&["A"]);
        let session = SheetSession::new(backend.clone(), DEFAULT_TTL);
        assert_eq!(session.snapshot(Table::Teams).await.unwrap().len(), 1);

        session
            .mutator(Table::Teams)
            .append(&["B".to_string(), "second".to_string()])
            .await
            .unwrap();

        let after = session.snapshot(Table::Teams).await.unwrap();
        assert_eq!(after.len(), 2);
        assert_eq!(after.records[1]["Description"], "second");
    }

    #[tokio::test]
    async fn update_cells_targets_named_column() {
        let backend = teams_backend(&["A", "B"]);
        let session = SheetSession::new(backend.clone(), DEFAULT_TTL);

        session
            .mutator(Table::Teams)
            .update_cells(&RowKey::new(["B"]), "Description", &["bee".to_string()])
            .await
            .unwrap();

        assert!(backend.operations().contains(&Operation::UpdateCells {
            name: "Teams".into(),
            row: 3,
            first_column: 2,
            values: vec!["bee".into()],
        }));
    }

    #[tokio::test]
    async fn unknown_key_is_not_found() {
        let backend = teams_backend(&["A"]);
        let session = SheetSession::new(backend, DEFAULT_TTL);

        assert_matches!(
            session
                .mutator(Table::Teams)
                .update_row(&RowKey::new(["Z"]), &[])
                .await,
            Err(SheetError::Core(CoreError::NotFound { entity: "Team", .. }))
        );
    }
}
