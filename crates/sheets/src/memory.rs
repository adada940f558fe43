//! In-process spreadsheet backend.
//!
//! Holds worksheets as plain vectors and records the calls it receives, so
//! tests can assert exactly which remote operations a flow issued. The log
//! keeps the latest [`OPERATION_LOG_LIMIT`] calls. Read failures can be queued
//! and writes to chosen rows made to fail, to exercise the error paths. Also
//! used for local runs without Google credentials (`SHEETS_BACKEND=memory`).

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use cohort_core::types::RowNumber;
use indexmap::IndexMap;

use crate::backend::SheetBackend;
use crate::error::{SheetError, SheetResult};

/// Most recent calls kept in the operation log.
pub const OPERATION_LOG_LIMIT: usize = 1024;

/// A call received by [`MemoryBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    ListWorksheets,
    AddWorksheet { name: String, columns: usize },
    ReadAll { name: String },
    HeaderRow { name: String },
    Append { name: String, values: Vec<String> },
    UpdateCells {
        name: String,
        row: RowNumber,
        first_column: usize,
        values: Vec<String>,
    },
    DeleteRow { name: String, row: RowNumber },
    Clear { name: String },
    AddColumns { name: String, count: usize },
}

/// Failure to inject into a backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedFailure {
    RateLimited,
    Unavailable,
}

impl InjectedFailure {
    fn into_error(self) -> SheetError {
        match self {
            InjectedFailure::RateLimited => SheetError::RateLimited,
            InjectedFailure::Unavailable => SheetError::Api {
                status: 503,
                message: "The service is currently unavailable".into(),
            },
        }
    }
}

#[derive(Default)]
struct MemoryState {
    sheets: IndexMap<String, Vec<Vec<String>>>,
    operations: VecDeque<Operation>,
    read_failures: VecDeque<InjectedFailure>,
    write_failures: Vec<(String, RowNumber, InjectedFailure)>,
}

#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a worksheet with rows (header row first).
    pub fn with_sheet(self, name: &str, rows: Vec<Vec<&str>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|r| r.into_iter().map(str::to_string).collect())
            .collect();
        self.lock().sheets.insert(name.to_string(), rows);
        self
    }

    /// Current rows of a worksheet, header row first.
    pub fn rows(&self, name: &str) -> Option<Vec<Vec<String>>> {
        self.lock().sheets.get(name).cloned()
    }

    /// The logged calls, oldest first.
    pub fn operations(&self) -> Vec<Operation> {
        self.lock().operations.iter().cloned().collect()
    }

    pub fn clear_operations(&self) {
        self.lock().operations.clear();
    }

    /// Number of `read_all` calls made against `name`.
    pub fn read_count(&self, name: &str) -> usize {
        self.lock()
            .operations
            .iter()
            .filter(|op| matches!(op, Operation::ReadAll { name: n } if n == name))
            .count()
    }

    /// Make the next `read_all` call fail with `failure`.
    pub fn fail_next_read(&self, failure: InjectedFailure) {
        self.lock().read_failures.push_back(failure);
    }

    /// Make every `update_cells` call on `row` of `name` fail with `failure`.
    pub fn fail_writes_to_row(&self, name: &str, row: RowNumber, failure: InjectedFailure) {
        self.lock()
            .write_failures
            .push((name.to_string(), row, failure));
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl MemoryState {
    fn record(&mut self, op: Operation) {
        if self.operations.len() == OPERATION_LOG_LIMIT {
            self.operations.pop_front();
        }
        self.operations.push_back(op);
    }

    fn sheet_mut(&mut self, name: &str) -> SheetResult<&mut Vec<Vec<String>>> {
        self.sheets
            .get_mut(name)
            .ok_or_else(|| SheetError::WorksheetNotFound(name.to_string()))
    }

    fn sheet(&self, name: &str) -> SheetResult<&Vec<Vec<String>>> {
        self.sheets
            .get(name)
            .ok_or_else(|| SheetError::WorksheetNotFound(name.to_string()))
    }
}

#[async_trait]
impl SheetBackend for MemoryBackend {
    async fn worksheet_names(&self) -> SheetResult<Vec<String>> {
        let mut state = self.lock();
        state.record(Operation::ListWorksheets);
        Ok(state.sheets.keys().cloned().collect())
    }

    async fn add_worksheet(&self, name: &str, columns: usize) -> SheetResult<()> {
        let mut state = self.lock();
        state.record(Operation::AddWorksheet {
            name: name.to_string(),
            columns,
        });
        if state.sheets.contains_key(name) {
            return Err(SheetError::Api {
                status: 400,
                message: format!("A sheet with the name \"{name}\" already exists"),
            });
        }
        state.sheets.insert(name.to_string(), Vec::new());
        Ok(())
    }

    async fn read_all(&self, name: &str) -> SheetResult<Vec<Vec<String>>> {
        let mut state = self.lock();
        state.record(Operation::ReadAll {
            name: name.to_string(),
        });
        if let Some(failure) = state.read_failures.pop_front() {
            return Err(failure.into_error());
        }
        state.sheet(name).cloned()
    }

    async fn header_row(&self, name: &str) -> SheetResult<Vec<String>> {
        let mut state = self.lock();
        state.record(Operation::HeaderRow {
            name: name.to_string(),
        });
        Ok(state.sheet(name)?.first().cloned().unwrap_or_default())
    }

    async fn append_row(&self, name: &str, values: &[String]) -> SheetResult<()> {
        let mut state = self.lock();
        state.record(Operation::Append {
            name: name.to_string(),
            values: values.to_vec(),
        });
        let sheet = state.sheet_mut(name)?;
        while sheet
            .last()
            .is_some_and(|row| row.iter().all(|c| c.is_empty()))
        {
            sheet.pop();
        }
        sheet.push(values.to_vec());
        Ok(())
    }

    async fn update_cells(
        &self,
        name: &str,
        row: RowNumber,
        first_column: usize,
        values: &[String],
    ) -> SheetResult<()> {
        let mut state = self.lock();
        state.record(Operation::UpdateCells {
            name: name.to_string(),
            row,
            first_column,
            values: values.to_vec(),
        });
        let injected = state
            .write_failures
            .iter()
            .find(|(n, r, _)| n == name && *r == row)
            .map(|(_, _, failure)| *failure);
        if let Some(failure) = injected {
            return Err(failure.into_error());
        }
        if row == 0 || first_column == 0 {
            return Err(SheetError::Api {
                status: 400,
                message: "Rows and columns are 1-based".into(),
            });
        }
        let sheet = state.sheet_mut(name)?;
        if sheet.len() < row {
            sheet.resize(row, Vec::new());
        }
        let target = &mut sheet[row - 1];
        let end = first_column - 1 + values.len();
        if target.len() < end {
            target.resize(end, String::new());
        }
        target[first_column - 1..end].clone_from_slice(values);
        Ok(())
    }

    async fn delete_row(&self, name: &str, row: RowNumber) -> SheetResult<()> {
        let mut state = self.lock();
        state.record(Operation::DeleteRow {
            name: name.to_string(),
            row,
        });
        let sheet = state.sheet_mut(name)?;
        if row == 0 || row > sheet.len() {
            return Err(SheetError::Api {
                status: 400,
                message: format!("Row {row} is out of range"),
            });
        }
        sheet.remove(row - 1);
        Ok(())
    }

    async fn clear(&self, name: &str) -> SheetResult<()> {
        let mut state = self.lock();
        state.record(Operation::Clear {
            name: name.to_string(),
        });
        state.sheet_mut(name)?.clear();
        Ok(())
    }

    async fn add_columns(&self, name: &str, count: usize) -> SheetResult<()> {
        let mut state = self.lock();
        state.record(Operation::AddColumns {
            name: name.to_string(),
            count,
        });
        state.sheet_mut(name)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn update_cells_pads_short_rows() {
        let backend = MemoryBackend::new().with_sheet("T", vec![vec!["A", "B", "C"], vec!["1"]]);
        backend
            .update_cells("T", 2, 3, &strings(&["x"]))
            .await
            .unwrap();
        assert_eq!(backend.rows("T").unwrap()[1], strings(&["1", "", "x"]));
    }

    #[tokio::test]
    async fn delete_row_shifts_rows_up() {
        let backend =
            MemoryBackend::new().with_sheet("T", vec![vec!["H"], vec!["a"], vec!["b"], vec!["c"]]);
        backend.delete_row("T", 3).await.unwrap();
        assert_eq!(
            backend.rows("T").unwrap(),
            vec![strings(&["H"]), strings(&["a"]), strings(&["c"])]
        );
        assert_matches!(
            backend.delete_row("T", 9).await,
            Err(SheetError::Api { status: 400, .. })
        );
    }

    #[tokio::test]
    async fn injected_failures_apply_once() {
        let backend = MemoryBackend::new().with_sheet("T", vec![vec!["H"]]);
        backend.fail_next_read(InjectedFailure::RateLimited);
        assert_matches!(backend.read_all("T").await, Err(SheetError::RateLimited));
        assert!(backend.read_all("T").await.is_ok());
        assert_eq!(backend.read_count("T"), 2);
    }

    #[tokio::test]
    async fn injected_write_failures_hit_only_their_row() {
        let backend = MemoryBackend::new().with_sheet("T", vec![vec!["H"], vec!["a"], vec!["b"]]);
        backend.fail_writes_to_row("T", 3, InjectedFailure::Unavailable);

        backend.update_cells("T", 2, 1, &strings(&["x"])).await.unwrap();
        assert_matches!(
            backend.update_cells("T", 3, 1, &strings(&["y"])).await,
            Err(SheetError::Api { status: 503, .. })
        );
        assert_eq!(
            backend.rows("T").unwrap(),
            vec![strings(&["H"]), strings(&["x"]), strings(&["b"])]
        );
    }

    #[tokio::test]
    async fn operation_log_keeps_only_the_latest_calls() {
        let backend = MemoryBackend::new().with_sheet("T", vec![vec!["H"]]);
        for _ in 0..OPERATION_LOG_LIMIT + 10 {
            backend.read_all("T").await.unwrap();
        }
        backend.header_row("T").await.unwrap();

        let operations = backend.operations();
        assert_eq!(operations.len(), OPERATION_LOG_LIMIT);
        assert_eq!(
            operations.last(),
            Some(&Operation::HeaderRow { name: "T".into() })
        );
    }

    #[tokio::test]
    async fn missing_worksheet_is_reported() {
        let backend = MemoryBackend::new();
        assert_matches!(
            backend.read_all("Nope").await,
            Err(SheetError::WorksheetNotFound(name)) if name == "Nope"
        );
    }
}
