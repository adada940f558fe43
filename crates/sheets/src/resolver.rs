//! Worksheet Resolver.
//!
//! Maps a [`Table`] to its worksheet, creating it with the prescribed header
//! row when absent. Header-checked tables whose row 1 differs from the
//! prescription are reported as [`SheetError::HeaderMismatch`]; data is only
//! erased through the explicit [`WorksheetResolver::reset_headers`].

use std::collections::HashMap;

use cohort_core::error::CoreError;
use cohort_core::schema::Table;
use tokio::sync::Mutex;

use crate::backend::SheetBackend;
use crate::error::{SheetError, SheetResult};

/// A resolved worksheet and the header row it currently carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worksheet {
    pub table: Table,
    pub headers: Vec<String>,
}

impl Worksheet {
    pub fn name(&self) -> &'static str {
        self.table.sheet_name()
    }

    fn prescribed(table: Table) -> Self {
        Self {
            table,
            headers: prescribed_headers(table),
        }
    }
}

fn prescribed_headers(table: Table) -> Vec<String> {
    table.headers().iter().map(|h| h.to_string()).collect()
}

/// Trim cells and drop the empty tail the API leaves off or pads with.
fn normalize(mut headers: Vec<String>) -> Vec<String> {
    for h in headers.iter_mut() {
        *h = h.trim().to_string();
    }
    while headers.last().is_some_and(|h| h.is_empty()) {
        headers.pop();
    }
    headers
}

/// Per-session memo of resolved worksheets.
#[derive(Default)]
pub struct WorksheetResolver {
    resolved: Mutex<HashMap<Table, Worksheet>>,
}

impl WorksheetResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the worksheet for `table`, creating it if it does not exist.
    pub async fn resolve(&self, backend: &dyn SheetBackend, table: Table) -> SheetResult<Worksheet> {
        let mut resolved = self.resolved.lock().await;
        if let Some(ws) = resolved.get(&table) {
            return Ok(ws.clone());
        }

        let name = table.sheet_name();
        let exists = backend
            .worksheet_names()
            .await?
            .iter()
            .any(|n| n == name);

        let worksheet = if !exists {
            let ws = Worksheet::prescribed(table);
            backend.add_worksheet(name, ws.headers.len()).await?;
            backend.update_row(name, 1, &ws.headers).await?;
            tracing::info!(worksheet = name, "Created worksheet with prescribed headers");
            ws
        } else {
            let found = normalize(backend.header_row(name).await?);
            if found.is_empty() {
                let ws = Worksheet::prescribed(table);
                backend.update_row(name, 1, &ws.headers).await?;
                tracing::info!(worksheet = name, "Wrote headers into empty worksheet");
                ws
            } else if table.header_checked() && found != prescribed_headers(table) {
                tracing::warn!(
                    worksheet = name,
                    found = ?found,
                    "Worksheet headers differ from the expected layout"
                );
                return Err(SheetError::HeaderMismatch {
                    table,
                    expected: prescribed_headers(table),
                    found,
                });
            } else {
                Worksheet {
                    table,
                    headers: found,
                }
            }
        };

        resolved.insert(table, worksheet.clone());
        Ok(worksheet)
    }

    /// Clear the worksheet and rewrite its prescribed header row.
    ///
    /// Erases every data row, so `confirm` must be set. The participant sheet
    /// is never reset.
    pub async fn reset_headers(
        &self,
        backend: &dyn SheetBackend,
        table: Table,
        confirm: bool,
    ) -> SheetResult<Worksheet> {
        if !table.header_checked() {
            return Err(CoreError::Forbidden(format!(
                "Headers of {table} are managed by the signup form and cannot be reset"
            ))
            .into());
        }
        if !confirm {
            return Err(CoreError::Validation(format!(
                "Resetting headers erases every row of {table}; confirmation required"
            ))
            .into());
        }

        let mut resolved = self.resolved.lock().await;
        let name = table.sheet_name();
        let exists = backend
            .worksheet_names()
            .await?
            .iter()
            .any(|n| n == name);
        if exists {
            backend.clear(name).await?;
        } else {
            backend.add_worksheet(name, table.headers().len()).await?;
        }
        let ws = Worksheet::prescribed(table);
        backend.update_row(name, 1, &ws.headers).await?;
        tracing::warn!(worksheet = name, "Worksheet cleared and headers rewritten");

        resolved.insert(table, ws.clone());
        Ok(ws)
    }

    /// Make sure `column` exists in an unchecked worksheet, appending it on
    /// the right if missing.
    pub async fn ensure_column(
        &self,
        backend: &dyn SheetBackend,
        table: Table,
        column: &str,
    ) -> SheetResult<Worksheet> {
        let mut ws = self.resolve(backend, table).await?;
        if ws.headers.iter().any(|h| h == column) {
            return Ok(ws);
        }

        // Re-read row 1 in case another session already added it.
        let current = normalize(backend.header_row(ws.name()).await?);
        if current.iter().any(|h| h == column) {
            ws.headers = current;
        } else {
            backend.add_columns(ws.name(), 1).await?;
            backend
                .update_cells(ws.name(), 1, current.len() + 1, &[column.to_string()])
                .await?;
            tracing::info!(worksheet = ws.name(), column, "Added column");
            ws.headers = current;
            ws.headers.push(column.to_string());
        }

        self.resolved.lock().await.insert(table, ws.clone());
        Ok(ws)
    }
}
