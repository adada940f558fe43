//! The remote row-store contract.
//!
//! A backend exposes named worksheets of string cells. Rows are addressed
//! 1-based and row 1 is reserved for the header row, so data row `n` of a
//! snapshot (0-based) lives at remote row `n + 2`.

use async_trait::async_trait;
use cohort_core::types::RowNumber;

use crate::error::SheetResult;

/// Operations the portal needs from a spreadsheet service.
#[async_trait]
pub trait SheetBackend: Send + Sync {
    /// Titles of every worksheet in the spreadsheet.
    async fn worksheet_names(&self) -> SheetResult<Vec<String>>;

    /// Create an empty worksheet sized for `columns` columns.
    async fn add_worksheet(&self, name: &str, columns: usize) -> SheetResult<()>;

    /// Every row of the worksheet including the header row.
    async fn read_all(&self, name: &str) -> SheetResult<Vec<Vec<String>>>;

    /// Values of row 1; empty when the worksheet has no rows.
    async fn header_row(&self, name: &str) -> SheetResult<Vec<String>>;

    /// Append one row after the last non-empty row.
    async fn append_row(&self, name: &str, values: &[String]) -> SheetResult<()>;

    /// Overwrite cells of `row` starting at 1-based column `first_column`.
    async fn update_cells(
        &self,
        name: &str,
        row: RowNumber,
        first_column: usize,
        values: &[String],
    ) -> SheetResult<()>;

    /// Remove `row`, shifting every row below it up by one.
    async fn delete_row(&self, name: &str, row: RowNumber) -> SheetResult<()>;

    /// Erase every cell of the worksheet.
    async fn clear(&self, name: &str) -> SheetResult<()>;

    /// Grow the worksheet by `count` columns on the right.
    async fn add_columns(&self, name: &str, count: usize) -> SheetResult<()>;

    /// Overwrite a full row starting at column A.
    async fn update_row(&self, name: &str, row: RowNumber, values: &[String]) -> SheetResult<()> {
        self.update_cells(name, row, 1, values).await
    }
}

/// A1-notation letters for a 1-based column index (`1 -> A`, `27 -> AA`).
pub fn column_letter(column: usize) -> String {
    let mut n = column.max(1);
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}
