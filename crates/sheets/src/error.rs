use cohort_core::error::CoreError;
use cohort_core::schema::Table;
use cohort_core::types::RowNumber;

/// Error type for every spreadsheet operation.
#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    /// The backend refused the call because the request quota is exhausted.
    #[error("Spreadsheet API quota exceeded")]
    RateLimited,

    /// No worksheet with this title exists.
    #[error("Worksheet not found: {0}")]
    WorksheetNotFound(String),

    /// Row 1 of a checked worksheet differs from its prescribed headers.
    #[error("Header mismatch in {table}: expected {expected:?}, found {found:?}")]
    HeaderMismatch {
        table: Table,
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// The row addressed by a snapshot no longer holds the same key remotely.
    #[error("Row {row} of {table} changed since it was read")]
    StaleRow { table: Table, row: RowNumber },

    /// Transport-level failure talking to the backend.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Spreadsheet API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// Credentials could not be loaded or exchanged for a token.
    #[error("Spreadsheet authentication failed: {0}")]
    Auth(String),

    /// A domain-level error (not found, validation, conflict).
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl SheetError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, SheetError::RateLimited)
    }
}

pub type SheetResult<T> = Result<T, SheetError>;
