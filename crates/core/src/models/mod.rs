//! Typed views over worksheet rows.
//!
//! Rows come back from the sheet as [`Record`]s keyed by header. Each model
//! reads the columns it knows and, when written back, produces a value list
//! aligned to whatever header row the worksheet currently has.

pub mod participant;
pub mod progress;
pub mod project;
pub mod team;
pub mod update;

pub use participant::{NewParticipant, Participant};
pub use progress::PhaseProgress;
pub use project::{NewProject, Project};
pub use team::Team;
pub use update::{Comment, Like, Update};

use crate::types::Record;

/// Trimmed cell value, empty when the column is absent.
pub(crate) fn cell(record: &Record, column: &str) -> String {
    record
        .get(column)
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

/// `None` for blank cells.
pub(crate) fn optional_cell(record: &Record, column: &str) -> Option<String> {
    let value = cell(record, column);
    (!value.is_empty()).then_some(value)
}

/// Lay out `pairs` under `headers`; unknown headers get an empty cell.
pub(crate) fn align(headers: &[String], pairs: &[(&str, String)]) -> Vec<String> {
    headers
        .iter()
        .map(|h| {
            pairs
                .iter()
                .find(|(col, _)| col == h)
                .map(|(_, v)| v.clone())
                .unwrap_or_default()
        })
        .collect()
}

/// Sheet rendering of a checkbox answer; the Google backend writes it as a
/// boolean cell.
pub(crate) fn bool_cell(value: bool) -> String {
    if value { "TRUE" } else { "FALSE" }.to_string()
}

#[cfg(test)]
pub(crate) fn record(pairs: &[(&str, &str)]) -> Record {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
