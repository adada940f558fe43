use serde::{Deserialize, Serialize};

use super::{align, cell, optional_cell};
use crate::error::CoreError;
use crate::phase::{PhaseStatus, SdlcPhase};
use crate::schema::*;
use crate::types::{Date, Record, DATE_FORMAT};

/// Progress record for one phase of one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseProgress {
    pub project: String,
    pub phase: SdlcPhase,
    pub status: PhaseStatus,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub comments: String,
}

impl PhaseProgress {
    /// Rows with an unknown phase or status are rejected.
    pub fn from_record(record: &Record) -> Result<Self, CoreError> {
        Ok(Self {
            project: cell(record, COL_PROJECT_NAME),
            phase: cell(record, COL_PHASE).parse()?,
            status: cell(record, COL_STATUS).parse()?,
            start_date: optional_cell(record, COL_START_DATE),
            end_date: optional_cell(record, COL_END_DATE),
            comments: cell(record, COL_COMMENTS),
        })
    }

    /// Build a record; an end date is kept only for completed phases.
    pub fn new(
        project: &str,
        phase: SdlcPhase,
        status: PhaseStatus,
        start_date: Option<Date>,
        end_date: Option<Date>,
        comments: String,
    ) -> Self {
        let end_date = end_date.filter(|_| status == PhaseStatus::Completed);
        Self {
            project: project.to_string(),
            phase,
            status,
            start_date: start_date.map(|d| d.format(DATE_FORMAT).to_string()),
            end_date: end_date.map(|d| d.format(DATE_FORMAT).to_string()),
            comments,
        }
    }

    pub fn to_values(&self, headers: &[String]) -> Vec<String> {
        align(
            headers,
            &[
                (COL_PROJECT_NAME, self.project.clone()),
                (COL_PHASE, self.phase.as_str().to_string()),
                (COL_STATUS, self.status.as_str().to_string()),
                (COL_START_DATE, self.start_date.clone().unwrap_or_default()),
                (COL_END_DATE, self.end_date.clone().unwrap_or_default()),
                (COL_COMMENTS, self.comments.clone()),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::super::record;
    use super::*;

    #[test]
    fn end_date_only_kept_when_completed() {
        let day = chrono::NaiveDate::from_ymd_opt(2026, 3, 1);
        let in_progress = PhaseProgress::new(
            "P",
            SdlcPhase::Design,
            PhaseStatus::InProgress,
            day,
            day,
            String::new(),
        );
        assert_eq!(in_progress.start_date.as_deref(), Some("2026-03-01"));
        assert_eq!(in_progress.end_date, None);

        let done = PhaseProgress::new(
            "P",
            SdlcPhase::Design,
            PhaseStatus::Completed,
            day,
            day,
            String::new(),
        );
        assert_eq!(done.end_date.as_deref(), Some("2026-03-01"));
    }

    #[test]
    fn from_record_rejects_unknown_status() {
        let rec = record(&[("ProjectName", "P"), ("Phase", "Design"), ("Status", "Blocked")]);
        assert!(PhaseProgress::from_record(&rec).is_err());
    }
}
