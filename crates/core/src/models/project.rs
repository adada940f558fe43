use serde::{Deserialize, Serialize};

use super::{align, cell};
use crate::phase::SdlcPhase;
use crate::schema::*;
use crate::types::{format_timestamp, Record, Timestamp};

/// A row of the `Projects` worksheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    pub name: String,
    pub assigned_team: String,
    pub info: String,
    pub created_at: String,
    /// `None` when the cell is blank or holds an unknown phase label.
    pub current_phase: Option<SdlcPhase>,
    pub progress: u8,
}

impl Project {
    pub fn from_record(record: &Record) -> Self {
        Self {
            name: cell(record, COL_PROJECT_NAME),
            assigned_team: cell(record, COL_ASSIGNED_TEAM),
            info: cell(record, COL_PROJECT_INFO),
            created_at: cell(record, COL_CREATED_AT),
            current_phase: cell(record, COL_CURRENT_PHASE).parse().ok(),
            progress: parse_progress(&cell(record, COL_PROGRESS)),
        }
    }

    pub fn to_values(&self, headers: &[String]) -> Vec<String> {
        align(
            headers,
            &[
                (COL_PROJECT_NAME, self.name.clone()),
                (COL_ASSIGNED_TEAM, self.assigned_team.clone()),
                (COL_PROJECT_INFO, self.info.clone()),
                (COL_CREATED_AT, self.created_at.clone()),
                (
                    COL_CURRENT_PHASE,
                    self.current_phase
                        .map(|p| p.as_str().to_string())
                        .unwrap_or_default(),
                ),
                (COL_PROGRESS, self.progress.to_string()),
            ],
        )
    }
}

/// Input for creating a project.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub assigned_team: String,
}

impl NewProject {
    /// A project as first written: initial phase, zero progress.
    pub fn into_project(self, created_at: &Timestamp) -> Project {
        Project {
            name: self.name.trim().to_string(),
            assigned_team: self.assigned_team.trim().to_string(),
            info: self.description,
            created_at: format_timestamp(created_at),
            current_phase: Some(SdlcPhase::INITIAL),
            progress: 0,
        }
    }
}

/// Parse a progress cell, clamping to 0..=100 and treating junk as 0.
pub fn parse_progress(raw: &str) -> u8 {
    raw.trim()
        .trim_end_matches('%')
        .parse::<f64>()
        .map(|v| v.clamp(0.0, 100.0) as u8)
        .unwrap_or(0)
}
