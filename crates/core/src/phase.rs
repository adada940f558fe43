//! SDLC phases and per-phase status labels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The six fixed SDLC stages a project moves through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SdlcPhase {
    Requirements,
    Design,
    Implementation,
    Testing,
    Deployment,
    Maintenance,
}

impl SdlcPhase {
    pub const ALL: [SdlcPhase; 6] = [
        SdlcPhase::Requirements,
        SdlcPhase::Design,
        SdlcPhase::Implementation,
        SdlcPhase::Testing,
        SdlcPhase::Deployment,
        SdlcPhase::Maintenance,
    ];

    /// Phase every new project starts in.
    pub const INITIAL: SdlcPhase = SdlcPhase::Requirements;

    pub fn as_str(self) -> &'static str {
        match self {
            SdlcPhase::Requirements => "Requirements",
            SdlcPhase::Design => "Design",
            SdlcPhase::Implementation => "Implementation",
            SdlcPhase::Testing => "Testing",
            SdlcPhase::Deployment => "Deployment",
            SdlcPhase::Maintenance => "Maintenance",
        }
    }
}

impl fmt::Display for SdlcPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SdlcPhase {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        SdlcPhase::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid phase '{s}'. Valid phases: {}",
                    SdlcPhase::ALL.map(SdlcPhase::as_str).join(", ")
                ))
            })
    }
}

/// Status of a single phase within a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    #[serde(rename = "On Hold")]
    OnHold,
}

impl PhaseStatus {
    pub const ALL: [PhaseStatus; 4] = [
        PhaseStatus::NotStarted,
        PhaseStatus::InProgress,
        PhaseStatus::Completed,
        PhaseStatus::OnHold,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PhaseStatus::NotStarted => "Not Started",
            PhaseStatus::InProgress => "In Progress",
            PhaseStatus::Completed => "Completed",
            PhaseStatus::OnHold => "On Hold",
        }
    }
}

impl fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhaseStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        PhaseStatus::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| CoreError::Validation(format!("Invalid phase status '{s}'")))
    }
}
