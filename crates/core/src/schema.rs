//! Worksheet schemas.
//!
//! Every persistent entity lives in a named worksheet whose first row holds
//! the column headers. [`Table`] is the closed set of worksheets the portal
//! knows about, each carrying its prescribed headers and the columns that
//! together identify a row.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const COL_TEAM_NAME: &str = "TeamName";
pub const COL_DESCRIPTION: &str = "Description";

pub const COL_NAME: &str = "Name";
pub const COL_EMAIL: &str = "Email";
pub const COL_PREFERRED_NAME: &str = "Preferred Name";
pub const COL_EXPERIENCE_LEVEL: &str = "Experience Level";
pub const COL_GENAI_EXPERIENCE: &str = "Have GenAI Experience?";
pub const COL_BACKGROUND: &str = "Background";
pub const COL_WHY_JOIN: &str = "Why do you want to join?";
pub const COL_GOALS: &str = "What are your goals?";
pub const COL_ROLE_PREFERENCE_1: &str = "Role Preference 1";
pub const COL_ROLE_PREFERENCE_2: &str = "Role Preference 2";
pub const COL_SKILLS: &str = "Skills for Role";
pub const COL_AVAILABLE_DAILY: &str = "Can participate daily?";
pub const COL_BEST_TIME: &str = "Best Time to Meet";
pub const COL_HAS_COMPUTER: &str = "Has computer & internet?";
pub const COL_TOOLS: &str = "Comfortable with Tools";
pub const COL_OTHER_TOOLS: &str = "Other Tools Known";
pub const COL_ANYTHING_ELSE: &str = "Anything else?";
pub const COL_MENTOR_FUTURE: &str = "Willing to mentor future cohorts?";
pub const COL_STATUS: &str = "Status";
pub const COL_TEAM: &str = "Team";
pub const COL_PASSWORD_HASH: &str = "PasswordHash";

pub const COL_PROJECT_NAME: &str = "ProjectName";
pub const COL_ASSIGNED_TEAM: &str = "AssignedTeam";
pub const COL_PROJECT_INFO: &str = "ProjectInfo";
pub const COL_CREATED_AT: &str = "CreatedAt";
pub const COL_CURRENT_PHASE: &str = "CurrentPhase";
pub const COL_PROGRESS: &str = "Progress";

pub const COL_UPDATE_ID: &str = "UpdateID";
pub const COL_TIMESTAMP: &str = "Timestamp";
pub const COL_UPDATE: &str = "Update";
pub const COL_PHASE: &str = "Phase";
pub const COL_COMMENT: &str = "Comment";

pub const COL_START_DATE: &str = "StartDate";
pub const COL_END_DATE: &str = "EndDate";
pub const COL_COMMENTS: &str = "Comments";

/// Participant columns in the order the signup form writes them.
pub const PARTICIPANT_HEADERS: &[&str] = &[
    COL_NAME,
    COL_EMAIL,
    COL_PREFERRED_NAME,
    COL_EXPERIENCE_LEVEL,
    COL_GENAI_EXPERIENCE,
    COL_BACKGROUND,
    COL_WHY_JOIN,
    COL_GOALS,
    COL_ROLE_PREFERENCE_1,
    COL_ROLE_PREFERENCE_2,
    COL_SKILLS,
    COL_AVAILABLE_DAILY,
    COL_BEST_TIME,
    COL_HAS_COMPUTER,
    COL_TOOLS,
    COL_OTHER_TOOLS,
    COL_ANYTHING_ELSE,
    COL_MENTOR_FUTURE,
    COL_STATUS,
    COL_TEAM,
    COL_PASSWORD_HASH,
];

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// A worksheet in the backing spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Table {
    Teams,
    Participants,
    Projects,
    Updates,
    Comments,
    Likes,
    ProjectProgress,
}

impl Table {
    pub const ALL: [Table; 7] = [
        Table::Teams,
        Table::Participants,
        Table::Projects,
        Table::Updates,
        Table::Comments,
        Table::Likes,
        Table::ProjectProgress,
    ];

    /// Worksheet title in the spreadsheet.
    pub fn sheet_name(self) -> &'static str {
        match self {
            Table::Teams => "Teams",
            Table::Participants => "Participants_list",
            Table::Projects => "Projects",
            Table::Updates => "Updates",
            Table::Comments => "Comments",
            Table::Likes => "Likes",
            Table::ProjectProgress => "ProjectProgress",
        }
    }

    /// Prescribed header row.
    pub fn headers(self) -> &'static [&'static str] {
        match self {
            Table::Teams => &[COL_TEAM_NAME, COL_DESCRIPTION],
            Table::Participants => PARTICIPANT_HEADERS,
            Table::Projects => &[
                COL_PROJECT_NAME,
                COL_ASSIGNED_TEAM,
                COL_PROJECT_INFO,
                COL_CREATED_AT,
                COL_CURRENT_PHASE,
                COL_PROGRESS,
            ],
            Table::Updates => &[
                COL_UPDATE_ID,
                COL_TIMESTAMP,
                COL_TEAM,
                COL_EMAIL,
                COL_UPDATE,
                COL_PHASE,
            ],
            Table::Comments => &[COL_UPDATE_ID, COL_TIMESTAMP, COL_EMAIL, COL_COMMENT],
            Table::Likes => &[COL_UPDATE_ID, COL_EMAIL],
            Table::ProjectProgress => &[
                COL_PROJECT_NAME,
                COL_PHASE,
                COL_STATUS,
                COL_START_DATE,
                COL_END_DATE,
                COL_COMMENTS,
            ],
        }
    }

    /// Whether the resolver compares row 1 against [`Table::headers`].
    ///
    /// The participant sheet is filled by an external signup form and may
    /// carry extra or reordered columns, so it is never checked.
    pub fn header_checked(self) -> bool {
        !matches!(self, Table::Participants)
    }

    /// Columns whose values together identify a row.
    pub fn key_columns(self) -> &'static [&'static str] {
        match self {
            Table::Teams => &[COL_TEAM_NAME],
            Table::Participants => &[COL_EMAIL],
            Table::Projects => &[COL_PROJECT_NAME],
            Table::Updates => &[COL_UPDATE_ID],
            Table::Comments => &[COL_UPDATE_ID, COL_TIMESTAMP, COL_EMAIL],
            Table::Likes => &[COL_UPDATE_ID, COL_EMAIL],
            Table::ProjectProgress => &[COL_PROJECT_NAME, COL_PHASE],
        }
    }

    /// Entity label used in error messages.
    pub fn entity(self) -> &'static str {
        match self {
            Table::Teams => "Team",
            Table::Participants => "Participant",
            Table::Projects => "Project",
            Table::Updates => "Update",
            Table::Comments => "Comment",
            Table::Likes => "Like",
            Table::ProjectProgress => "ProjectProgress",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sheet_name())
    }
}

impl FromStr for Table {
    type Err = CoreError;

    /// Accepts either the worksheet title or the variant name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::ALL
            .into_iter()
            .find(|t| t.sheet_name() == s || format!("{t:?}") == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown table '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn teams_headers_are_prescribed() {
        assert_eq!(Table::Teams.headers(), &["TeamName", "Description"]);
    }

    #[test]
    fn only_participants_skip_header_check() {
        for table in Table::ALL {
            assert_eq!(table.header_checked(), table != Table::Participants);
        }
    }

    #[test]
    fn key_columns_are_part_of_headers() {
        for table in Table::ALL {
            for key in table.key_columns() {
                assert!(
                    table.headers().contains(key),
                    "{table} key column {key} missing from headers"
                );
            }
        }
    }

    #[test]
    fn parse_accepts_sheet_and_variant_names() {
        assert_eq!("Participants_list".parse::<Table>().unwrap(), Table::Participants);
        assert_eq!("Participants".parse::<Table>().unwrap(), Table::Participants);
        assert_eq!("ProjectProgress".parse::<Table>().unwrap(), Table::ProjectProgress);
        assert!("Nope".parse::<Table>().is_err());
    }
}
