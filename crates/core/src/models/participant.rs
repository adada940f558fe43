use serde::{Deserialize, Serialize};

use super::{align, bool_cell, cell, optional_cell};
use crate::schema::*;
use crate::types::Record;

/// Status written for every fresh signup.
pub const STATUS_PENDING: &str = "Pending";

/// Placeholder values the sheet or older exports leave in empty team cells.
const BLANK_TEAM_MARKERS: &[&str] = &["nan", "none", "null"];

/// A row of the participant worksheet.
///
/// The worksheet may carry columns beyond the signup form; they are kept in
/// [`Participant::profile`] so nothing is lost on display. The password hash
/// is never serialized.
#[derive(Debug, Clone, Serialize)]
pub struct Participant {
    pub name: String,
    pub email: String,
    pub preferred_name: String,
    pub status: String,
    pub team: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Every column of the row, in sheet order, minus the password hash.
    pub profile: Record,
}

impl Participant {
    pub fn from_record(record: &Record) -> Self {
        let team = optional_cell(record, COL_TEAM)
            .filter(|t| !BLANK_TEAM_MARKERS.contains(&t.to_ascii_lowercase().as_str()));
        let mut profile = record.clone();
        profile.shift_remove(COL_PASSWORD_HASH);
        Self {
            name: cell(record, COL_NAME),
            email: cell(record, COL_EMAIL),
            preferred_name: cell(record, COL_PREFERRED_NAME),
            status: cell(record, COL_STATUS),
            team,
            password_hash: optional_cell(record, COL_PASSWORD_HASH),
            profile,
        }
    }

    /// Preferred name when given, otherwise the full name.
    pub fn display_name(&self) -> &str {
        if self.preferred_name.is_empty() {
            &self.name
        } else {
            &self.preferred_name
        }
    }

    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }

    pub fn is_on_team(&self, team: &str) -> bool {
        self.team.as_deref() == Some(team)
    }
}

/// Signup form submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewParticipant {
    pub name: String,
    pub email: String,
    pub preferred_name: String,
    pub experience_level: String,
    pub genai_experience: bool,
    pub background: Vec<String>,
    pub why_join: String,
    pub goals: String,
    pub role_preference_1: String,
    pub role_preference_2: String,
    pub skills: String,
    pub available_daily: bool,
    pub best_time: String,
    pub has_computer: bool,
    pub tools: Vec<String>,
    pub other_tools: String,
    pub anything_else: String,
    pub mentor_future: bool,
}

impl NewParticipant {
    /// Row values for `headers`; status is always [`STATUS_PENDING`] and the
    /// team and password cells start empty. Trailing empty cells are dropped.
    pub fn to_values(&self, headers: &[String]) -> Vec<String> {
        let mut values = align(
            headers,
            &[
                (COL_NAME, self.name.trim().to_string()),
                (COL_EMAIL, self.email.trim().to_string()),
                (COL_PREFERRED_NAME, self.preferred_name.trim().to_string()),
                (COL_EXPERIENCE_LEVEL, self.experience_level.clone()),
                (COL_GENAI_EXPERIENCE, bool_cell(self.genai_experience)),
                (COL_BACKGROUND, self.background.join(", ")),
                (COL_WHY_JOIN, self.why_join.clone()),
                (COL_GOALS, self.goals.clone()),
                (COL_ROLE_PREFERENCE_1, self.role_preference_1.clone()),
                (COL_ROLE_PREFERENCE_2, self.role_preference_2.clone()),
                (COL_SKILLS, self.skills.clone()),
                (COL_AVAILABLE_DAILY, bool_cell(self.available_daily)),
                (COL_BEST_TIME, self.best_time.clone()),
                (COL_HAS_COMPUTER, bool_cell(self.has_computer)),
                (COL_TOOLS, self.tools.join(", ")),
                (COL_OTHER_TOOLS, self.other_tools.clone()),
                (COL_ANYTHING_ELSE, self.anything_else.clone()),
                (COL_MENTOR_FUTURE, bool_cell(self.mentor_future)),
                (COL_STATUS, STATUS_PENDING.to_string()),
            ],
        );
        while values.last().is_some_and(|v| v.is_empty()) {
            values.pop();
        }
        values
    }
}
