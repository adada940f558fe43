use serde::Serialize;

use super::{align, cell};
use crate::phase::SdlcPhase;
use crate::schema::*;
use crate::types::{parse_timestamp, Record, Timestamp};

/// A status update posted by a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Update {
    pub id: String,
    pub timestamp: String,
    pub team: String,
    pub email: String,
    pub text: String,
    pub phase: Option<SdlcPhase>,
}

impl Update {
    /// Identifier for an update posted by `email` at `now`.
    pub fn new_id(now: &Timestamp, email: &str) -> String {
        format!("upd_{}_{}", now.format("%Y%m%d%H%M%S"), email)
    }

    pub fn from_record(record: &Record) -> Self {
        Self {
            id: cell(record, COL_UPDATE_ID),
            timestamp: cell(record, COL_TIMESTAMP),
            team: cell(record, COL_TEAM),
            email: cell(record, COL_EMAIL),
            text: cell(record, COL_UPDATE),
            phase: cell(record, COL_PHASE).parse().ok(),
        }
    }

    pub fn to_values(&self, headers: &[String]) -> Vec<String> {
        align(
            headers,
            &[
                (COL_UPDATE_ID, self.id.clone()),
                (COL_TIMESTAMP, self.timestamp.clone()),
                (COL_TEAM, self.team.clone()),
                (COL_EMAIL, self.email.clone()),
                (COL_UPDATE, self.text.clone()),
                (
                    COL_PHASE,
                    self.phase.map(|p| p.as_str().to_string()).unwrap_or_default(),
                ),
            ],
        )
    }

    pub fn posted_at(&self) -> Option<Timestamp> {
        parse_timestamp(&self.timestamp)
    }
}

/// A comment on an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub update_id: String,
    pub timestamp: String,
    pub email: String,
    pub text: String,
}

impl Comment {
    pub fn from_record(record: &Record) -> Self {
        Self {
            update_id: cell(record, COL_UPDATE_ID),
            timestamp: cell(record, COL_TIMESTAMP),
            email: cell(record, COL_EMAIL),
            text: cell(record, COL_COMMENT),
        }
    }

    pub fn to_values(&self, headers: &[String]) -> Vec<String> {
        align(
            headers,
            &[
                (COL_UPDATE_ID, self.update_id.clone()),
                (COL_TIMESTAMP, self.timestamp.clone()),
                (COL_EMAIL, self.email.clone()),
                (COL_COMMENT, self.text.clone()),
            ],
        )
    }
}

/// One participant's like of one update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Like {
    pub update_id: String,
    pub email: String,
}

impl Like {
    pub fn from_record(record: &Record) -> Self {
        Self {
            update_id: cell(record, COL_UPDATE_ID),
            email: cell(record, COL_EMAIL),
        }
    }

    pub fn to_values(&self, headers: &[String]) -> Vec<String> {
        align(
            headers,
            &[
                (COL_UPDATE_ID, self.update_id.clone()),
                (COL_EMAIL, self.email.clone()),
            ],
        )
    }
}
