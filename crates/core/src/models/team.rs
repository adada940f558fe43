use serde::{Deserialize, Serialize};

use super::{align, cell};
use crate::schema::{COL_DESCRIPTION, COL_TEAM_NAME};
use crate::types::Record;

/// A row of the `Teams` worksheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub description: String,
}

impl Team {
    pub fn from_record(record: &Record) -> Self {
        Self {
            name: cell(record, COL_TEAM_NAME),
            description: cell(record, COL_DESCRIPTION),
        }
    }

    pub fn to_values(&self, headers: &[String]) -> Vec<String> {
        align(
            headers,
            &[
                (COL_TEAM_NAME, self.name.clone()),
                (COL_DESCRIPTION, self.description.clone()),
            ],
        )
    }
}
