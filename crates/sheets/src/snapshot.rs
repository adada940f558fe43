//! Full-table snapshots and the key index built over them.

use std::collections::HashMap;
use std::fmt;

use cohort_core::schema::Table;
use cohort_core::types::{Record, RowNumber};

/// Offset from a 0-based snapshot position to its remote row number:
/// one for 1-based addressing, one for the header row.
pub const FIRST_DATA_ROW: RowNumber = 2;

/// Every data row of a worksheet taken at one point in time, in remote order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub table: Table,
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl Snapshot {
    /// Build from raw rows, header row first. Blank trailing rows are dropped;
    /// short rows are padded so every record carries every header.
    pub fn from_rows(table: Table, mut rows: Vec<Vec<String>>) -> Self {
        while rows
            .last()
            .is_some_and(|row| row.iter().all(|c| c.trim().is_empty()))
        {
            rows.pop();
        }
        let mut rows = rows.into_iter();
        let headers: Vec<String> = rows
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(|h| h.trim().to_string())
            .collect();
        let records = rows
            .map(|row| {
                headers
                    .iter()
                    .enumerate()
                    .map(|(i, h)| (h.clone(), row.get(i).cloned().unwrap_or_default()))
                    .collect()
            })
            .collect();
        Self {
            table,
            headers,
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Remote row number of the record at `position`.
    pub fn row_number(position: usize) -> RowNumber {
        position + FIRST_DATA_ROW
    }

    /// 1-based column index of `header`.
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header).map(|i| i + 1)
    }

    /// Key of the record at `position`.
    pub fn key_at(&self, position: usize) -> Option<RowKey> {
        self.records
            .get(position)
            .map(|record| RowKey::of(self.table, record))
    }

    /// Index every record by key.
    pub fn index(&self) -> KeyIndex {
        let mut rows = HashMap::with_capacity(self.records.len());
        for (position, record) in self.records.iter().enumerate() {
            // First occurrence wins when a key is duplicated out of band.
            rows.entry(RowKey::of(self.table, record))
                .or_insert(Self::row_number(position));
        }
        KeyIndex { rows }
    }

    /// Records matching `key`, with their positions.
    pub fn find(&self, key: &RowKey) -> Option<(usize, &Record)> {
        self.records
            .iter()
            .enumerate()
            .find(|(_, record)| &RowKey::of(self.table, record) == key)
    }
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Values of a table's key columns for one row, trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowKey(Vec<String>);

impl RowKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(parts.into_iter().map(|p| p.as_ref().trim().to_string()).collect())
    }

    /// Key of `record` under `table`'s key columns.
    pub fn of(table: Table, record: &Record) -> Self {
        Self::new(
            table
                .key_columns()
                .iter()
                .map(|column| record.get(*column).map(String::as_str).unwrap_or("")),
        )
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" / "))
    }
}

/// Key to remote row number, rebuilt from each fresh snapshot.
#[derive(Debug, Clone, Default)]
pub struct KeyIndex {
    rows: HashMap<RowKey, RowNumber>,
}

impl KeyIndex {
    pub fn row_of(&self, key: &RowKey) -> Option<RowNumber> {
        self.rows.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn short_rows_are_padded_and_blank_tail_dropped() {
        let snap = Snapshot::from_rows(
            Table::Teams,
            rows(&[&["TeamName", "Description"], &["Team1"], &["", ""]]),
        );
        assert_eq!(snap.len(), 1);
        assert_eq!(snap.records[0]["Description"], "");
    }

    #[test]
    fn empty_worksheet_has_no_headers() {
        let snap = Snapshot::from_rows(Table::Teams, Vec::new());
        assert!(snap.headers.is_empty());
        assert!(snap.is_empty());
    }

    #[test]
    fn index_maps_keys_to_remote_rows() {
        let snap = Snapshot::from_rows(
            Table::Likes,
            rows(&[
                &["UpdateID", "Email"],
                &["u1", "a@x.com"],
                &["u1", "b@x.com"],
                &["u2", "a@x.com"],
            ]),
        );
        let index = snap.index();
        assert_eq!(index.len(), 3);
        assert_eq!(index.row_of(&RowKey::new(["u1", "b@x.com"])), Some(3));
        assert_eq!(index.row_of(&RowKey::new(["u2", "a@x.com"])), Some(4));
        assert_eq!(index.row_of(&RowKey::new(["u3", "a@x.com"])), None);
    }

    #[test]
    fn keys_ignore_surrounding_whitespace() {
        let snap = Snapshot::from_rows(
            Table::Teams,
            rows(&[&["TeamName", "Description"], &[" Team1 ", "x"]]),
        );
        assert_eq!(snap.key_at(0), Some(RowKey::new(["Team1"])));
        assert_eq!(snap.column_index("Description"), Some(2));
    }
}
