use chrono::Timelike;
use indexmap::IndexMap;

/// Sheet timestamps carry no zone; they are written in server-local time.
pub type Timestamp = chrono::NaiveDateTime;

/// Calendar dates (phase start/end).
pub type Date = chrono::NaiveDate;

/// One data row keyed by column header, in sheet column order.
pub type Record = IndexMap<String, String>;

/// 1-based remote row number. Row 1 is always the header row.
pub type RowNumber = usize;

/// Format used for every `Timestamp`/`CreatedAt` cell.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format used for `StartDate`/`EndDate` cells.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Current local time truncated to whole seconds.
pub fn now() -> Timestamp {
    let now = chrono::Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Render a timestamp in the sheet format.
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a sheet timestamp, returning `None` for blank or malformed cells.
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    chrono::NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT).ok()
}
