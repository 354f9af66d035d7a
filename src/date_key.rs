use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Anything that can label a date column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateLike {
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl DateLike {
    /// Typed ISO 8601 value, as spreadsheets store `t="d"` cells.
    ///
    /// Parses `YYYY-MM-DDTHH:MM:SS[.fff]`, the same with an offset, or a bare
    /// date. Anything else is kept as text.
    pub fn from_iso(s: &str) -> Self {
        let s = s.trim();
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
            return DateLike::DateTime(dt);
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return DateLike::DateTime(dt.naive_local());
        }
        if let Ok(d) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
            return DateLike::Date(d);
        }
        DateLike::Text(s.to_string())
    }
}

impl From<&str> for DateLike {
    fn from(s: &str) -> Self {
        DateLike::Text(s.to_string())
    }
}

impl From<String> for DateLike {
    fn from(s: String) -> Self {
        DateLike::Text(s)
    }
}

impl From<NaiveDate> for DateLike {
    fn from(d: NaiveDate) -> Self {
        DateLike::Date(d)
    }
}

impl From<NaiveDateTime> for DateLike {
    fn from(dt: NaiveDateTime) -> Self {
        DateLike::DateTime(dt)
    }
}

/// Canonical column key for a date-like label.
///
/// Structured values become `YYYY-MM-DD`. Text whose first ten characters are a
/// valid `YYYY-MM-DD` date, followed by nothing or by whitespace, is cut down to
/// that date. Everything else comes back trimmed.
pub fn normalize(label: &DateLike) -> String {
    match label {
        DateLike::Date(d) => d.format(DATE_FORMAT).to_string(),
        DateLike::DateTime(dt) => dt.date().format(DATE_FORMAT).to_string(),
        DateLike::Text(s) => normalize_str(s),
    }
}

pub fn normalize_str(label: &str) -> String {
    let trimmed = label.trim();
    match leading_date(trimmed) {
        Some(date) => date.to_string(),
        None => trimmed.to_string(),
    }
}

/// Normalize a list of column labels, preserving order.
pub fn normalize_labels<S: AsRef<str>>(labels: &[S]) -> Vec<String> {
    labels.iter().map(|l| normalize_str(l.as_ref())).collect()
}

fn leading_date(s: &str) -> Option<&str> {
    let head = s.get(..10)?;
    let rest = &s[10..];
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    // chrono accepts unpadded fields, so insist on the exact shape
    let bytes = head.as_bytes();
    if bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    NaiveDate::parse_from_str(head, DATE_FORMAT).ok()?;
    Some(head)
}
