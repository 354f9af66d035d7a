use std::collections::HashSet;
use std::path::Path;

use polars::prelude::*;
use tracing::debug;

use crate::error::LedgerError;
use crate::schema::presence;
use crate::table::{canonical_identifier, read_csv_as_strings, require_columns};

/// Load one day's presence list.
///
/// Required columns: Roll_No
/// Identifiers are canonicalized and deduplicated; blanks are skipped.
pub fn load_presence(path: &Path) -> Result<HashSet<String>, LedgerError> {
    let raw = read_csv_as_strings(path)?;
    require_columns(&raw, "presence list", &[presence::ROLL_NO])?;

    let df = raw
        .lazy()
        .select([col(presence::ROLL_NO).str().strip_chars(lit(" \t\r\n"))])
        .collect()?;

    let present: HashSet<String> = df
        .column(presence::ROLL_NO)?
        .str()?
        .into_iter()
        .flatten()
        .filter(|id| !id.is_empty())
        .map(canonical_identifier)
        .collect();

    debug!(
        path = %path.display(),
        rows = df.height(),
        unique = present.len(),
        "loaded presence list"
    );
    Ok(present)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn identifiers_are_deduplicated_and_canonical() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("daily.csv");
        fs::write(&path, "Roll_No,Name\n1,Alice\n3,Carol\n 1 ,Alice\n3.0,Carol\n,\n").unwrap();

        let present = load_presence(&path).unwrap();
        let expected: HashSet<String> = ["1", "3"].iter().map(|s| s.to_string()).collect();
        assert_eq!(present, expected);
    }

    #[test]
    fn header_only_file_is_an_empty_set() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("daily.csv");
        fs::write(&path, "Roll_No\n").unwrap();

        assert!(load_presence(&path).unwrap().is_empty());
    }

    #[test]
    fn missing_identifier_column_is_a_schema_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("daily.csv");
        fs::write(&path, "Student,Name\n1,Alice\n").unwrap();

        let err = load_presence(&path).unwrap_err();
        assert!(err.is_schema_error());
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = load_presence(&dir.path().join("daily_2025-11-27.csv")).unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }
}
