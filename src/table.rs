use std::path::Path;

use polars::prelude::*;

use crate::error::LedgerError;

/// Read a CSV file with all columns as String dtype.
/// Trims whitespace from column names.
pub fn read_csv_as_strings(path: &Path) -> Result<DataFrame, LedgerError> {
    if !path.exists() {
        return Err(LedgerError::NotFound(path.to_path_buf()));
    }

    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0)) // all columns as String
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    let trimmed: Vec<String> = df
        .get_column_names_str()
        .iter()
        .map(|c| c.trim().to_string())
        .collect();
    df.set_column_names(trimmed.as_slice())?;

    Ok(df)
}

pub fn require_columns(
    df: &DataFrame,
    resource: &str,
    required: &[&str],
) -> Result<(), LedgerError> {
    for &col_name in required {
        if df.column(col_name).is_err() {
            return Err(LedgerError::missing_column(resource, col_name));
        }
    }
    Ok(())
}

/// Comparable text form of an identifier.
///
/// Spreadsheets hand back `1.0` where a CSV says `1`; integral numbers are
/// rendered without a fractional part so both sides meet.
pub fn canonical_identifier(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", n as i64),
        _ => trimmed.to_string(),
    }
}

/// Text view of any column, nulls included.
pub fn string_values(column: &Column) -> Result<Vec<Option<String>>, LedgerError> {
    let as_text = column.cast(&DataType::String)?;
    let values = as_text
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect();
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn identifiers_meet_across_numeric_forms() {
        assert_eq!(canonical_identifier("1"), "1");
        assert_eq!(canonical_identifier("1.0"), "1");
        assert_eq!(canonical_identifier(" 42 "), "42");
        assert_eq!(canonical_identifier("1.5"), "1.5");
        assert_eq!(canonical_identifier("CS-101"), "CS-101");
        assert_eq!(canonical_identifier("NaN"), "NaN");
    }

    #[test]
    fn csv_is_read_as_strings_with_trimmed_headers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("daily.csv");
        fs::write(&path, " Roll_No ,Score\n1,2.5\n2,3\n").unwrap();

        let df = read_csv_as_strings(&path).unwrap();
        assert_eq!(df.get_column_names_str(), vec!["Roll_No", "Score"]);
        assert_eq!(df.column("Score").unwrap().dtype(), &DataType::String);
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn missing_csv_is_not_found() {
        let dir = tempdir().unwrap();
        let err = read_csv_as_strings(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[test]
    fn require_columns_names_the_missing_one() {
        let df = DataFrame::new(vec![Column::new("Name".into(), &["Alice"])]).unwrap();
        let err = require_columns(&df, "roster", &["Roll_No", "Name"]).unwrap_err();
        assert!(err.is_schema_error());
        assert!(err.to_string().contains("Roll_No"));
    }
}
