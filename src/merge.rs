use std::collections::HashSet;

use polars::prelude::*;
use tracing::{debug, warn};

use crate::date_key::{self, DateLike};
use crate::error::LedgerError;
use crate::roster::normalize_column_labels;
use crate::schema::{roster, status};
use crate::table::{canonical_identifier, require_columns, string_values};

/// What a single merge did to the roster.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeReport {
    pub date_key: String,
    /// False when an existing column for the date was overwritten.
    pub column_created: bool,
    pub present: usize,
    pub absent: usize,
    pub total_classes: usize,
    /// Presence identifiers with no matching roster row, sorted.
    pub unknown: Vec<String>,
}

/// Record one day's attendance in the roster.
///
/// The date's column is created when missing and otherwise fully overwritten:
/// `P` for every row whose Roll_No is in `present`, `A` for every other row.
/// Aggregates are then recomputed over all date columns. The input table is
/// left untouched; the updated table is returned.
pub fn merge_attendance(
    roster_df: &DataFrame,
    present: &HashSet<String>,
    raw_date_label: &DateLike,
) -> Result<(DataFrame, MergeReport), LedgerError> {
    let date_key = date_key::normalize(raw_date_label);
    let mut df = normalize_column_labels(roster_df.clone())?;
    require_columns(&df, "roster", &roster::IDENTITY)?;

    if roster::FIXED.contains(&date_key.as_str()) || date_key.is_empty() {
        return Err(LedgerError::General(format!(
            "'{date_key}' cannot be used as a date column"
        )));
    }

    let column_created = df.column(&date_key).is_err();

    let ids = string_values(df.column(roster::ROLL_NO)?)?;
    let mut seen = HashSet::with_capacity(ids.len());
    let statuses: Vec<&str> = ids
        .iter()
        .map(|id| {
            let id = id.as_deref().map(canonical_identifier);
            let is_present = id.as_ref().is_some_and(|id| present.contains(id));
            if let Some(id) = id {
                seen.insert(id);
            }
            if is_present {
                status::PRESENT
            } else {
                status::ABSENT
            }
        })
        .collect();

    let present_count = statuses.iter().filter(|s| **s == status::PRESENT).count();
    let absent = statuses.len() - present_count;

    df.with_column(Column::new(date_key.as_str().into(), statuses))?;
    let df = recompute_aggregates(df)?;

    let mut unknown: Vec<String> = present.difference(&seen).cloned().collect();
    unknown.sort();
    if !unknown.is_empty() {
        warn!(
            date = %date_key,
            count = unknown.len(),
            ids = ?unknown,
            "ignoring identifiers not on the roster"
        );
    }

    let report = MergeReport {
        total_classes: date_columns(&df).len(),
        date_key,
        column_created,
        present: present_count,
        absent,
        unknown,
    };
    debug!(?report, "merged attendance");
    Ok((df, report))
}

/// Every column outside the fixed identity and derived set.
pub fn date_columns(df: &DataFrame) -> Vec<String> {
    df.get_column_names_str()
        .into_iter()
        .filter(|name| !roster::FIXED.contains(name))
        .map(|name| name.to_string())
        .collect()
}

/// Recompute Total_Present and Percentage from the table's current columns.
///
/// The derived columns are moved to the end of the table.
pub fn recompute_aggregates(mut df: DataFrame) -> Result<DataFrame, LedgerError> {
    let dates = date_columns(&df);
    let mut totals = vec![0i64; df.height()];

    for name in &dates {
        for (row, v) in string_values(df.column(name)?)?.iter().enumerate() {
            if v.as_deref() == Some(status::PRESENT) {
                totals[row] += 1;
            }
        }
    }

    let total_classes = dates.len();
    let percentages: Vec<f64> = totals
        .iter()
        .map(|&t| percentage(t, total_classes))
        .collect();

    df.with_column(Column::new(roster::TOTAL_PRESENT.into(), totals))?;
    df.with_column(Column::new(roster::PERCENTAGE.into(), percentages))?;

    let order: Vec<String> = df
        .get_column_names_str()
        .into_iter()
        .filter(|name| !roster::DERIVED.contains(name))
        .chain(roster::DERIVED)
        .map(|name| name.to_string())
        .collect();
    Ok(df.select(order)?)
}

/// Share of classes attended, as a percentage rounded to two decimals.
pub fn percentage(total_present: i64, total_classes: usize) -> f64 {
    if total_classes == 0 {
        return 0.0;
    }
    let raw = total_present as f64 / total_classes as f64 * 100.0;
    (raw * 100.0).round_ties_even() / 100.0
}
