use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use polars::prelude::*;
use rust_xlsxwriter::Workbook;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::date_key::{self, DateLike};
use crate::error::LedgerError;
use crate::schema::roster;
use crate::table::{read_csv_as_strings, require_columns, string_values};

/// On-disk shape of the roster, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterFormat {
    Xlsx,
    Csv,
}

impl RosterFormat {
    pub fn from_path(path: &Path) -> Result<Self, LedgerError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("xlsx") => Ok(RosterFormat::Xlsx),
            Some("csv") => Ok(RosterFormat::Csv),
            _ => Err(LedgerError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

// ── Loading ─────────────────────────────────────────────────────────────────

/// Load the roster table.
///
/// Required columns: Roll_No, Name
/// Column labels are normalized to date keys right after parsing; labels that
/// collapse onto the same key are merged into one column.
/// All cells are loaded as strings.
pub fn load_roster(path: &Path, sheet_name: &str) -> Result<DataFrame, LedgerError> {
    if !path.exists() {
        return Err(LedgerError::NotFound(path.to_path_buf()));
    }

    let raw = match RosterFormat::from_path(path)? {
        RosterFormat::Xlsx => read_sheet(path, sheet_name)?,
        RosterFormat::Csv => read_csv_as_strings(path)?,
    };
    let df = normalize_column_labels(raw)?;

    require_columns(&df, "roster", &roster::IDENTITY)?;

    debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "loaded roster"
    );
    Ok(df)
}

fn read_sheet(path: &Path, sheet_name: &str) -> Result<DataFrame, LedgerError> {
    let mut workbook = open_workbook_auto(path)?;
    if !workbook.sheet_names().iter().any(|n| n == sheet_name) {
        return Err(LedgerError::MissingSheet(sheet_name.to_string()));
    }
    let range = workbook.worksheet_range(sheet_name)?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(DataFrame::empty());
    };

    let labels: Vec<String> = header.iter().map(header_label).collect();
    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); labels.len()];

    for row in rows {
        if row.iter().all(is_blank) {
            continue;
        }
        for (i, cell) in row.iter().enumerate().take(labels.len()) {
            cells[i].push(cell_text(cell));
        }
    }

    let mut labeled = Vec::with_capacity(labels.len());
    for (label, values) in labels.into_iter().zip(cells) {
        if label.is_empty() {
            if values.iter().any(Option::is_some) {
                warn!(sheet = sheet_name, "dropping column with an empty header");
            }
            continue;
        }
        labeled.push((label, values));
    }

    frame_from_labeled(labeled)
}

fn header_label(cell: &Data) -> String {
    let label = match cell {
        Data::Empty => return String::new(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => DateLike::DateTime(ndt),
            None => DateLike::Text(dt.as_f64().to_string()),
        },
        Data::DateTimeIso(s) => DateLike::from_iso(s),
        Data::String(s) => DateLike::Text(s.clone()),
        Data::Float(n) => DateLike::Text(number_text(*n)),
        other => DateLike::Text(other.to_string()),
    };
    date_key::normalize(&label)
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(n) => Some(number_text(*n)),
        Data::Int(n) => Some(n.to_string()),
        Data::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) if ndt.time() == chrono::NaiveTime::MIN => {
                Some(ndt.format("%Y-%m-%d").to_string())
            }
            Some(ndt) => Some(ndt.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => Some(dt.as_f64().to_string()),
        },
        other => Some(other.to_string()),
    }
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Integers without decimals.
fn number_text(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

// ── Column identity ─────────────────────────────────────────────────────────

/// Normalize every column label to its date key.
///
/// Columns that end up sharing a key are merged at the first one's position:
/// per row the last non-empty value wins, so no date is ever split across two
/// columns.
pub fn normalize_column_labels(df: DataFrame) -> Result<DataFrame, LedgerError> {
    let labels = date_key::normalize_labels(&df.get_column_names_str());
    let (order, groups) = group_labels(&labels);

    if order.len() == labels.len() {
        let mut df = df;
        df.set_column_names(labels.as_slice())?;
        return Ok(df);
    }

    let mut columns = Vec::with_capacity(order.len());
    for label in &order {
        let idx = &groups[label];
        if let [only] = idx.as_slice() {
            let mut column = df.get_columns()[*only].clone();
            column.rename(label.as_str().into());
            columns.push(column);
        } else {
            warn!(column = %label, count = idx.len(), "merging columns that share a date key");
            let parts = idx
                .iter()
                .map(|&i| string_values(&df.get_columns()[i]))
                .collect::<Result<Vec<_>, _>>()?;
            columns.push(Column::new(label.as_str().into(), coalesce(&parts)));
        }
    }

    Ok(DataFrame::new(columns)?)
}

fn frame_from_labeled(
    labeled: Vec<(String, Vec<Option<String>>)>,
) -> Result<DataFrame, LedgerError> {
    let labels: Vec<String> = labeled.iter().map(|(l, _)| l.clone()).collect();
    let (order, groups) = group_labels(&labels);

    let mut values: Vec<Option<Vec<Option<String>>>> =
        labeled.into_iter().map(|(_, v)| Some(v)).collect();

    let mut columns = Vec::with_capacity(order.len());
    for label in &order {
        let parts: Vec<Vec<Option<String>>> = groups[label]
            .iter()
            .filter_map(|&i| values[i].take())
            .collect();
        if parts.len() > 1 {
            warn!(column = %label, count = parts.len(), "merging columns that share a date key");
        }
        columns.push(Column::new(label.as_str().into(), coalesce(&parts)));
    }

    Ok(DataFrame::new(columns)?)
}

fn group_labels(labels: &[String]) -> (Vec<String>, HashMap<String, Vec<usize>>) {
    let mut order = Vec::new();
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, label) in labels.iter().enumerate() {
        let entry = groups.entry(label.clone()).or_default();
        if entry.is_empty() {
            order.push(label.clone());
        }
        entry.push(i);
    }
    (order, groups)
}

fn coalesce(parts: &[Vec<Option<String>>]) -> Vec<String> {
    let height = parts.iter().map(Vec::len).max().unwrap_or(0);
    (0..height)
        .map(|row| {
            parts
                .iter()
                .rev()
                .filter_map(|p| p.get(row).and_then(|v| v.as_deref()))
                .find(|v| !v.trim().is_empty())
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}

// ── Saving ──────────────────────────────────────────────────────────────────

/// Persist the roster, replacing the file at `path` wholesale.
///
/// Labels are normalized first. The table is written to a fresh sibling file
/// which is then renamed over `path`, so readers never see a half-written file.
pub fn save_roster(df: &DataFrame, path: &Path, sheet_name: &str) -> Result<(), LedgerError> {
    let format = RosterFormat::from_path(path)?;
    let mut df = normalize_column_labels(df.clone())?;

    let tmp = temp_sibling(path);
    let written = match format {
        RosterFormat::Xlsx => write_sheet(&df, &tmp, sheet_name),
        RosterFormat::Csv => write_csv(&mut df, &tmp),
    };
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }

    debug!(path = %path.display(), rows = df.height(), columns = df.width(), "saved roster");
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "roster".to_string());
    path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()))
}

fn write_sheet(df: &DataFrame, path: &Path, sheet_name: &str) -> Result<(), LedgerError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col_idx, column) in df.get_columns().iter().enumerate() {
        let col_num = col_idx as u16;
        let name = column.name().as_str();
        worksheet.write_string(0, col_num, name)?;

        match column.dtype() {
            DataType::Int64 => {
                for (row, v) in column.i64()?.into_iter().enumerate() {
                    if let Some(v) = v {
                        worksheet.write_number(row as u32 + 1, col_num, v as f64)?;
                    }
                }
            }
            DataType::Float64 => {
                for (row, v) in column.f64()?.into_iter().enumerate() {
                    if let Some(v) = v {
                        worksheet.write_number(row as u32 + 1, col_num, v)?;
                    }
                }
            }
            _ => {
                let numeric = roster::NUMERIC.contains(&name);
                for (row, v) in string_values(column)?.into_iter().enumerate() {
                    let Some(text) = v.filter(|t| !t.is_empty()) else {
                        continue;
                    };
                    let row_num = row as u32 + 1;
                    // only text that reads back identically becomes a number, so "007" stays text
                    match text.parse::<f64>() {
                        Ok(n) if numeric && n.is_finite() && number_text(n) == text => {
                            worksheet.write_number(row_num, col_num, n)?;
                        }
                        _ => {
                            worksheet.write_string(row_num, col_num, &text)?;
                        }
                    }
                }
            }
        }
    }

    worksheet.autofit();
    workbook.save(path)?;
    Ok(())
}

fn write_csv(df: &mut DataFrame, path: &Path) -> Result<(), LedgerError> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    file.sync_all()?;
    Ok(())
}
