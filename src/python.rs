use std::collections::HashSet;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use pyo3::prelude::*;
use pyo3::types::PyModule;
use pyo3_polars::PyDataFrame;

use crate::date_key::{self, DateLike};
use crate::schema;
use crate::table::canonical_identifier;

/// Accepts `str`, `datetime.datetime` or `datetime.date`.
fn extract_date_like(label: &Bound<'_, PyAny>) -> PyResult<DateLike> {
    // datetime is a subclass of date, so it has to be tried first
    if let Ok(dt) = label.extract::<NaiveDateTime>() {
        return Ok(DateLike::DateTime(dt));
    }
    if let Ok(d) = label.extract::<NaiveDate>() {
        return Ok(DateLike::Date(d));
    }
    Ok(DateLike::Text(label.str()?.to_string()))
}

#[pyfunction]
fn normalize_date_key(label: &Bound<'_, PyAny>) -> PyResult<String> {
    Ok(date_key::normalize(&extract_date_like(label)?))
}

#[pyfunction]
#[pyo3(signature = (path, sheet_name="Attendance"))]
fn load_roster(path: &str, sheet_name: &str) -> PyResult<PyDataFrame> {
    let df = crate::roster::load_roster(Path::new(path), sheet_name)?;
    Ok(PyDataFrame(df))
}

#[pyfunction]
fn load_presence(path: &str) -> PyResult<HashSet<String>> {
    Ok(crate::presence::load_presence(Path::new(path))?)
}

/// Merge a presence list into the roster and return the updated table.
/// Identifiers may be ints or strings.
#[pyfunction]
fn merge_attendance<'py>(
    roster: PyDataFrame,
    present: Vec<Bound<'py, PyAny>>,
    date_label: &Bound<'py, PyAny>,
) -> PyResult<PyDataFrame> {
    let ids = present
        .iter()
        .map(|p| Ok(canonical_identifier(&p.str()?.to_string())))
        .collect::<PyResult<HashSet<String>>>()?;
    let label = extract_date_like(date_label)?;
    let (df, _) = crate::merge::merge_attendance(&roster.0, &ids, &label)?;
    Ok(PyDataFrame(df))
}

#[pyfunction]
#[pyo3(signature = (roster, path, sheet_name="Attendance"))]
fn save_roster(roster: PyDataFrame, path: &str, sheet_name: &str) -> PyResult<()> {
    crate::roster::save_roster(&roster.0, Path::new(path), sheet_name)?;
    Ok(())
}

#[pyfunction]
fn backup_roster(path: &str, backup_dir: &str) -> PyResult<Option<String>> {
    let made = crate::backup::backup_roster(Path::new(path), Path::new(backup_dir))?;
    Ok(made.map(|p| p.display().to_string()))
}

/// Export column constants as a Python submodule
fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
    let roster = PyModule::new(m.py(), "roster")?;
    roster.add("ROLL_NO", schema::roster::ROLL_NO)?;
    roster.add("NAME", schema::roster::NAME)?;
    roster.add("TOTAL_PRESENT", schema::roster::TOTAL_PRESENT)?;
    roster.add("PERCENTAGE", schema::roster::PERCENTAGE)?;
    m.add_submodule(&roster)?;

    let status = PyModule::new(m.py(), "status")?;
    status.add("PRESENT", schema::status::PRESENT)?;
    status.add("ABSENT", schema::status::ABSENT)?;
    status.add("UNRECORDED", schema::status::UNRECORDED)?;
    m.add_submodule(&status)?;

    Ok(())
}

#[pymodule]
#[pyo3(name = "_core")]
fn core_module(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(normalize_date_key, m)?)?;
    m.add_function(wrap_pyfunction!(load_roster, m)?)?;
    m.add_function(wrap_pyfunction!(load_presence, m)?)?;
    m.add_function(wrap_pyfunction!(merge_attendance, m)?)?;
    m.add_function(wrap_pyfunction!(save_roster, m)?)?;
    m.add_function(wrap_pyfunction!(backup_roster, m)?)?;
    add_schema_exports(m)?;
    Ok(())
}
