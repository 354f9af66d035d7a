use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Missing column '{column}' in {resource}")]
    MissingColumn { resource: String, column: String },

    #[error("Sheet not found: {0}")]
    MissingSheet(String),

    #[error("Unsupported file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Spreadsheet read error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Spreadsheet write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Config error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("{0}")]
    General(String),
}

impl LedgerError {
    pub fn missing_column(resource: impl Into<String>, column: &str) -> Self {
        LedgerError::MissingColumn {
            resource: resource.into(),
            column: column.to_string(),
        }
    }

    /// True for errors caused by an input lacking a required column or sheet.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            LedgerError::MissingColumn { .. } | LedgerError::MissingSheet(_)
        )
    }
}

#[cfg(feature = "python")]
impl From<LedgerError> for pyo3::PyErr {
    fn from(err: LedgerError) -> pyo3::PyErr {
        pyo3::exceptions::PyRuntimeError::new_err(err.to_string())
    }
}
