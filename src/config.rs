use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Where the ledger lives and how a run behaves.
///
/// Every key is optional in the YAML file; missing keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    pub roster_path: PathBuf,
    pub sheet_name: String,
    pub backup_dir: PathBuf,
    /// Directory holding the daily presence lists.
    pub daily_dir: PathBuf,
    pub daily_prefix: String,
    pub backup: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            roster_path: PathBuf::from("data/master_attendance.xlsx"),
            sheet_name: "Attendance".to_string(),
            backup_dir: PathBuf::from("backups"),
            daily_dir: PathBuf::from("data"),
            daily_prefix: "daily_".to_string(),
            backup: true,
        }
    }
}

impl LedgerConfig {
    pub fn from_yaml_file(path: &Path) -> Result<Self, LedgerError> {
        if !path.exists() {
            return Err(LedgerError::NotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, LedgerError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Presence list for a date key: `<daily_dir>/<daily_prefix><date>.csv`.
    pub fn daily_path(&self, date_key: &str) -> PathBuf {
        self.daily_dir
            .join(format!("{}{}.csv", self.daily_prefix, date_key))
    }
}
