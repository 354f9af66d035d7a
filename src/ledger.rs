use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::backup::backup_roster;
use crate::config::LedgerConfig;
use crate::date_key::{self, DateLike};
use crate::error::LedgerError;
use crate::merge::{merge_attendance, MergeReport};
use crate::presence::load_presence;
use crate::roster::{load_roster, save_roster};

/// One invocation: which date to record and where its presence list is.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    /// Defaults to today's local date.
    pub date: Option<String>,
    /// Defaults to the config's daily path for the date.
    pub daily: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub date_key: String,
    pub roster_path: PathBuf,
    pub daily_path: PathBuf,
    pub backup: Option<PathBuf>,
    pub report: MergeReport,
}

/// Load, merge, back up and save.
///
/// Both inputs are loaded and merged before anything is written, so a missing
/// file or column leaves the roster and the backup directory untouched.
pub fn run(config: &LedgerConfig, request: &RunRequest) -> Result<RunSummary, LedgerError> {
    let label = match &request.date {
        Some(d) => DateLike::from(d.as_str()),
        None => DateLike::Date(Local::now().date_naive()),
    };
    let date_key = date_key::normalize(&label);
    if NaiveDate::parse_from_str(&date_key, "%Y-%m-%d").is_err() {
        warn!(
            date = %date_key,
            "date is not in YYYY-MM-DD form, using it as a column label as given"
        );
    }

    let daily_path = request
        .daily
        .clone()
        .unwrap_or_else(|| config.daily_path(&date_key));

    info!(date = %date_key, daily = %daily_path.display(), "starting attendance run");

    info!(path = %config.roster_path.display(), "loading roster");
    let roster = load_roster(&config.roster_path, &config.sheet_name)?;

    info!(path = %daily_path.display(), "loading presence list");
    let present = load_presence(&daily_path)?;

    let (updated, report) = merge_attendance(&roster, &present, &label)?;
    info!(
        date = %report.date_key,
        present = report.present,
        absent = report.absent,
        classes = report.total_classes,
        new_column = report.column_created,
        "attendance merged"
    );

    let backup = if config.backup {
        backup_roster(&config.roster_path, &config.backup_dir)?
    } else {
        None
    };

    save_roster(&updated, &config.roster_path, &config.sheet_name)?;
    info!(path = %config.roster_path.display(), "roster saved");

    Ok(RunSummary {
        date_key,
        roster_path: config.roster_path.clone(),
        daily_path,
        backup,
        report,
    })
}
