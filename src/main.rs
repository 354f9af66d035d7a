use std::path::PathBuf;

use anyhow::{Context, Result};
use attendance_ledger::{run, LedgerConfig, RunRequest};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Record a day's attendance in the master roster.
#[derive(Parser, Debug)]
#[command(name = "attendance-ledger", version, about)]
struct Cli {
    /// Date for attendance in YYYY-MM-DD format. Default: today.
    #[arg(long)]
    date: Option<String>,

    /// Presence CSV with a Roll_No column. Default: <daily_dir>/daily_<date>.csv
    #[arg(long)]
    daily: Option<PathBuf>,

    /// Master roster (.xlsx or .csv).
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Sheet holding the roster in an .xlsx file.
    #[arg(long)]
    sheet: Option<String>,

    #[arg(long)]
    backup_dir: Option<PathBuf>,

    /// Skip the timestamped copy of the roster.
    #[arg(long)]
    no_backup: bool,

    /// YAML file with ledger settings; flags override it.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => LedgerConfig::from_yaml_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => LedgerConfig::default(),
    };
    if let Some(roster) = cli.roster {
        config.roster_path = roster;
    }
    if let Some(sheet) = cli.sheet {
        config.sheet_name = sheet;
    }
    if let Some(dir) = cli.backup_dir {
        config.backup_dir = dir;
    }
    if cli.no_backup {
        config.backup = false;
    }

    let request = RunRequest {
        date: cli.date,
        daily: cli.daily,
    };
    let summary = run(&config, &request).context("attendance update failed")?;

    if let Some(backup) = &summary.backup {
        info!(path = %backup.display(), "previous roster kept");
    }
    println!(
        "Done. Attendance for {} saved to {}",
        summary.date_key,
        summary.roster_path.display()
    );
    Ok(())
}
