use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::{info, warn};

use crate::error::LedgerError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H%M%S";

/// Copy the roster into `backup_dir` before it is overwritten.
///
/// Example: backups/master_attendance_2025-11-28_134501.xlsx
/// Returns `None` when there is nothing to back up yet.
pub fn backup_roster(source: &Path, backup_dir: &Path) -> Result<Option<PathBuf>, LedgerError> {
    backup_roster_at(source, backup_dir, Local::now().naive_local())
}

/// Same as [`backup_roster`] with an explicit timestamp.
///
/// An existing backup is never replaced: a second copy within the same second
/// gets a `_1`, `_2`, ... suffix.
pub fn backup_roster_at(
    source: &Path,
    backup_dir: &Path,
    timestamp: NaiveDateTime,
) -> Result<Option<PathBuf>, LedgerError> {
    if !source.exists() {
        warn!(path = %source.display(), "no roster to back up, skipping backup");
        return Ok(None);
    }

    fs::create_dir_all(backup_dir)?;

    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let stamp = timestamp.format(TIMESTAMP_FORMAT).to_string();

    let mut reader = File::open(source)?;
    let mut attempt = 0u32;
    loop {
        let name = if attempt == 0 {
            format!("{stem}_{stamp}{suffix}")
        } else {
            format!("{stem}_{stamp}_{attempt}{suffix}")
        };
        let target = backup_dir.join(name);

        match OpenOptions::new().write(true).create_new(true).open(&target) {
            Ok(mut writer) => {
                let copied = io::copy(&mut reader, &mut writer).and_then(|_| writer.sync_all());
                if let Err(e) = copied {
                    drop(writer);
                    let _ = fs::remove_file(&target);
                    return Err(e.into());
                }
                info!(path = %target.display(), "backup created");
                return Ok(Some(target));
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 11, 28)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn missing_source_is_a_no_op() {
        let dir = tempdir().unwrap();
        let backups = dir.path().join("backups");

        let made = backup_roster(&dir.path().join("master_attendance.xlsx"), &backups).unwrap();
        assert!(made.is_none());
        assert!(!backups.exists());
    }

    #[test]
    fn copy_is_named_after_stem_and_timestamp() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("master_attendance.xlsx");
        fs::write(&source, b"roster bytes").unwrap();
        let backups = dir.path().join("backups");

        let made = backup_roster_at(&source, &backups, at(13, 45, 1)).unwrap().unwrap();
        assert_eq!(
            made.file_name().unwrap().to_str().unwrap(),
            "master_attendance_2025-11-28_134501.xlsx"
        );
        assert_eq!(fs::read(&made).unwrap(), b"roster bytes");
    }

    #[test]
    fn failed_copy_leaves_no_partial_backup() {
        let dir = tempdir().unwrap();
        // a directory opens fine but cannot be read as a file
        let source = dir.path().join("master_attendance.xlsx");
        fs::create_dir(&source).unwrap();
        let backups = dir.path().join("backups");

        assert!(backup_roster_at(&source, &backups, at(9, 0, 0)).is_err());
        assert_eq!(fs::read_dir(&backups).unwrap().count(), 0);
    }

    #[test]
    fn same_second_backups_do_not_overwrite() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("master_attendance.xlsx");
        let backups = dir.path().join("backups");

        fs::write(&source, b"first").unwrap();
        let first = backup_roster_at(&source, &backups, at(9, 0, 0)).unwrap().unwrap();
        fs::write(&source, b"second").unwrap();
        let second = backup_roster_at(&source, &backups, at(9, 0, 0)).unwrap().unwrap();

        assert_ne!(first, second);
        assert_eq!(
            second.file_name().unwrap().to_str().unwrap(),
            "master_attendance_2025-11-28_090000_1.xlsx"
        );
        assert_eq!(fs::read(&first).unwrap(), b"first");
        assert_eq!(fs::read(&second).unwrap(), b"second");
    }
}
