//! Backup management for the ledger file.

use crate::error::{ErrorType, IntoResult, Res};
use crate::{utils, Config, Result};
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Prefix for copies of the ledger taken before it is modified.
pub const LEDGER: &str = "records";

/// Prefix for ledger files that could not be parsed and were moved aside.
pub const CORRUPT: &str = "corrupt";

const EXTENSION: &str = "json";

/// Manages backup file creation and rotation.
///
/// The `Backup` struct is immutable and owns copies of the paths and settings it needs.
/// Create a new instance via `Config::backup()` or `Backup::new()`.
#[derive(Debug, Clone)]
pub struct Backup {
    backups_dir: PathBuf,
    backup_copies: u32,
    data_file: PathBuf,
}

impl Backup {
    /// Creates a new `Backup` instance from a `Config`.
    pub fn new(config: &Config) -> Self {
        Self {
            backups_dir: config.backups().to_path_buf(),
            backup_copies: config.backup_copies(),
            data_file: config.data_file(),
        }
    }

    /// Copies the ledger file to the backups directory, if the ledger file exists.
    ///
    /// The filename format is `records.YYYY-MM-DD-NNN.json` where NNN is a sequence number.
    /// Automatically rotates old backups, keeping only `backup_copies` files.
    ///
    /// Returns the path to the created backup file, or `None` if there was nothing to back up.
    /// A ledger identical to the newest backup is not copied again.
    pub fn copy_ledger(&self) -> Result<Option<PathBuf>> {
        self.copy_ledger_inner().pub_result(ErrorType::Io)
    }

    fn copy_ledger_inner(&self) -> Res<Option<PathBuf>> {
        if !self.data_file.is_file() {
            return Ok(None);
        }
        if let Some(newest) = self.newest(LEDGER)? {
            if utils::read(&newest)? == utils::read(&self.data_file)? {
                debug!("The ledger is unchanged since {}", newest.display());
                return Ok(None);
            }
        }
        let path = self.next_path(LEDGER)?;
        utils::copy(&self.data_file, &path)?;
        debug!("Backed up the ledger to {}", path.display());
        self.rotate(LEDGER)?;
        Ok(Some(path))
    }

    /// Moves an unreadable ledger file into the backups directory as
    /// `corrupt.YYYY-MM-DD-NNN.json`. These files are never rotated away.
    ///
    /// Returns the path the file was moved to.
    pub fn quarantine_ledger(&self) -> Result<PathBuf> {
        let path = self.next_path(CORRUPT).pub_result(ErrorType::Io)?;
        utils::rename(&self.data_file, &path).pub_result(ErrorType::Io)?;
        Ok(path)
    }

    fn next_path(&self, prefix: &str) -> Res<PathBuf> {
        let date = today();
        let seq = self.next_sequence_number(prefix, &date)?;
        Ok(self
            .backups_dir
            .join(format!("{prefix}.{date}-{seq:03}.{EXTENSION}")))
    }

    /// Scans the backups directory for existing files with the given prefix and date,
    /// and returns the next sequence number.
    fn next_sequence_number(&self, prefix: &str, date: &str) -> Res<u32> {
        let max_seq = utils::file_names(&self.backups_dir)?
            .iter()
            .filter_map(|(_, name)| parse_sequence_number(name, prefix, date))
            .max()
            .unwrap_or(0);
        Ok(max_seq + 1)
    }

    /// The most recent backup file with the given prefix.
    fn newest(&self, prefix: &str) -> Res<Option<PathBuf>> {
        Ok(utils::file_names(&self.backups_dir)?
            .into_iter()
            .filter(|(_, name)| is_backup_file(name, prefix))
            .max_by(|a, b| a.1.cmp(&b.1))
            .map(|(path, _)| path))
    }

    /// Rotates old backup files, keeping only `backup_copies` files with the given prefix.
    fn rotate(&self, prefix: &str) -> Res<()> {
        let mut files: Vec<(PathBuf, String)> = utils::file_names(&self.backups_dir)?
            .into_iter()
            .filter(|(_, name)| is_backup_file(name, prefix))
            .collect();

        // Sort by filename (which sorts by date and sequence number due to format)
        files.sort_by(|a, b| a.1.cmp(&b.1));

        let to_delete = files.len().saturating_sub(self.backup_copies as usize);
        for (path, _) in files.into_iter().take(to_delete) {
            remove_backup(&path)?;
        }
        Ok(())
    }
}

fn remove_backup(path: &Path) -> Res<()> {
    debug!("Removing old backup {}", path.display());
    utils::remove(path)
}

/// Returns today's date in YYYY-MM-DD format.
fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Parses the sequence number from a backup filename.
/// Returns None if the filename doesn't match the expected pattern.
fn parse_sequence_number(filename: &str, prefix: &str, date: &str) -> Option<u32> {
    // Pattern: {prefix}.{date}-{NNN}.json
    let remainder = filename.strip_prefix(&format!("{prefix}.{date}-"))?;
    remainder
        .strip_suffix(&format!(".{EXTENSION}"))?
        .parse()
        .ok()
}

/// Checks if a filename is a backup file with the given prefix.
fn is_backup_file(filename: &str, prefix: &str) -> bool {
    filename.starts_with(&format!("{prefix}.")) && filename.ends_with(&format!(".{EXTENSION}"))
}
