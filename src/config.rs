//! Configuration file handling.
//!
//! The configuration file is stored at `$EXPENSES_HOME/config.json` and contains settings such as
//! where the ledger file lives, how many backups to keep and what to do when the ledger file is
//! unreadable.

use crate::backup::Backup;
use crate::error::{ErrorType, IntoResult, Res};
use crate::store::JsonFile;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "expenses";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const BACKUPS: &str = ".backups";
const CONFIG_JSON: &str = "config.json";
const RECORDS_JSON: &str = "records.json";

/// What to do when the ledger file exists but cannot be parsed.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum OnCorrupt {
    /// Refuse to start. The file is left untouched for the user to repair.
    #[default]
    Abort,
    /// Move the unreadable file into the backups directory and start with an empty ledger.
    StartEmpty,
}

serde_plain::derive_display_from_serialize!(OnCorrupt);
serde_plain::derive_fromstr_from_deserialize!(OnCorrupt);

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$EXPENSES_HOME` and from there it loads `$EXPENSES_HOME/config.json`. It provides
/// paths to other items that are either configurable or are expected in a certain location within
/// the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory and its backups subdirectory, then writes an initial
    /// `config.json`.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the data directory, e.g. `$HOME/expenses`
    /// - `backup_copies` - How many backups of the ledger file to keep
    /// - `data_file` - Where the ledger lives, relative to `dir` or absolute. Defaults to
    ///   `records.json` in `dir`.
    /// - `on_corrupt` - What to do when the ledger cannot be read
    ///
    /// # Errors
    /// - Returns an error if any file operations fail, or if a config file already exists.
    pub fn create(
        dir: impl Into<PathBuf>,
        backup_copies: u32,
        data_file: Option<PathBuf>,
        on_corrupt: OnCorrupt,
    ) -> Result<Self> {
        Self::create_inner(dir.into(), backup_copies, data_file, on_corrupt)
            .pub_result(ErrorType::Config)
    }

    fn create_inner(
        maybe_relative: PathBuf,
        backup_copies: u32,
        data_file: Option<PathBuf>,
        on_corrupt: OnCorrupt,
    ) -> Res<Self> {
        utils::make_dir(&maybe_relative).context("Unable to create the expenses home directory")?;
        let root = utils::canonicalize(&maybe_relative)?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "A config file already exists at '{}'",
                config_path.display()
            )
        }

        let backups = root.join(BACKUPS);
        utils::make_dir(&backups)?;

        let config_file = ConfigFile {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            backup_copies,
            data_file,
            on_corrupt,
        };
        config_file.save(&config_path)?;

        Ok(Self {
            root,
            backups,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that the `expenses_home` exists and that the config file exists
    /// - load the config file
    /// - validate that the backups directory exists
    /// - return the loaded configuration object
    pub fn load(expenses_home: impl Into<PathBuf>) -> Result<Self> {
        Self::load_inner(expenses_home.into()).pub_result(ErrorType::Config)
    }

    fn load_inner(maybe_relative: PathBuf) -> Res<Self> {
        let root = utils::canonicalize(&maybe_relative).context(
            "The expenses home directory is missing, run 'expenses init' to create it",
        )?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}', run 'expenses init' to create it",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path)?;

        let config = Self {
            backups: root.join(BACKUPS),
            root,
            config_path,
            config_file,
        };
        if !config.backups.is_dir() {
            bail!(
                "The backups directory is missing '{}'",
                config.backups.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    pub fn on_corrupt(&self) -> OnCorrupt {
        self.config_file.on_corrupt
    }

    /// Returns the ledger file path. A relative `data_file` is resolved against the home directory.
    pub fn data_file(&self) -> PathBuf {
        let p = self.config_file.data_file();
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }

    /// The storage backing the record store.
    pub fn storage(&self) -> JsonFile {
        JsonFile::new(self.data_file())
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(self)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "expenses",
///   "config_version": 1,
///   "backup_copies": 5,
///   "data_file": "records.json",
///   "on_corrupt": "abort"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "expenses"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Number of backup copies to keep
    #[serde(default = "default_backup_copies")]
    backup_copies: u32,

    /// Path to the ledger file (optional, relative to the home directory or absolute)
    /// Defaults to $EXPENSES_HOME/records.json if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_file: Option<PathBuf>,

    #[serde(default)]
    on_corrupt: OnCorrupt,
}

fn default_backup_copies() -> u32 {
    BACKUP_COPIES
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            backup_copies: BACKUP_COPIES,
            data_file: None,
            on_corrupt: OnCorrupt::default(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let content = utils::read(path)?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.config_version <= CONFIG_VERSION,
            "The config file version ({}) is newer than this program supports ({})",
            config.config_version,
            CONFIG_VERSION
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write_atomic(p, data).context("Unable to write config file")
    }

    /// Gets the ledger file path, which may be relative to the home directory.
    fn data_file(&self) -> PathBuf {
        self.data_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(RECORDS_JSON))
    }
}
