//! Command handlers for the expenses CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod add;
mod delete;
mod export;
mod init;
mod query;
mod update;

use crate::config::OnCorrupt;
use crate::error::ErrorType;
use crate::store::RecordStore;
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info, warn};

pub use add::add;
pub use delete::delete;
pub use export::export;
pub use init::init;
pub use query::{list, show, summary};
pub use update::update;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data and a report for the terminal.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,

    /// Text meant for stdout, such as a table of records.
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<String>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
            report: None,
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
            report: None,
        }
    }

    /// Attach a report to be printed to stdout.
    pub fn with_report(mut self, report: impl Into<String>) -> Self {
        self.report = Some(report.into());
        self
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    pub fn report(&self) -> Option<&str> {
        self.report.as_deref()
    }

    /// Print the report (if it exists) to stdout, the message to `info!` and the structured data
    /// (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        if let Some(report) = self.report() {
            println!("{report}");
        }
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Opens the ledger for reading.
///
/// When the ledger file cannot be understood and the config says `start_empty`, the file is moved
/// into the backups directory and an empty store is returned instead of the error.
pub(crate) fn open_store(config: &Config) -> Result<RecordStore> {
    match RecordStore::open(config.storage()) {
        Err(e)
            if e.error_type() == ErrorType::CorruptData
                && config.on_corrupt() == OnCorrupt::StartEmpty =>
        {
            let moved = config.backup().quarantine_ledger()?;
            warn!(
                "{e}. The unreadable ledger was moved to {} and an empty ledger was started",
                moved.display()
            );
            RecordStore::open(config.storage())
        }
        result => result,
    }
}

/// Opens the ledger for a mutation. The ledger file is backed up first and mutations are logged.
pub(crate) fn open_store_for_edit(config: &Config) -> Result<RecordStore> {
    let mut store = open_store(config)?;
    config.backup().copy_ledger()?;
    store.subscribe(|event| debug!("Ledger changed: {event:?}"));
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use crate::utils;

    #[test]
    fn test_out_report() {
        let out: Out<()> = Out::new_message("done").with_report("table");
        assert_eq!(out.message(), "done");
        assert_eq!(out.report(), Some("table"));
        assert!(out.structure().is_none());
    }

    #[test]
    fn test_open_store_without_ledger() {
        let env = TestEnv::new();
        let store = open_store(&env.config()).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_open_store_corrupt_aborts() {
        let env = TestEnv::new();
        let config = env.config();
        utils::write_atomic(&config.data_file(), "{ not json").unwrap();

        let err = open_store(&config).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::CorruptData);
        assert_eq!(utils::read(&config.data_file()).unwrap(), "{ not json");
    }

    #[test]
    fn test_open_store_corrupt_starts_empty() {
        let env = TestEnv::with_on_corrupt(OnCorrupt::StartEmpty);
        let config = env.config();
        utils::write_atomic(&config.data_file(), "{ not json").unwrap();

        let store = open_store(&config).unwrap();
        assert!(store.is_empty());
        assert!(!config.data_file().exists());
        let quarantined: Vec<String> = utils::file_names(config.backups())
            .unwrap()
            .into_iter()
            .map(|(_, name)| name)
            .filter(|name| name.starts_with("corrupt."))
            .collect();
        assert_eq!(quarantined.len(), 1);
    }

    #[test]
    fn test_open_store_for_edit_takes_backup() {
        let env = TestEnv::new();
        env.insert_test_records();
        let config = env.config();

        let store = open_store_for_edit(&config).unwrap();
        assert_eq!(store.len(), 3);
        let backups = utils::file_names(config.backups()).unwrap();
        assert_eq!(backups.len(), 1);
        assert!(backups[0].1.starts_with("records."));
    }
}
