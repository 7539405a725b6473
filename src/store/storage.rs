//! Durable storage for the full set of records.
//!
//! The store talks to storage through the `Storage` trait; `JsonFile` is the implementation used by
//! the application. It writes a versioned envelope:
//!
//! ```json
//! {
//!   "app_name": "expenses",
//!   "format_version": 1,
//!   "next_id": 4,
//!   "records": [
//!     { "id": 1, "date": "2024-01-05", "category": "Food", "amount": 100.0, "note": "" }
//!   ]
//! }
//! ```
//!
//! Files from before the envelope existed are a bare array of `date`, `category`, `amount`, `note`
//! objects. Those still load; their records get ids `1..=n` in file order and the next save
//! upgrades the file.

use crate::error::{Error, ErrorType, IntoResult};
use crate::model::{date_format, Amount, Category, Entry, Record, RecordId};
use crate::{utils, Result};
use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

pub(crate) const APP_NAME: &str = "expenses";
pub(crate) const FORMAT_VERSION: u32 = 1;
const FIRST_ID: RecordId = RecordId::new(1);

/// Everything that is persisted: the records in insertion order and the next id to hand out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerState {
    pub entries: Vec<Entry>,
    pub next_id: RecordId,
}

impl Default for LedgerState {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: FIRST_ID,
        }
    }
}

/// Loads and saves the complete record set.
pub trait Storage {
    /// Reads the stored records. Nothing having been stored yet is not an error; an empty
    /// `LedgerState` is returned. Stored data that cannot be understood is an
    /// `ErrorType::CorruptData` error.
    fn load(&self) -> Result<LedgerState>;

    /// Replaces everything stored with `entries` and `next_id`. Readers must never observe a
    /// partially written result.
    fn save(&self, entries: &[Entry], next_id: RecordId) -> Result<()>;
}

/// Stores the ledger as a single JSON file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for JsonFile {
    fn load(&self) -> Result<LedgerState> {
        let content = match utils::read_optional(&self.path).pub_result(ErrorType::Io)? {
            Some(content) => content,
            None => {
                debug!(
                    "No ledger file at {}, starting with an empty ledger",
                    self.path.display()
                );
                return Ok(LedgerState::default());
            }
        };
        let state = parse_ledger(&content)
            .map_err(|e| e.context(format!("Unable to load ledger file {}", self.path.display())))?;
        debug!(
            "Loaded {} record(s) from {}",
            state.entries.len(),
            self.path.display()
        );
        Ok(state)
    }

    fn save(&self, entries: &[Entry], next_id: RecordId) -> Result<()> {
        let file = LedgerFile {
            app_name: APP_NAME.to_string(),
            format_version: FORMAT_VERSION,
            next_id,
            records: entries.iter().map(StoredRecord::from).collect(),
        };
        let json = serde_json::to_string_pretty(&file)
            .context("Unable to serialize the ledger")
            .pub_result(ErrorType::Io)?;
        if let Some(dir) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            utils::make_dir(dir).pub_result(ErrorType::Io)?;
        }
        utils::write_atomic(&self.path, json).pub_result(ErrorType::Io)?;
        trace!(
            "Wrote {} record(s) to {}",
            entries.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// The on-disk envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LedgerFile {
    app_name: String,
    format_version: u32,
    next_id: RecordId,
    records: Vec<StoredRecord>,
}

/// A record as written in the envelope, with its id alongside the four record fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRecord {
    id: RecordId,
    #[serde(with = "date_format")]
    date: NaiveDate,
    category: Category,
    amount: Amount,
    #[serde(default)]
    note: String,
}

impl From<&Entry> for StoredRecord {
    fn from(entry: &Entry) -> Self {
        Self {
            id: entry.id,
            date: entry.record.date,
            category: entry.record.category,
            amount: entry.record.amount,
            note: entry.record.note.clone(),
        }
    }
}

impl From<StoredRecord> for Entry {
    fn from(stored: StoredRecord) -> Self {
        Entry::new(
            stored.id,
            Record::new(stored.date, stored.category, stored.amount, stored.note),
        )
    }
}

/// Parses the contents of a ledger file, either the envelope or the legacy bare array.
fn parse_ledger(content: &str) -> Result<LedgerState> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| Error::corrupt(format!("The ledger is not valid JSON: {e}")))?;
    let state = match value {
        Value::Array(_) => parse_legacy(value)?,
        Value::Object(_) => parse_envelope(value)?,
        _ => {
            return Err(Error::corrupt(
                "The ledger must be a JSON object or an array of records",
            ))
        }
    };
    validate_amounts(&state.entries)?;
    Ok(state)
}

fn parse_legacy(value: Value) -> Result<LedgerState> {
    let records: Vec<Record> = serde_json::from_value(value)
        .map_err(|e| Error::corrupt(format!("Invalid record in legacy ledger: {e}")))?;
    debug!("Assigning ids to {} legacy record(s)", records.len());
    let entries: Vec<Entry> = records
        .into_iter()
        .zip(FIRST_ID.value()..)
        .map(|(record, id)| Entry::new(RecordId::new(id), record))
        .collect();
    let next_id = RecordId::new(FIRST_ID.value() + entries.len() as u64);
    Ok(LedgerState { entries, next_id })
}

fn parse_envelope(value: Value) -> Result<LedgerState> {
    let file: LedgerFile = serde_json::from_value(value)
        .map_err(|e| Error::corrupt(format!("Invalid ledger structure: {e}")))?;
    if file.app_name != APP_NAME {
        return Err(Error::corrupt(format!(
            "Invalid app_name in ledger: expected '{APP_NAME}', got '{}'",
            file.app_name
        )));
    }
    if file.format_version > FORMAT_VERSION {
        return Err(Error::corrupt(format!(
            "The ledger format version ({}) is newer than the supported version ({FORMAT_VERSION})",
            file.format_version
        )));
    }

    let entries: Vec<Entry> = file.records.into_iter().map(Entry::from).collect();
    for pair in entries.windows(2) {
        if pair[1].id <= pair[0].id {
            return Err(Error::corrupt(format!(
                "Record ids must be unique and increasing, found {} after {}",
                pair[1].id, pair[0].id
            )));
        }
    }
    if entries.first().is_some_and(|e| e.id < FIRST_ID) {
        return Err(Error::corrupt("Record ids start at 1, found 0"));
    }

    let min_next = match entries.last() {
        Some(last) => last.id.next().ok_or_else(|| {
            Error::corrupt(format!("Record id {} leaves no room for new ids", last.id))
        })?,
        None => FIRST_ID,
    };
    let next_id = if file.next_id < min_next {
        warn!(
            "The ledger's next_id ({}) would reuse an id, using {min_next} instead",
            file.next_id
        );
        min_next
    } else {
        file.next_id
    };
    Ok(LedgerState { entries, next_id })
}

fn validate_amounts(entries: &[Entry]) -> Result<()> {
    match entries.iter().find(|e| e.record.amount.is_negative()) {
        Some(e) => Err(Error::corrupt(format!(
            "Record {} has a negative amount ({})",
            e.id, e.record.amount
        ))),
        None => Ok(()),
    }
}
