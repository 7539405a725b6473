//! The record store: the single owner of all expense records.
//!
//! Every mutation is written through to `Storage` before it returns. If the write fails, the
//! in-memory change is undone and the error is returned, so memory and disk never disagree.

mod storage;

pub use storage::{JsonFile, LedgerState, Storage};

use crate::error::Error;
use crate::model::{Entry, Record, RecordId};
use crate::Result;
use serde::Serialize;
use std::fmt::{Debug, Formatter};
use tracing::{debug, info};

/// Sent to subscribers after a mutation has been applied and saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "event", content = "id")]
pub enum StoreEvent {
    Added(RecordId),
    Updated(RecordId),
    Deleted(RecordId),
}

type Observer = Box<dyn FnMut(&StoreEvent)>;

/// Owns the records in insertion order and addresses them by `RecordId`.
///
/// Ids are handed out in increasing order and records are only ever appended, so `entries` is
/// always sorted by id.
pub struct RecordStore<S: Storage = JsonFile> {
    storage: S,
    entries: Vec<Entry>,
    next_id: RecordId,
    observers: Vec<Observer>,
}

impl<S: Storage> RecordStore<S> {
    /// Creates a store hydrated from `storage`.
    pub fn open(storage: S) -> Result<Self> {
        let LedgerState { entries, next_id } = storage.load()?;
        info!("Opened ledger with {} record(s)", entries.len());
        Ok(Self {
            storage,
            entries,
            next_id,
            observers: Vec::new(),
        })
    }

    /// Validates and appends `record`, returning its newly assigned id.
    ///
    /// # Errors
    /// - `ErrorType::Validation` if the amount is not greater than zero, or if no ids are left.
    /// - `ErrorType::Io` if the record could not be saved. The store is left unchanged.
    pub fn add(&mut self, record: Record) -> Result<RecordId> {
        validate(&record)?;
        let id = self.next_id;
        let next_id = id
            .next()
            .ok_or_else(|| Error::validation(format!("No record ids are left after {id}")))?;

        self.entries.push(Entry::new(id, record));
        if let Err(e) = self.storage.save(&self.entries, next_id) {
            self.entries.pop();
            return Err(e.context(format!("Unable to add record {id}")));
        }
        self.next_id = next_id;

        debug!("Added record {id}");
        self.notify(StoreEvent::Added(id));
        Ok(id)
    }

    /// Replaces the fields of record `id`, keeping its id and its place in insertion order.
    ///
    /// A record with a non-positive amount is rejected and the stored record is left exactly as it
    /// was, so the caller can correct the value and try again.
    ///
    /// # Errors
    /// - `ErrorType::NotFound` if there is no record `id`.
    /// - `ErrorType::Validation` if the new amount is not greater than zero.
    /// - `ErrorType::Io` if the change could not be saved. The store is left unchanged.
    pub fn update(&mut self, id: RecordId, record: Record) -> Result<()> {
        let ix = self.position(id)?;
        validate(&record)?;

        let previous = std::mem::replace(&mut self.entries[ix].record, record);
        if let Err(e) = self.storage.save(&self.entries, self.next_id) {
            self.entries[ix].record = previous;
            return Err(e.context(format!("Unable to update record {id}")));
        }

        debug!("Updated record {id}");
        self.notify(StoreEvent::Updated(id));
        Ok(())
    }

    /// Removes record `id` and returns it. The ids of all other records are unaffected.
    ///
    /// # Errors
    /// - `ErrorType::NotFound` if there is no record `id`.
    /// - `ErrorType::Io` if the change could not be saved. The store is left unchanged.
    pub fn delete(&mut self, id: RecordId) -> Result<Record> {
        let ix = self.position(id)?;

        let removed = self.entries.remove(ix);
        if let Err(e) = self.storage.save(&self.entries, self.next_id) {
            self.entries.insert(ix, removed);
            return Err(e.context(format!("Unable to delete record {id}")));
        }

        debug!("Deleted record {id}");
        self.notify(StoreEvent::Deleted(id));
        Ok(removed.record)
    }

    /// Returns record `id`, or an `ErrorType::NotFound` error.
    pub fn get(&self, id: RecordId) -> Result<&Record> {
        self.position(id).map(|ix| &self.entries[ix].record)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.position(id).is_ok()
    }

    /// A snapshot of every record in insertion order. Later mutations do not affect it.
    pub fn list(&self) -> Vec<Entry> {
        self.entries.clone()
    }

    /// Borrows the records in insertion order, for read-only queries.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The id the next successful `add` will assign.
    pub fn next_id(&self) -> RecordId {
        self.next_id
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Registers `observer` to be called after every successful mutation.
    pub fn subscribe(&mut self, observer: impl FnMut(&StoreEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn position(&self, id: RecordId) -> Result<usize> {
        self.entries
            .binary_search_by_key(&id, |e| e.id)
            .map_err(|_| Error::not_found(id))
    }

    fn notify(&mut self, event: StoreEvent) {
        for observer in self.observers.iter_mut() {
            observer(&event);
        }
    }
}

impl<S: Storage + Debug> Debug for RecordStore<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("storage", &self.storage)
            .field("entries", &self.entries.len())
            .field("next_id", &self.next_id)
            .field("observers", &self.observers.len())
            .finish()
    }
}

fn validate(record: &Record) -> Result<()> {
    if record.amount.is_positive() {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "Amount must be greater than zero, got {}",
            record.amount
        )))
    }
}
