//! A personal expense ledger.
//!
//! `RecordStore` owns the records and writes every change through to a JSON file. The `query`
//! module derives filtered, sorted, grouped and summed views from a snapshot of the store, and
//! `export` renders a view as CSV. The `args` and `commands` modules are the command line front
//! end built on top of them.

pub mod args;
mod backup;
pub mod commands;
mod config;
mod error;
pub mod export;
pub mod model;
pub mod query;
pub mod store;
mod utils;


pub use backup::Backup;
pub use config::{Config, OnCorrupt};
pub use error::{Error, ErrorType, Result};
pub use store::{RecordStore, StoreEvent};
