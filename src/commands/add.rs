//! Add command handler.

use crate::args::AddArgs;
use crate::commands::{open_store_for_edit, Out};
use crate::model::{Entry, Record};
use crate::{Config, Result};
use chrono::Local;

/// Records a new expense and returns it with its assigned id. A missing date means today.
pub fn add(config: Config, args: AddArgs) -> Result<Out<Entry>> {
    let date = args.date().unwrap_or_else(|| Local::now().date_naive());
    let record = Record::new(date, args.category(), args.amount(), args.note());

    let mut store = open_store_for_edit(&config)?;
    let id = store.add(record.clone())?;

    let message = format!(
        "Added expense {id}: {} {} {}",
        record.date,
        record.category,
        record.amount.grouped()
    );
    Ok(Out::new(message, Entry::new(id, record)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;
    use crate::model::{Amount, Category, RecordId};
    use crate::store::RecordStore;
    use crate::test::{date, TestEnv};
    use crate::utils;
    use crate::OnCorrupt;
    use std::path::Path;
    use tempfile::TempDir;

    #[test]
    fn test_add() {
        let env = TestEnv::new();
        let args = AddArgs::new(
            Some(date("2024-03-01")),
            Category::Entertainment,
            Amount::from(1500),
            "concert",
        );
        let out = add(env.config(), args).unwrap();
        assert_eq!(out.message(), "Added expense 1: 2024-03-01 Entertainment 1,500.00");

        let entry = out.structure().unwrap();
        assert_eq!(entry.id, RecordId::new(1));

        let store = RecordStore::open(env.config().storage()).unwrap();
        assert_eq!(store.get(RecordId::new(1)).unwrap(), entry.record());
    }

    #[test]
    fn test_add_defaults_to_today() {
        let env = TestEnv::new();
        let args = AddArgs::new(None, Category::Food, Amount::from(5), "");
        let out = add(env.config(), args).unwrap();
        assert_eq!(
            out.structure().unwrap().record.date,
            Local::now().date_naive()
        );
    }

    #[test]
    fn test_add_rejects_zero_amount() {
        let env = TestEnv::new();
        env.insert_test_records();
        let args = AddArgs::new(Some(date("2024-03-01")), Category::Food, Amount::ZERO, "");
        let err = add(env.config(), args).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);

        let store = RecordStore::open(env.config().storage()).unwrap();
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_add_with_nested_data_file() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("expenses");
        crate::commands::init(&home, 5, Some(Path::new("data/ledger.json")), OnCorrupt::Abort)
            .unwrap();
        let config = Config::load(&home).unwrap();

        let args = AddArgs::new(Some(date("2024-03-01")), Category::Food, Amount::from(12), "");
        add(config.clone(), args).unwrap();

        assert!(config.data_file().ends_with("data/ledger.json"));
        assert!(config.data_file().is_file());
        let store = RecordStore::open(config.storage()).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_rejected_adds_do_not_use_up_backups() {
        let env = TestEnv::new();
        env.insert_test_records();
        for _ in 0..3 {
            let args = AddArgs::new(Some(date("2024-03-01")), Category::Food, Amount::ZERO, "");
            add(env.config(), args).unwrap_err();
        }
        let backups = utils::file_names(env.config().backups()).unwrap();
        assert_eq!(backups.len(), 1);
    }
}
