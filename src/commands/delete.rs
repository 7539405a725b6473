//! Delete command handler.

use crate::commands::{open_store_for_edit, Out};
use crate::model::{Entry, RecordId};
use crate::{Config, Result};

/// Deletes one expense by id and returns what was deleted. The id is never handed out again.
pub fn delete(config: Config, id: RecordId) -> Result<Out<Entry>> {
    let mut store = open_store_for_edit(&config)?;
    let record = store.delete(id)?;
    let message = format!(
        "Deleted expense {id}: {} {} {}",
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
    use crate::model::Category;
    use crate::store::RecordStore;
    use crate::test::{test_record, TestEnv};

    #[test]
    fn test_delete() {
        let env = TestEnv::new();
        let ids = env.insert_test_records();

        let out = delete(env.config(), ids[0]).unwrap();
        assert_eq!(out.message(), "Deleted expense 1: 2024-01-05 Food 100.00");

        let mut store = RecordStore::open(env.config().storage()).unwrap();
        assert_eq!(store.len(), 2);
        assert!(!store.contains(ids[0]));

        // the next id continues after the deleted one
        let id = store
            .add(test_record("2024-01-07", Category::Other, 1, ""))
            .unwrap();
        assert_eq!(id, RecordId::new(4));
    }

    #[test]
    fn test_delete_missing() {
        let env = TestEnv::new();
        env.insert_test_records();
        let err = delete(env.config(), RecordId::new(10)).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::NotFound);
        let store = RecordStore::open(env.config().storage()).unwrap();
        assert_eq!(store.len(), 3);
    }
}
