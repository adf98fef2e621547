//! In-memory content store.
//!
//! Single-threaded fake of the host store for tests and embedders that do
//! not need persistence. `atomically` snapshots metadata and restores it when
//! the closure fails.

use crate::model::record::{Category, ContentRecord, RecordId};
use crate::repo::record_repo::{ContentStore, RepoError, RepoResult};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};

type MetaMap = BTreeMap<(RecordId, String), String>;

#[derive(Debug, Default)]
pub struct MemoryContentStore {
    records: RefCell<HashMap<RecordId, ContentRecord>>,
    meta: RefCell<MetaMap>,
    in_unit: Cell<bool>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of metadata entries across all records.
    pub fn meta_len(&self) -> usize {
        self.meta.borrow().len()
    }
}

impl ContentStore for MemoryContentStore {
    fn create_record(&self, record: &ContentRecord) -> RepoResult<RecordId> {
        record.validate()?;
        let mut records = self.records.borrow_mut();
        if records.contains_key(&record.id) {
            return Err(RepoError::DuplicateRecord(record.id));
        }
        records.insert(record.id, record.clone());
        Ok(record.id)
    }

    fn get_record(&self, id: RecordId) -> RepoResult<Option<ContentRecord>> {
        Ok(self.records.borrow().get(&id).cloned())
    }

    fn list_records(&self, category: Category) -> RepoResult<Vec<ContentRecord>> {
        let mut records: Vec<ContentRecord> = self
            .records
            .borrow()
            .values()
            .filter(|record| record.category == category)
            .cloned()
            .collect();
        records.sort_by(|left, right| {
            left.title
                .cmp(&right.title)
                .then_with(|| left.id.cmp(&right.id))
        });
        Ok(records)
    }

    fn get_meta(&self, id: RecordId, key: &str) -> RepoResult<Option<String>> {
        Ok(self.meta.borrow().get(&(id, key.to_string())).cloned())
    }

    fn set_meta(&self, id: RecordId, key: &str, value: &str) -> RepoResult<()> {
        self.meta
            .borrow_mut()
            .insert((id, key.to_string()), value.to_string());
        Ok(())
    }

    fn delete_meta(&self, id: RecordId, key: &str) -> RepoResult<()> {
        self.meta.borrow_mut().remove(&(id, key.to_string()));
        Ok(())
    }

    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        E: From<RepoError>,
        F: FnOnce() -> Result<T, E>,
    {
        if self.in_unit.get() {
            return work();
        }

        let snapshot = self.meta.borrow().clone();
        let result = {
            let _unit = UnitGuard::enter(&self.in_unit);
            work()
        };
        if result.is_err() {
            *self.meta.borrow_mut() = snapshot;
        }
        result
    }
}

/// Marks a unit as open; clears the mark on drop, unwinding included.
struct UnitGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> UnitGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self { flag }
    }
}

impl Drop for UnitGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryContentStore;
    use crate::model::record::{Category, ContentRecord};
    use crate::repo::record_repo::{ContentStore, RepoError};
    use std::panic::AssertUnwindSafe;

    #[test]
    fn failed_unit_restores_metadata() {
        let store = MemoryContentStore::new();
        let record = ContentRecord::new(Category::Primary, "About", "about");
        store.set_meta(record.id, "key", "before").unwrap();

        let result: Result<(), RepoError> = store.atomically(|| {
            store.set_meta(record.id, "key", "after")?;
            store.set_meta(record.id, "other", "value")?;
            Err(RepoError::InvalidData("boom".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(
            store.get_meta(record.id, "key").unwrap().as_deref(),
            Some("before")
        );
        assert_eq!(store.get_meta(record.id, "other").unwrap(), None);
        assert_eq!(store.meta_len(), 1);
    }

    #[test]
    fn unit_after_a_caught_panic_still_rolls_back() {
        let store = MemoryContentStore::new();
        let record = ContentRecord::new(Category::Primary, "About", "about");

        let panicked = std::panic::catch_unwind(AssertUnwindSafe(|| {
            let _: Result<(), RepoError> = store.atomically(|| panic!("work panicked"));
        }));
        assert!(panicked.is_err());

        let result: Result<(), RepoError> = store.atomically(|| {
            store.set_meta(record.id, "key", "value")?;
            Err(RepoError::InvalidData("boom".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(store.meta_len(), 0);
    }

    #[test]
    fn duplicate_records_are_rejected() {
        let store = MemoryContentStore::new();
        let record = ContentRecord::new(Category::Secondary, "About", "about");
        store.create_record(&record).unwrap();
        let err = store.create_record(&record).unwrap_err();
        assert!(matches!(err, RepoError::DuplicateRecord(id) if id == record.id));
    }
}
