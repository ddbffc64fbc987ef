//! Tenant-partitioned in-memory persistent store.
//!
//! # Responsibility
//! - Act as the source of truth for records within one process.
//! - Generate record identifiers on insert.
//!
//! # Invariants
//! - One map keyed by `composite_key` holds every tenant's records.
//! - All map access goes through a single `RwLock`.
//! - Records live until process exit; there is no expiry or eviction.

use crate::model::record::{Record, RecordId};
use crate::store::{
    composite_key, validate_get, validate_insert, validate_update, RecordStore, StoreError,
    StoreResult,
};
use log::{debug, info};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Map-backed `RecordStore`, safe for concurrent callers.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: RwLock<HashMap<String, Record>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records across all tenants.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<String, Record>>> {
        self.records
            .read()
            .map_err(|_| StoreError::internal("record map lock poisoned"))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<String, Record>>> {
        self.records
            .write()
            .map_err(|_| StoreError::internal("record map lock poisoned"))
    }
}

impl RecordStore for MemoryRecordStore {
    fn insert(&self, tenant_id: &str, record: &Record) -> StoreResult<Record> {
        validate_insert(tenant_id, record)?;
        info!(
            "event=record_insert module=memory_store status=start tenant_id={} url={}",
            tenant_id, record.url
        );

        let mut records = self.write()?;
        let mut id = RecordId::generate();
        // v4 collisions are practically impossible, but never overwrite.
        while records.contains_key(&composite_key(tenant_id, id)) {
            id = RecordId::generate();
        }

        let stored = record.stamped(id, tenant_id);
        records.insert(composite_key(tenant_id, id), stored.clone());

        debug!(
            "event=record_insert module=memory_store status=ok tenant_id={} record_id={}",
            tenant_id, id
        );
        Ok(stored)
    }

    fn get(&self, tenant_id: &str, id: RecordId) -> StoreResult<Record> {
        validate_get(tenant_id, id)?;
        info!(
            "event=record_get module=memory_store status=start tenant_id={} record_id={}",
            tenant_id, id
        );

        let records = self.read()?;
        let record = records
            .get(&composite_key(tenant_id, id))
            .cloned()
            .ok_or(StoreError::NotFound("record"))?;

        debug!(
            "event=record_get module=memory_store status=ok tenant_id={} record_id={}",
            tenant_id, id
        );
        Ok(record)
    }

    fn update(&self, tenant_id: &str, record: &Record) -> StoreResult<Record> {
        let id = validate_update(tenant_id, record)?;
        info!(
            "event=record_update module=memory_store status=start tenant_id={} record_id={}",
            tenant_id, id
        );

        let key = composite_key(tenant_id, id);
        let mut records = self.write()?;
        let slot = records.get_mut(&key).ok_or(StoreError::NotFound("record"))?;

        // Tenant comes from the key, never from the payload.
        let mut replacement = record.clone();
        replacement.tenant_id = tenant_id.to_string();
        *slot = replacement.clone();

        debug!(
            "event=record_update module=memory_store status=ok tenant_id={} record_id={}",
            tenant_id, id
        );
        Ok(replacement)
    }

    fn delete(&self, _tenant_id: &str, _id: RecordId) -> StoreResult<()> {
        Err(StoreError::Unimplemented("delete"))
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryRecordStore;
    use crate::model::record::Record;
    use crate::store::{composite_key, RecordStore, StoreError};
    use std::sync::Arc;

    #[test]
    fn insert_stores_record_at_composite_key() {
        let store = MemoryRecordStore::new();
        let stored = store
            .insert("test-customer", &Record::new("test-url", Vec::new()))
            .unwrap();

        let records = store.records.read().unwrap();
        let key = composite_key("test-customer", stored.id.unwrap());
        assert_eq!(records.get(&key), Some(&stored));
    }

    #[test]
    fn len_counts_all_tenants() {
        let store = MemoryRecordStore::new();
        assert!(store.is_empty().unwrap());
        store.insert("a", &Record::new("u", Vec::new())).unwrap();
        store.insert("b", &Record::new("u", Vec::new())).unwrap();
        assert_eq!(store.len().unwrap(), 2);
    }

    #[test]
    fn poisoned_lock_is_reported_not_read_as_empty() {
        let store = Arc::new(MemoryRecordStore::new());
        store.insert("a", &Record::new("u", Vec::new())).unwrap();

        let poisoner = Arc::clone(&store);
        let joined = std::thread::spawn(move || {
            let _guard = poisoner.records.write().unwrap();
            panic!("poison record map");
        })
        .join();
        assert!(joined.is_err());

        assert!(matches!(store.len(), Err(StoreError::Internal(_))));
        assert!(store.is_empty().is_err());
        assert!(store.insert("a", &Record::new("u", Vec::new())).is_err());
    }
}
