//! Cache placeholder for deployments without a real cache.

use crate::model::record::{Record, RecordId};
use crate::store::{RecordStore, StoreError, StoreResult};
use log::debug;

/// Accepts every call without storing anything.
///
/// Reads always miss, so the combined store's fallback path carries all
/// correctness.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpCacheStore;

impl NoOpCacheStore {
    pub fn new() -> Self {
        Self
    }
}

impl RecordStore for NoOpCacheStore {
    fn insert(&self, tenant_id: &str, record: &Record) -> StoreResult<Record> {
        debug!("event=cache_insert module=noop_cache status=skipped tenant_id={tenant_id}");
        Ok(record.clone())
    }

    fn get(&self, tenant_id: &str, id: RecordId) -> StoreResult<Record> {
        debug!(
            "event=cache_get module=noop_cache status=miss tenant_id={} record_id={}",
            tenant_id, id
        );
        Err(StoreError::NotFound("record"))
    }

    fn update(&self, tenant_id: &str, record: &Record) -> StoreResult<Record> {
        debug!("event=cache_update module=noop_cache status=skipped tenant_id={tenant_id}");
        Ok(record.clone())
    }

    fn delete(&self, tenant_id: &str, id: RecordId) -> StoreResult<()> {
        debug!(
            "event=cache_delete module=noop_cache status=skipped tenant_id={} record_id={}",
            tenant_id, id
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::NoOpCacheStore;
    use crate::model::record::{Record, RecordId};
    use crate::store::RecordStore;

    #[test]
    fn writes_succeed_and_reads_always_miss() {
        let cache = NoOpCacheStore::new();
        let id = RecordId::generate();
        let record = Record::new("u", Vec::new()).with_id(id);

        assert_eq!(cache.insert("t", &record).unwrap(), record);
        assert_eq!(cache.update("t", &record).unwrap(), record);
        assert!(cache.get("t", id).unwrap_err().is_not_found());
        cache.delete("t", id).unwrap();
    }
}
