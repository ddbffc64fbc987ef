//! Bounded in-process cache with per-entry time-to-live.
//!
//! # Responsibility
//! - Mirror persisted records for fast tenant-scoped reads.
//! - Bound memory with a capacity limit and entry expiry.
//!
//! # Invariants
//! - At most `capacity` entries are retained once pending maintenance runs.
//! - Expired entries are never served.
//! - `insert` and `update` are upserts; `delete` of an absent key succeeds.

use crate::model::record::{Record, RecordId};
use crate::store::{composite_key, RecordStore, StoreError, StoreResult};
use log::debug;
use moka::sync::Cache;
use std::time::Duration;

pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// `RecordStore` over a concurrent `moka` cache keyed by `composite_key`.
#[derive(Debug)]
pub struct MemoryCacheStore {
    entries: Cache<String, Record>,
    capacity: usize,
    ttl: Duration,
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL)
    }
}

impl MemoryCacheStore {
    /// Creates a cache holding at most `capacity` entries for `ttl` each.
    ///
    /// A zero capacity is clamped to one entry.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = capacity.max(1);
        let entries = Cache::builder()
            .max_capacity(capacity as u64)
            .time_to_live(ttl)
            .build();
        Self {
            entries,
            capacity,
            ttl,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of live entries after pending evictions and expiries are applied.
    pub fn len(&self) -> usize {
        self.entries.run_pending_tasks();
        self.entries.entry_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn put(&self, tenant_id: &str, record: &Record) -> StoreResult<Record> {
        let id = record
            .id
            .filter(|id| !id.is_nil())
            .ok_or_else(|| StoreError::invalid("id"))?;
        if tenant_id.is_empty() {
            return Err(StoreError::invalid("customerID"));
        }

        let mut cached = record.clone();
        cached.tenant_id = tenant_id.to_string();
        self.entries
            .insert(composite_key(tenant_id, id), cached.clone());
        Ok(cached)
    }
}

impl RecordStore for MemoryCacheStore {
    fn insert(&self, tenant_id: &str, record: &Record) -> StoreResult<Record> {
        let cached = self.put(tenant_id, record)?;
        debug!("event=cache_insert module=memory_cache status=ok tenant_id={tenant_id}");
        Ok(cached)
    }

    fn get(&self, tenant_id: &str, id: RecordId) -> StoreResult<Record> {
        match self.entries.get(&composite_key(tenant_id, id)) {
            Some(record) => {
                debug!(
                    "event=cache_get module=memory_cache status=hit tenant_id={} record_id={}",
                    tenant_id, id
                );
                Ok(record)
            }
            None => {
                debug!(
                    "event=cache_get module=memory_cache status=miss tenant_id={} record_id={}",
                    tenant_id, id
                );
                Err(StoreError::NotFound("record"))
            }
        }
    }

    fn update(&self, tenant_id: &str, record: &Record) -> StoreResult<Record> {
        let cached = self.put(tenant_id, record)?;
        debug!("event=cache_update module=memory_cache status=ok tenant_id={tenant_id}");
        Ok(cached)
    }

    fn delete(&self, tenant_id: &str, id: RecordId) -> StoreResult<()> {
        let removed = self
            .entries
            .remove(&composite_key(tenant_id, id))
            .is_some();
        debug!(
            "event=cache_delete module=memory_cache status=ok tenant_id={} record_id={} removed={}",
            tenant_id, id, removed
        );
        Ok(())
    }
}
