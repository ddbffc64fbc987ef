//! Cache-aside reads and write-through writes over two record stores.
//!
//! # Responsibility
//! - Decide which tier is consulted first for each operation.
//! - Tolerate or compensate cache failures, surfacing only what the caller
//!   must act on.
//!
//! # Invariants
//! - The persistent tier is the source of truth: its insert/update errors are
//!   returned unchanged and the cache is left untouched.
//! - Cache insert failures and cache read failures are never surfaced.
//! - After a failed cache update the stale cache entry is deleted; if that
//!   delete also fails the call fails, even though the write persisted.
//! - A read miss does not backfill the cache.
//! - `delete` drops the cache entry before delegating to the persistent tier,
//!   so a persistent delete never leaves a cached copy behind.
//! - There is no cross-tier atomicity; readers may briefly observe the
//!   pre-update cache value.

use crate::model::record::{Record, RecordId};
use crate::store::{RecordStore, StoreError, StoreResult};
use log::{debug, error, info, warn};

/// Terminal state of a combined update once the persistent write succeeded.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// The cache mirrored the new record.
    CacheWritten(Record),
    /// The cache mirror failed and the stale entry was removed.
    Compensated { record: Record, cause: StoreError },
    /// Neither mirroring nor removal worked; the cache may serve stale data.
    Inconsistent { record: Record, error: StoreError },
}

impl UpdateOutcome {
    /// The persisted record, whatever happened to the cache.
    pub fn record(&self) -> &Record {
        match self {
            Self::CacheWritten(record)
            | Self::Compensated { record, .. }
            | Self::Inconsistent { record, .. } => record,
        }
    }

    pub fn is_consistent(&self) -> bool {
        !matches!(self, Self::Inconsistent { .. })
    }

    /// Collapses the outcome into the `RecordStore::update` result.
    pub fn into_result(self) -> StoreResult<Record> {
        match self {
            Self::CacheWritten(record) | Self::Compensated { record, .. } => Ok(record),
            Self::Inconsistent { error, .. } => Err(error),
        }
    }
}

/// `RecordStore` composing a cache tier `C` and a persistent tier `P`.
pub struct CombinedStore<C, P> {
    cache: C,
    persistent: P,
}

impl<C: RecordStore, P: RecordStore> CombinedStore<C, P> {
    pub fn new(cache: C, persistent: P) -> Self {
        Self { cache, persistent }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn persistent(&self) -> &P {
        &self.persistent
    }

    /// Persists the update, then drives the cache through mirror or
    /// compensation and reports which terminal state was reached.
    ///
    /// Returns `Err` only when the persistent write itself failed.
    pub fn update_with_outcome(
        &self,
        tenant_id: &str,
        record: &Record,
    ) -> StoreResult<UpdateOutcome> {
        let requested_id = record.id.unwrap_or_else(RecordId::nil);
        info!(
            "event=record_update module=combined_store status=start tenant_id={} record_id={}",
            tenant_id, requested_id
        );

        let persisted = match self.persistent.update(tenant_id, record) {
            Ok(persisted) => persisted,
            Err(err) => {
                warn!(
                    "event=record_update module=combined_store status=error tier=persistent tenant_id={} record_id={} error={}",
                    tenant_id, requested_id, err
                );
                return Err(err);
            }
        };
        let id = persisted.id.unwrap_or(requested_id);
        Ok(self.mirror_persisted(tenant_id, id, persisted))
    }

    /// `persisted` state: mirror the new record into the cache.
    fn mirror_persisted(&self, tenant_id: &str, id: RecordId, record: Record) -> UpdateOutcome {
        match self.cache.update(tenant_id, &record) {
            Ok(_) => {
                debug!(
                    "event=record_update module=combined_store status=ok tenant_id={} record_id={}",
                    tenant_id, id
                );
                UpdateOutcome::CacheWritten(record)
            }
            Err(cause) => {
                warn!(
                    "event=record_update module=combined_store status=compensating tier=cache tenant_id={} record_id={} error={}",
                    tenant_id, id, cause
                );
                self.compensate(tenant_id, id, record, cause)
            }
        }
    }

    /// `compensating` state: remove the stale cache entry.
    fn compensate(
        &self,
        tenant_id: &str,
        id: RecordId,
        record: Record,
        cause: StoreError,
    ) -> UpdateOutcome {
        match self.cache.delete(tenant_id, id) {
            Ok(()) => {
                debug!(
                    "event=record_update module=combined_store status=compensated tenant_id={} record_id={}",
                    tenant_id, id
                );
                UpdateOutcome::Compensated { record, cause }
            }
            Err(error) => {
                error!(
                    "event=record_update module=combined_store status=inconsistent tenant_id={} record_id={} update_error={} delete_error={}",
                    tenant_id, id, cause, error
                );
                UpdateOutcome::Inconsistent { record, error }
            }
        }
    }
}

impl<C: RecordStore, P: RecordStore> RecordStore for CombinedStore<C, P> {
    fn insert(&self, tenant_id: &str, record: &Record) -> StoreResult<Record> {
        info!("event=record_insert module=combined_store status=start tenant_id={tenant_id}");
        let persisted = match self.persistent.insert(tenant_id, record) {
            Ok(persisted) => persisted,
            Err(err) => {
                warn!(
                    "event=record_insert module=combined_store status=error tier=persistent tenant_id={} error={}",
                    tenant_id, err
                );
                return Err(err);
            }
        };

        let record_id = persisted.id.unwrap_or_else(RecordId::nil);
        if let Err(err) = self.cache.insert(tenant_id, &persisted) {
            warn!(
                "event=record_insert module=combined_store status=degraded tier=cache tenant_id={} record_id={} error={}",
                tenant_id, record_id, err
            );
        }

        debug!(
            "event=record_insert module=combined_store status=ok tenant_id={} record_id={}",
            tenant_id, record_id
        );
        Ok(persisted)
    }

    fn get(&self, tenant_id: &str, id: RecordId) -> StoreResult<Record> {
        info!(
            "event=record_get module=combined_store status=start tenant_id={} record_id={}",
            tenant_id, id
        );
        match self.cache.get(tenant_id, id) {
            Ok(record) => {
                debug!(
                    "event=record_get module=combined_store status=ok tier=cache tenant_id={} record_id={}",
                    tenant_id, id
                );
                return Ok(record);
            }
            Err(err) => info!(
                "event=record_get module=combined_store status=miss tier=cache tenant_id={} record_id={} error={}",
                tenant_id, id, err
            ),
        }

        match self.persistent.get(tenant_id, id) {
            Ok(record) => {
                debug!(
                    "event=record_get module=combined_store status=ok tier=persistent tenant_id={} record_id={}",
                    tenant_id, id
                );
                Ok(record)
            }
            Err(err) => {
                warn!(
                    "event=record_get module=combined_store status=error tier=persistent tenant_id={} record_id={} error={}",
                    tenant_id, id, err
                );
                Err(err)
            }
        }
    }

    fn update(&self, tenant_id: &str, record: &Record) -> StoreResult<Record> {
        self.update_with_outcome(tenant_id, record)?.into_result()
    }

    fn delete(&self, tenant_id: &str, id: RecordId) -> StoreResult<()> {
        self.cache.delete(tenant_id, id)?;
        self.persistent.delete(tenant_id, id)
    }
}
