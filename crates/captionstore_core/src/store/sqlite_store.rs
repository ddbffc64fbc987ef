//! SQLite-backed persistent record store.
//!
//! # Responsibility
//! - Provide a durable `RecordStore` with the same contract as
//!   `MemoryRecordStore`.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Rows are keyed by `(tenant_id, id)`; ids are stored in hex form.
//! - Validation runs before any SQL statement.
//! - Persisted rows that fail to decode are reported, never masked.

use crate::model::record::{Record, RecordId};
use crate::store::{
    validate_get, validate_insert, validate_update, RecordStore, StoreError, StoreResult,
};
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Mutex, MutexGuard};

/// `RecordStore` over one SQLite connection.
///
/// The connection is not `Sync`, so access is serialized by a mutex.
pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
}

impl SqliteRecordStore {
    /// Wraps a connection returned by `open_db` or `open_db_in_memory`.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::internal("sqlite connection lock poisoned"))
    }
}

impl RecordStore for SqliteRecordStore {
    fn insert(&self, tenant_id: &str, record: &Record) -> StoreResult<Record> {
        validate_insert(tenant_id, record)?;
        info!(
            "event=record_insert module=sqlite_store status=start tenant_id={} url={}",
            tenant_id, record.url
        );

        let id = RecordId::generate();
        let id_hex = id.to_hex();
        let stored = record.stamped(id, tenant_id);
        let captions = encode_captions(&stored.captions)?;

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO records (tenant_id, id, url, captions) VALUES (?1, ?2, ?3, ?4);",
            params![tenant_id, id_hex, stored.url.as_str(), captions],
        )?;

        debug!(
            "event=record_insert module=sqlite_store status=ok tenant_id={} record_id={}",
            tenant_id, id_hex
        );
        Ok(stored)
    }

    fn get(&self, tenant_id: &str, id: RecordId) -> StoreResult<Record> {
        validate_get(tenant_id, id)?;
        info!(
            "event=record_get module=sqlite_store status=start tenant_id={} record_id={}",
            tenant_id, id
        );

        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT url, captions FROM records WHERE tenant_id = ?1 AND id = ?2;",
                params![tenant_id, id.to_hex()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        let (url, captions) = row.ok_or(StoreError::NotFound("record"))?;
        let record = Record {
            id: Some(id),
            tenant_id: tenant_id.to_string(),
            url,
            captions: decode_captions(&captions)?,
        };

        debug!(
            "event=record_get module=sqlite_store status=ok tenant_id={} record_id={}",
            tenant_id, id
        );
        Ok(record)
    }

    fn update(&self, tenant_id: &str, record: &Record) -> StoreResult<Record> {
        let id = validate_update(tenant_id, record)?;
        info!(
            "event=record_update module=sqlite_store status=start tenant_id={} record_id={}",
            tenant_id, id
        );

        let mut replacement = record.clone();
        replacement.tenant_id = tenant_id.to_string();
        let captions = encode_captions(&replacement.captions)?;

        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE records
             SET
                url = ?1,
                captions = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE tenant_id = ?3 AND id = ?4;",
            params![replacement.url.as_str(), captions, tenant_id, id.to_hex()],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound("record"));
        }

        debug!(
            "event=record_update module=sqlite_store status=ok tenant_id={} record_id={}",
            tenant_id, id
        );
        Ok(replacement)
    }

    fn delete(&self, _tenant_id: &str, _id: RecordId) -> StoreResult<()> {
        Err(StoreError::Unimplemented("delete"))
    }
}

fn encode_captions(captions: &[String]) -> StoreResult<String> {
    serde_json::to_string(captions)
        .map_err(|err| StoreError::internal(format!("failed to encode captions: {err}")))
}

fn decode_captions(raw: &str) -> StoreResult<Vec<String>> {
    serde_json::from_str(raw).map_err(|err| {
        StoreError::internal(format!(
            "invalid persisted captions `{raw}` in records.captions: {err}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::{decode_captions, encode_captions};

    #[test]
    fn captions_column_is_a_json_array() {
        let raw = encode_captions(&["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(raw, r#"["a","b"]"#);
        assert_eq!(decode_captions(&raw).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn corrupt_captions_are_reported() {
        let err = decode_captions("not json").unwrap_err();
        assert!(err.to_string().contains("records.captions"));
    }
}
