//! Record store contract, error taxonomy and store implementations.
//!
//! # Responsibility
//! - Define the tenant-scoped `RecordStore` capability shared by cache,
//!   persistent and combined tiers.
//! - Classify failures so callers can pick a transport status without
//!   needing tenant or record context.
//!
//! # Invariants
//! - Every operation is scoped by a non-empty tenant id.
//! - A failed `insert`/`update` leaves no partially written record visible.
//! - Stores are addressed through `composite_key`, so two tenants never
//!   share a key even when their record ids collide.

use crate::db::DbError;
use crate::model::record::{Record, RecordId};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub mod combined_store;
pub mod memory_store;
pub mod sqlite_store;

pub type StoreResult<T> = Result<T, StoreError>;

/// Typed failure reasons shared by all stores.
#[derive(Debug)]
pub enum StoreError {
    /// Caller supplied a missing or illegal field.
    InvalidArgument(String),
    /// No record exists at the requested key in the consulted store.
    NotFound(&'static str),
    /// The store does not support this capability.
    Unimplemented(&'static str),
    /// SQLite transport or schema failure.
    Db(DbError),
    /// Any other delegate failure, e.g. a cache transport error.
    Internal(String),
}

/// Coarse classification used to choose a transport status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    Internal,
}

impl ErrorKind {
    /// HTTP status a transport layer should answer with.
    pub fn status_code(self) -> u16 {
        match self {
            Self::InvalidArgument => 400,
            Self::NotFound => 404,
            Self::Internal => 500,
        }
    }
}

impl StoreError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Unimplemented(_) | Self::Db(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(message) => write!(f, "invalid {message}"),
            Self::NotFound(what) => write!(f, "{what} not found"),
            Self::Unimplemented(operation) => write!(f, "unimplemented: {operation}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Internal(message) => write!(f, "{message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Tenant-scoped record persistence capability.
///
/// Implemented by persistent tiers, cache tiers and the combined store.
/// All methods are synchronous and safe to call from many threads.
pub trait RecordStore: Send + Sync {
    /// Stores a new record. Persistent tiers reject records carrying an id
    /// and return the record with its generated id and tenant populated.
    fn insert(&self, tenant_id: &str, record: &Record) -> StoreResult<Record>;
    /// Returns the record stored at `(tenant_id, id)`, or `NotFound`.
    fn get(&self, tenant_id: &str, id: RecordId) -> StoreResult<Record>;
    /// Replaces the record stored at `(tenant_id, record.id)`.
    fn update(&self, tenant_id: &str, record: &Record) -> StoreResult<Record>;
    /// Removes the record. Stores may report `Unimplemented`.
    fn delete(&self, tenant_id: &str, id: RecordId) -> StoreResult<()>;
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn insert(&self, tenant_id: &str, record: &Record) -> StoreResult<Record> {
        (**self).insert(tenant_id, record)
    }

    fn get(&self, tenant_id: &str, id: RecordId) -> StoreResult<Record> {
        (**self).get(tenant_id, id)
    }

    fn update(&self, tenant_id: &str, record: &Record) -> StoreResult<Record> {
        (**self).update(tenant_id, record)
    }

    fn delete(&self, tenant_id: &str, id: RecordId) -> StoreResult<()> {
        (**self).delete(tenant_id, id)
    }
}

impl<S: RecordStore + ?Sized> RecordStore for Arc<S> {
    fn insert(&self, tenant_id: &str, record: &Record) -> StoreResult<Record> {
        (**self).insert(tenant_id, record)
    }

    fn get(&self, tenant_id: &str, id: RecordId) -> StoreResult<Record> {
        (**self).get(tenant_id, id)
    }

    fn update(&self, tenant_id: &str, record: &Record) -> StoreResult<Record> {
        (**self).update(tenant_id, record)
    }

    fn delete(&self, tenant_id: &str, id: RecordId) -> StoreResult<()> {
        (**self).delete(tenant_id, id)
    }
}

/// Builds the tenant-partitioned key `"{tenant_id}:{id_hex}"`.
pub fn composite_key(tenant_id: &str, id: RecordId) -> String {
    format!("{tenant_id}:{}", id.to_hex())
}

/// Insert validation shared by persistent tiers, first failure wins.
pub(crate) fn validate_insert(tenant_id: &str, record: &Record) -> StoreResult<()> {
    if record.id.is_some() {
        return Err(StoreError::invalid("cannot provide ID"));
    }
    if tenant_id.is_empty() {
        return Err(StoreError::invalid("customerID"));
    }
    Ok(())
}

pub(crate) fn validate_get(tenant_id: &str, id: RecordId) -> StoreResult<()> {
    if id.is_nil() {
        return Err(StoreError::invalid("id"));
    }
    if tenant_id.is_empty() {
        return Err(StoreError::invalid("customerID"));
    }
    Ok(())
}

/// Returns the record id an update targets.
pub(crate) fn validate_update(tenant_id: &str, record: &Record) -> StoreResult<RecordId> {
    let id = match record.id {
        Some(id) if !id.is_nil() => id,
        _ => return Err(StoreError::invalid("id")),
    };
    if tenant_id.is_empty() {
        return Err(StoreError::invalid("customerID"));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::{composite_key, ErrorKind, StoreError};
    use crate::model::record::RecordId;

    #[test]
    fn composite_key_prefixes_tenant() {
        let id = RecordId::generate();
        assert_eq!(composite_key("c1", id), format!("c1:{}", id.to_hex()));
        assert_ne!(composite_key("c1", id), composite_key("c2", id));
    }

    #[test]
    fn error_kinds_map_to_transport_status() {
        assert_eq!(StoreError::invalid("id").kind().status_code(), 400);
        assert_eq!(StoreError::NotFound("record").kind().status_code(), 404);
        assert_eq!(StoreError::internal("boom").kind().status_code(), 500);
        assert_eq!(
            StoreError::Unimplemented("delete").kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn display_matches_taxonomy_messages() {
        assert_eq!(StoreError::invalid("customerID").to_string(), "invalid customerID");
        assert_eq!(StoreError::NotFound("record").to_string(), "record not found");
        assert_eq!(
            StoreError::Unimplemented("delete").to_string(),
            "unimplemented: delete"
        );
    }
}
