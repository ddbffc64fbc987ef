//! Tenant-scoped caption record store with a cache-aside front.
//! This crate owns record invariants and the cache/persistent consistency
//! policy; transports only talk to a `RecordStore`.

pub mod cache;
pub mod caption;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use cache::memory_cache::MemoryCacheStore;
pub use cache::noop::NoOpCacheStore;
pub use caption::generator::{
    CaptionError, CaptionGenerator, MemoizedCaptionGenerator, SummarizeRequest,
};
pub use config::{open_store, CacheBackend, ConfigError, PersistentBackend, StoreConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::record::{Record, RecordId, RecordIdParseError};
pub use service::record_service::{
    decode_record_payload, parse_record_id, RecordService, ServiceError,
};
pub use store::combined_store::{CombinedStore, UpdateOutcome};
pub use store::memory_store::MemoryRecordStore;
pub use store::sqlite_store::SqliteRecordStore;
pub use store::{composite_key, ErrorKind, RecordStore, StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
