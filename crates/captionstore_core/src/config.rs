//! Store configuration and wiring.
//!
//! # Responsibility
//! - Describe which persistent and cache tiers a process runs with.
//! - Load that description from `CAPTIONSTORE_*` environment variables.
//! - Build the combined store from it.
//!
//! # Invariants
//! - Missing variables fall back to defaults; malformed ones are errors.
//! - The combined store only ever sees boxed `RecordStore` trait objects.

use crate::cache::memory_cache::{MemoryCacheStore, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL};
use crate::cache::noop::NoOpCacheStore;
use crate::db::open_db;
use crate::logging::default_log_level;
use crate::store::combined_store::CombinedStore;
use crate::store::memory_store::MemoryRecordStore;
use crate::store::sqlite_store::SqliteRecordStore;
use crate::store::{RecordStore, StoreResult};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "CAPTIONSTORE_DB_PATH";
pub const ENV_CACHE: &str = "CAPTIONSTORE_CACHE";
pub const ENV_CACHE_CAPACITY: &str = "CAPTIONSTORE_CACHE_CAPACITY";
pub const ENV_CACHE_TTL_SECS: &str = "CAPTIONSTORE_CACHE_TTL_SECS";
pub const ENV_CAPTIONS_PER_RECORD: &str = "CAPTIONSTORE_CAPTIONS_PER_RECORD";
pub const ENV_LOG_LEVEL: &str = "CAPTIONSTORE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "CAPTIONSTORE_LOG_DIR";

const DEFAULT_CAPTIONS_PER_RECORD: usize = 3;

/// Combined store over type-erased tiers, as built by `open_store`.
pub type DynCombinedStore = CombinedStore<Box<dyn RecordStore>, Box<dyn RecordStore>>;

/// Source of truth backing the combined store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistentBackend {
    Memory,
    Sqlite(PathBuf),
}

/// Cache tier in front of the persistent backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBackend {
    NoOp,
    Memory { capacity: usize, ttl: Duration },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub persistent: PersistentBackend,
    pub cache: CacheBackend,
    pub captions_per_record: usize,
    pub log_level: String,
    /// Absolute directory for rolling log files; logging is off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            persistent: PersistentBackend::Memory,
            cache: CacheBackend::NoOp,
            captions_per_record: DEFAULT_CAPTIONS_PER_RECORD,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

/// Error raised for malformed configuration values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub variable: &'static str,
    pub value: String,
    pub reason: &'static str,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid value `{}` for {}: {}",
            self.value, self.variable, self.reason
        )
    }
}

impl Error for ConfigError {}

impl StoreConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup(
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = non_empty(lookup(ENV_DB_PATH)) {
            config.persistent = PersistentBackend::Sqlite(PathBuf::from(path));
        }

        let cache_kind = non_empty(lookup(ENV_CACHE)).unwrap_or_else(|| "none".to_string());
        config.cache = match cache_kind.to_ascii_lowercase().as_str() {
            "none" | "noop" => CacheBackend::NoOp,
            "memory" => {
                let capacity = parse_var(&lookup, ENV_CACHE_CAPACITY)?
                    .unwrap_or(DEFAULT_CACHE_CAPACITY);
                let ttl = parse_var::<u64>(&lookup, ENV_CACHE_TTL_SECS)?
                    .map_or(DEFAULT_CACHE_TTL, Duration::from_secs);
                CacheBackend::Memory { capacity, ttl }
            }
            _ => {
                return Err(ConfigError {
                    variable: ENV_CACHE,
                    value: cache_kind,
                    reason: "expected none|memory",
                })
            }
        };

        if let Some(count) = parse_var(&lookup, ENV_CAPTIONS_PER_RECORD)? {
            config.captions_per_record = count;
        }
        if let Some(level) = non_empty(lookup(ENV_LOG_LEVEL)) {
            config.log_level = level;
        }
        config.log_dir = non_empty(lookup(ENV_LOG_DIR)).map(PathBuf::from);

        Ok(config)
    }
}

/// Builds the combined store described by `config`.
///
/// Opening a SQLite backend applies pending migrations.
pub fn open_store(config: &StoreConfig) -> StoreResult<DynCombinedStore> {
    let persistent: Box<dyn RecordStore> = match &config.persistent {
        PersistentBackend::Memory => Box::new(MemoryRecordStore::new()),
        PersistentBackend::Sqlite(path) => Box::new(SqliteRecordStore::new(open_db(path)?)),
    };
    let cache: Box<dyn RecordStore> = match config.cache {
        CacheBackend::NoOp => Box::new(NoOpCacheStore::new()),
        CacheBackend::Memory { capacity, ttl } => Box::new(MemoryCacheStore::new(capacity, ttl)),
    };
    Ok(CombinedStore::new(cache, persistent))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&'static str) -> Option<String>,
    variable: &'static str,
) -> Result<Option<T>, ConfigError> {
    match non_empty(lookup(variable)) {
        None => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| ConfigError {
            variable,
            value,
            reason: "expected a non-negative integer",
        }),
    }
}
