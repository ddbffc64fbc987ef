//! Cache tier implementations of `RecordStore`.
//!
//! # Responsibility
//! - Provide disposable, best-effort mirrors of persistent records.
//!
//! # Invariants
//! - Cache entries are keyed exactly like persistent ones (`composite_key`).
//! - A cache never generates record ids; it mirrors persisted records.
//! - Losing any cache entry is never a correctness fault.

pub mod memory_cache;
pub mod noop;
