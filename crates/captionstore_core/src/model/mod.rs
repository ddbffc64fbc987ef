//! Domain model for tenant-owned caption records.
//!
//! # Responsibility
//! - Define the canonical record shape shared by cache and persistent tiers.
//!
//! # Invariants
//! - A record is addressed by the pair `(tenant_id, id)`.
//! - Insert and update replace the whole stored value.

pub mod record;
