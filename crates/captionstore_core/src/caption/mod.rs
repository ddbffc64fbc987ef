//! Caption generation for submitted URLs.
//!
//! # Responsibility
//! - Define the generator contract used by record creation flows.
//! - Memoize upstream summarization results per URL.
//!
//! # Invariants
//! - Failed summarizations are never memoized.

pub mod generator;
