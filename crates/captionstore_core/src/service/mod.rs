//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate record store calls into use-case level APIs.
//! - Keep transport layers decoupled from storage details.

pub mod record_service;
