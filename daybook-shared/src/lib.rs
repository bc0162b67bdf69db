//! # Daybook Shared Library
//!
//! This crate contains the relational data model used by the Daybook API
//! server: table definitions, integrity rules, and typed CRUD operations.
//!
//! ## Module Organization
//!
//! - `db`: Connection pool, schema definitions, relations, default values
//! - `models`: Database models and their operations
//! - `error`: Storage error taxonomy (unique / foreign-key / not-found)
//! - `webhook`: Outbound webhook trigger

pub mod db;
pub mod error;
pub mod models;
pub mod webhook;

/// Current version of the Daybook shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
