//! # Daybook API Server Library
//!
//! This library provides the HTTP layer of the Daybook server: per-user
//! calendar events, playlists and daily tasks over the shared data model,
//! plus a few fixed sample routes and an outbound webhook trigger.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
