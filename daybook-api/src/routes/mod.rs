/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `showcase`: Fixed sample data served at the top level
/// - `webhook`: Outbound webhook trigger
/// - `users`: User registration, lookup and deletion
/// - `calendar`: Calendar events per user
/// - `music`: Playlists and tracks
/// - `tasks`: Daily tasks per user

pub mod calendar;
pub mod health;
pub mod music;
pub mod showcase;
pub mod tasks;
pub mod users;
pub mod webhook;
