/// Database models for Daybook
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// Identity:
/// - `user`: User accounts (root of every cascade)
/// - `session`: Login sessions, deleted with their user
/// - `account`: External-provider credential sets, deleted with their user
/// - `verification`: One-time verification values, standalone
///
/// OAuth provider (loose references, no foreign keys):
/// - `oauth_application`: Registered clients
/// - `oauth_access_token`: Issued token pairs
/// - `oauth_consent`: Consent decisions
///
/// Personal data:
/// - `calendar_event`: Calendar entries per user
/// - `music_playlist`: Playlists per user
/// - `music_track`: Tracks per playlist
/// - `daily_task`: To-do items per user
///
/// # Example
///
/// ```no_run
/// use daybook_shared::models::user::{User, CreateUser};
/// use daybook_shared::db::pool::{create_pool, DatabaseConfig};
/// use daybook_shared::db::schema::apply_schema;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::in_memory()).await?;
/// apply_schema(&pool).await?;
///
/// let user = User::create(&pool, CreateUser::new("Jane Doe", "jane@example.com")).await?;
/// # Ok(())
/// # }
/// ```

pub mod account;
pub mod calendar_event;
pub mod daily_task;
pub mod music_playlist;
pub mod music_track;
pub mod oauth_access_token;
pub mod oauth_application;
pub mod oauth_consent;
pub mod session;
pub mod user;
pub mod verification;
