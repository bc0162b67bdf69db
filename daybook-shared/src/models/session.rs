/// Session model and database operations
///
/// A session binds an opaque token to a user. Sessions are removed
/// automatically when their user is deleted.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE "session" (
///     "id" TEXT PRIMARY KEY NOT NULL,
///     "expires_at" INTEGER NOT NULL,
///     "token" TEXT NOT NULL UNIQUE,
///     "created_at" INTEGER NOT NULL,
///     "updated_at" INTEGER NOT NULL,
///     "ip_address" TEXT,
///     "user_agent" TEXT,
///     "user_id" TEXT NOT NULL REFERENCES "user"("id") ON DELETE CASCADE
/// );
/// ```

use crate::db::defaults::{id_or_generate, Timestamp};
use crate::error::{DbError, DbResult};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

/// Session model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub id: String,

    /// When the session stops being valid
    pub expires_at: Timestamp,

    /// Opaque session token, unique across all sessions
    pub token: String,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,

    /// Client address recorded at creation
    pub ip_address: Option<String>,

    /// Client user agent recorded at creation
    pub user_agent: Option<String>,

    /// Owning user
    pub user_id: String,
}

/// Input for creating a new session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSession {
    pub id: Option<String>,
    pub user_id: String,
    pub token: String,
    pub expires_at: Timestamp,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl CreateSession {
    pub fn new(user_id: impl Into<String>, token: impl Into<String>, expires_at: Timestamp) -> Self {
        Self {
            id: None,
            user_id: user_id.into(),
            token: token.into(),
            expires_at,
            ip_address: None,
            user_agent: None,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Session {
    /// Creates a new session
    ///
    /// # Errors
    ///
    /// - `UniqueConstraintViolation` if the token is already in use
    /// - `ForeignKeyViolation` if the user does not exist
    pub async fn create(pool: &SqlitePool, data: CreateSession) -> DbResult<Self> {
        let now = Timestamp::now();

        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO session (id, expires_at, token, created_at, updated_at, ip_address, user_agent, user_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, expires_at, token, created_at, updated_at, ip_address, user_agent, user_id
            "#,
        )
        .bind(id_or_generate(data.id))
        .bind(data.expires_at)
        .bind(data.token)
        .bind(data.created_at.unwrap_or(now))
        .bind(data.updated_at.unwrap_or(now))
        .bind(data.ip_address)
        .bind(data.user_agent)
        .bind(data.user_id)
        .fetch_one(pool)
        .await?;

        debug!(session_id = %session.id, user_id = %session.user_id, "Created session");
        Ok(session)
    }

    /// Finds a session by its token
    pub async fn find_by_token(pool: &SqlitePool, token: &str) -> DbResult<Option<Self>> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, expires_at, token, created_at, updated_at, ip_address, user_agent, user_id
            FROM session
            WHERE token = ?
            "#,
        )
        .bind(token)
        .fetch_optional(pool)
        .await?;

        Ok(session)
    }

    /// Lists a user's sessions, newest first
    pub async fn list_by_user(pool: &SqlitePool, user_id: &str) -> DbResult<Vec<Self>> {
        let sessions = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, expires_at, token, created_at, updated_at, ip_address, user_agent, user_id
            FROM session
            WHERE user_id = ?
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(sessions)
    }

    /// Whether the session has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_past()
    }

    /// Deletes a session by ID
    pub async fn delete(pool: &SqlitePool, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM session WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("session", id));
        }

        Ok(())
    }

    /// Removes every session whose expiry lies before `now`
    ///
    /// # Returns
    ///
    /// Number of sessions removed
    pub async fn delete_expired(pool: &SqlitePool, now: Timestamp) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM session WHERE expires_at < ?")
            .bind(now)
            .execute(pool)
            .await?;

        debug!(removed = result.rows_affected(), "Removed expired sessions");
        Ok(result.rows_affected())
    }
}
