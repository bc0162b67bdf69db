/// Verification model and database operations
///
/// Short-lived values (one-time codes, email verification tokens) keyed by an
/// identifier. The table has no foreign keys; rows are removed explicitly or
/// swept once expired.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE "verification" (
///     "id" TEXT PRIMARY KEY NOT NULL,
///     "identifier" TEXT NOT NULL,
///     "value" TEXT NOT NULL,
///     "expires_at" INTEGER NOT NULL,
///     "created_at" INTEGER,
///     "updated_at" INTEGER
/// );
/// ```

use crate::db::defaults::{id_or_generate, Timestamp};
use crate::error::{DbError, DbResult};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Verification {
    pub id: String,
    pub identifier: String,
    pub value: String,
    pub expires_at: Timestamp,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVerification {
    pub id: Option<String>,
    pub identifier: String,
    pub value: String,
    pub expires_at: Timestamp,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl CreateVerification {
    pub fn new(identifier: impl Into<String>, value: impl Into<String>, expires_at: Timestamp) -> Self {
        Self {
            id: None,
            identifier: identifier.into(),
            value: value.into(),
            expires_at,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Verification {
    pub async fn create(pool: &SqlitePool, data: CreateVerification) -> DbResult<Self> {
        let now = Timestamp::now();

        let verification = sqlx::query_as::<_, Verification>(
            r#"
            INSERT INTO verification (id, identifier, value, expires_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, identifier, value, expires_at, created_at, updated_at
            "#,
        )
        .bind(id_or_generate(data.id))
        .bind(data.identifier)
        .bind(data.value)
        .bind(data.expires_at)
        .bind(data.created_at.unwrap_or(now))
        .bind(data.updated_at.unwrap_or(now))
        .fetch_one(pool)
        .await?;

        Ok(verification)
    }

    /// Most recent verification issued for an identifier
    pub async fn find_by_identifier(pool: &SqlitePool, identifier: &str) -> DbResult<Option<Self>> {
        let verification = sqlx::query_as::<_, Verification>(
            r#"
            SELECT id, identifier, value, expires_at, created_at, updated_at
            FROM verification
            WHERE identifier = ?
            ORDER BY created_at DESC, rowid DESC
            LIMIT 1
            "#,
        )
        .bind(identifier)
        .fetch_optional(pool)
        .await?;

        Ok(verification)
    }

    pub async fn delete(pool: &SqlitePool, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM verification WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("verification", id));
        }

        Ok(())
    }

    /// Removes every verification whose expiry lies before `now`
    pub async fn delete_expired(pool: &SqlitePool, now: Timestamp) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM verification WHERE expires_at < ?")
            .bind(now)
            .execute(pool)
            .await?;

        debug!(removed = result.rows_affected(), "Removed expired verifications");
        Ok(result.rows_affected())
    }
}
