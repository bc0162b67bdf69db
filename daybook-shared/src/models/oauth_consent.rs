/// OAuth consent records
///
/// One row per (client, user) grant decision. Both references are loose.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE "oauth_consent" (
///     "id" TEXT PRIMARY KEY NOT NULL,
///     "client_id" TEXT,
///     "user_id" TEXT,
///     "scopes" TEXT,
///     "created_at" INTEGER,
///     "updated_at" INTEGER,
///     "consent_given" INTEGER
/// );
/// ```

use crate::db::defaults::{id_or_generate, Timestamp};
use crate::error::{DbError, DbResult};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct OAuthConsent {
    pub id: String,
    pub client_id: Option<String>,
    pub user_id: Option<String>,
    pub scopes: Option<String>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
    pub consent_given: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateOAuthConsent {
    pub id: Option<String>,
    pub client_id: Option<String>,
    pub user_id: Option<String>,
    pub scopes: Option<String>,
    pub consent_given: Option<bool>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl OAuthConsent {
    pub async fn create(pool: &SqlitePool, data: CreateOAuthConsent) -> DbResult<Self> {

        let consent = sqlx::query_as::<_, OAuthConsent>(
            r#"
            INSERT INTO oauth_consent (id, client_id, user_id, scopes, created_at, updated_at, consent_given)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id, client_id, user_id, scopes, created_at, updated_at, consent_given
            "#,
        )
        .bind(id_or_generate(data.id))
        .bind(data.client_id)
        .bind(data.user_id)
        .bind(data.scopes)
        .bind(data.created_at)
        .bind(data.updated_at)
        .bind(data.consent_given)
        .fetch_one(pool)
        .await?;

        Ok(consent)
    }

    /// Latest consent a user gave (or refused) a client
    pub async fn find(pool: &SqlitePool, client_id: &str, user_id: &str) -> DbResult<Option<Self>> {
        let consent = sqlx::query_as::<_, OAuthConsent>(
            r#"
            SELECT id, client_id, user_id, scopes, created_at, updated_at, consent_given
            FROM oauth_consent
            WHERE client_id = ? AND user_id = ?
            ORDER BY created_at DESC, rowid DESC
            LIMIT 1
            "#,
        )
        .bind(client_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(consent)
    }

    pub async fn delete(pool: &SqlitePool, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM oauth_consent WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("oauth_consent", id));
        }

        Ok(())
    }
}
