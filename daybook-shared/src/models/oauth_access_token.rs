/// OAuth access tokens issued to client applications
///
/// `client_id` and `user_id` are loose references; tokens are not removed when
/// the user or application goes away. Both token strings are unique when
/// present.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE "oauth_access_token" (
///     "id" TEXT PRIMARY KEY NOT NULL,
///     "access_token" TEXT UNIQUE,
///     "refresh_token" TEXT UNIQUE,
///     "access_token_expires_at" INTEGER,
///     "refresh_token_expires_at" INTEGER,
///     "client_id" TEXT,
///     "user_id" TEXT,
///     "scopes" TEXT,
///     "created_at" INTEGER,
///     "updated_at" INTEGER
/// );
/// ```

use crate::db::defaults::{id_or_generate, Timestamp};
use crate::error::{DbError, DbResult};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct OAuthAccessToken {
    pub id: String,

    #[serde(skip_serializing)]
    pub access_token: Option<String>,

    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,

    pub access_token_expires_at: Option<Timestamp>,
    pub refresh_token_expires_at: Option<Timestamp>,
    pub client_id: Option<String>,
    pub user_id: Option<String>,

    /// Space separated scope list
    pub scopes: Option<String>,

    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateOAuthAccessToken {
    pub id: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub access_token_expires_at: Option<Timestamp>,
    pub refresh_token_expires_at: Option<Timestamp>,
    pub client_id: Option<String>,
    pub user_id: Option<String>,
    pub scopes: Option<String>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl OAuthAccessToken {
    /// Stores an issued token pair
    ///
    /// # Errors
    ///
    /// `UniqueConstraintViolation` if either token string is already stored
    pub async fn create(pool: &SqlitePool, data: CreateOAuthAccessToken) -> DbResult<Self> {

        let token = sqlx::query_as::<_, OAuthAccessToken>(
            r#"
            INSERT INTO oauth_access_token (
                id, access_token, refresh_token, access_token_expires_at, refresh_token_expires_at,
                client_id, user_id, scopes, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, access_token, refresh_token, access_token_expires_at,
                      refresh_token_expires_at, client_id, user_id, scopes, created_at, updated_at
            "#,
        )
        .bind(id_or_generate(data.id))
        .bind(data.access_token)
        .bind(data.refresh_token)
        .bind(data.access_token_expires_at)
        .bind(data.refresh_token_expires_at)
        .bind(data.client_id)
        .bind(data.user_id)
        .bind(data.scopes)
        .bind(data.created_at)
        .bind(data.updated_at)
        .fetch_one(pool)
        .await?;

        Ok(token)
    }

    pub async fn find_by_access_token(pool: &SqlitePool, access_token: &str) -> DbResult<Option<Self>> {
        let token = sqlx::query_as::<_, OAuthAccessToken>(
            r#"
            SELECT id, access_token, refresh_token, access_token_expires_at,
                   refresh_token_expires_at, client_id, user_id, scopes, created_at, updated_at
            FROM oauth_access_token
            WHERE access_token = ?
            "#,
        )
        .bind(access_token)
        .fetch_optional(pool)
        .await?;

        Ok(token)
    }

    pub async fn find_by_refresh_token(
        pool: &SqlitePool,
        refresh_token: &str,
    ) -> DbResult<Option<Self>> {
        let token = sqlx::query_as::<_, OAuthAccessToken>(
            r#"
            SELECT id, access_token, refresh_token, access_token_expires_at,
                   refresh_token_expires_at, client_id, user_id, scopes, created_at, updated_at
            FROM oauth_access_token
            WHERE refresh_token = ?
            "#,
        )
        .bind(refresh_token)
        .fetch_optional(pool)
        .await?;

        Ok(token)
    }

    /// Whether the access token has expired. Tokens without an expiry never do.
    pub fn is_access_token_expired(&self) -> bool {
        self.access_token_expires_at.is_some_and(|t| t.is_past())
    }

    pub async fn delete(pool: &SqlitePool, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM oauth_access_token WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("oauth_access_token", id));
        }

        Ok(())
    }
}
