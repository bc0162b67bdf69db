/// Account model and database operations
///
/// An account is one external-provider credential set (or a local password)
/// linked to a user. Accounts are removed automatically with their user.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE "account" (
///     "id" TEXT PRIMARY KEY NOT NULL,
///     "account_id" TEXT NOT NULL,
///     "provider_id" TEXT NOT NULL,
///     "user_id" TEXT NOT NULL REFERENCES "user"("id") ON DELETE CASCADE,
///     "access_token" TEXT,
///     "refresh_token" TEXT,
///     "id_token" TEXT,
///     "access_token_expires_at" INTEGER,
///     "refresh_token_expires_at" INTEGER,
///     "scope" TEXT,
///     "password" TEXT,
///     "created_at" INTEGER NOT NULL,
///     "updated_at" INTEGER NOT NULL
/// );
/// ```

use crate::db::defaults::{id_or_generate, Timestamp};
use crate::error::{DbError, DbResult};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

/// Account model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: String,

    /// Identifier of the account at the provider
    pub account_id: String,

    /// Provider name (e.g. "google", "credential")
    pub provider_id: String,

    /// Owning user
    pub user_id: String,

    #[serde(skip_serializing)]
    pub access_token: Option<String>,

    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,

    #[serde(skip_serializing)]
    pub id_token: Option<String>,

    pub access_token_expires_at: Option<Timestamp>,
    pub refresh_token_expires_at: Option<Timestamp>,
    pub scope: Option<String>,

    /// Password hash for credential accounts (never serialized)
    #[serde(skip_serializing)]
    pub password: Option<String>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for creating a new account
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateAccount {
    pub id: Option<String>,
    pub account_id: String,
    pub provider_id: String,
    pub user_id: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub id_token: Option<String>,
    pub access_token_expires_at: Option<Timestamp>,
    pub refresh_token_expires_at: Option<Timestamp>,
    pub scope: Option<String>,
    pub password: Option<String>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl CreateAccount {
    pub fn new(
        user_id: impl Into<String>,
        provider_id: impl Into<String>,
        account_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            provider_id: provider_id.into(),
            account_id: account_id.into(),
            ..Default::default()
        }
    }
}

impl Account {
    /// Creates a new account
    ///
    /// # Errors
    ///
    /// Returns `ForeignKeyViolation` if the user does not exist
    pub async fn create(pool: &SqlitePool, data: CreateAccount) -> DbResult<Self> {
        let now = Timestamp::now();

        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO account (
                id, account_id, provider_id, user_id, access_token, refresh_token, id_token,
                access_token_expires_at, refresh_token_expires_at, scope, password,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, account_id, provider_id, user_id, access_token, refresh_token, id_token,
                      access_token_expires_at, refresh_token_expires_at, scope, password,
                      created_at, updated_at
            "#,
        )
        .bind(id_or_generate(data.id))
        .bind(data.account_id)
        .bind(data.provider_id)
        .bind(data.user_id)
        .bind(data.access_token)
        .bind(data.refresh_token)
        .bind(data.id_token)
        .bind(data.access_token_expires_at)
        .bind(data.refresh_token_expires_at)
        .bind(data.scope)
        .bind(data.password)
        .bind(data.created_at.unwrap_or(now))
        .bind(data.updated_at.unwrap_or(now))
        .fetch_one(pool)
        .await?;

        debug!(account_id = %account.id, provider = %account.provider_id, "Created account");
        Ok(account)
    }

    /// Finds the account a provider knows under `account_id`
    pub async fn find_by_provider(
        pool: &SqlitePool,
        provider_id: &str,
        account_id: &str,
    ) -> DbResult<Option<Self>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, account_id, provider_id, user_id, access_token, refresh_token, id_token,
                   access_token_expires_at, refresh_token_expires_at, scope, password,
                   created_at, updated_at
            FROM account
            WHERE provider_id = ? AND account_id = ?
            "#,
        )
        .bind(provider_id)
        .bind(account_id)
        .fetch_optional(pool)
        .await?;

        Ok(account)
    }

    /// Lists all accounts linked to a user
    pub async fn list_by_user(pool: &SqlitePool, user_id: &str) -> DbResult<Vec<Self>> {
        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, account_id, provider_id, user_id, access_token, refresh_token, id_token,
                   access_token_expires_at, refresh_token_expires_at, scope, password,
                   created_at, updated_at
            FROM account
            WHERE user_id = ?
            ORDER BY created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(accounts)
    }

    /// Deletes an account by ID
    pub async fn delete(pool: &SqlitePool, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM account WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("account", id));
        }

        Ok(())
    }
}
