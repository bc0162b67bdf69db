/// User model and database operations
///
/// This module provides the User model and CRUD operations for managing user accounts.
/// Every per-user record (sessions, accounts, calendar events, playlists, daily tasks)
/// hangs off a user and is removed together with it.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE "user" (
///     "id" TEXT PRIMARY KEY NOT NULL,
///     "name" TEXT NOT NULL,
///     "email" TEXT NOT NULL UNIQUE,
///     "email_verified" INTEGER NOT NULL DEFAULT 0,
///     "image" TEXT,
///     "created_at" INTEGER NOT NULL,
///     "updated_at" INTEGER NOT NULL
/// );
/// CREATE INDEX "user_email_idx" ON "user" ("email");
/// ```
///
/// # Example
///
/// ```no_run
/// use daybook_shared::models::user::{User, CreateUser};
/// use daybook_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::in_memory()).await?;
///
/// // Create a new user
/// let user = User::create(&pool, CreateUser::new("John Doe", "user@example.com")).await?;
/// println!("Created user: {}", user.id);
///
/// // Find by email
/// let found = User::find_by_email(&pool, "user@example.com").await?;
/// # Ok(())
/// # }
/// ```

use crate::db::defaults::{id_or_generate, Timestamp};
use crate::error::{DbError, DbResult};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info};

/// User model representing a user account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4 unless supplied by the caller)
    pub id: String,

    /// Display name
    pub name: String,

    /// Email address
    ///
    /// Must be unique across all users
    pub email: String,

    /// Whether the email address has been verified
    pub email_verified: bool,

    /// Optional avatar/profile picture URL
    pub image: Option<String>,

    /// When the user account was created
    pub created_at: Timestamp,

    /// When the user account was last updated
    pub updated_at: Timestamp,
}

/// Input for creating a new user
///
/// Name and email are required. Omitted fields take their defaults:
/// a generated id, `email_verified = false`, and the current time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateUser {
    /// Explicit ID (generated when None)
    pub id: Option<String>,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Verification flag (false when None)
    pub email_verified: Option<bool>,

    /// Optional avatar URL
    pub image: Option<String>,

    /// Creation time (now when None)
    pub created_at: Option<Timestamp>,

    /// Update time (now when None)
    pub updated_at: Option<Timestamp>,
}

impl CreateUser {
    /// Minimal input: a name and an email, everything else defaulted
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            ..Default::default()
        }
    }
}

/// Input for updating an existing user
///
/// All fields are optional. Only non-None fields will be updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    /// New display name
    pub name: Option<String>,

    /// New email address
    pub email: Option<String>,

    /// Update email verification status
    pub email_verified: Option<bool>,

    /// New avatar URL (use Some(None) to clear)
    pub image: Option<Option<String>>,
}

impl User {
    /// Creates a new user in the database
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `data` - User creation data
    ///
    /// # Returns
    ///
    /// The newly created user with generated ID and timestamps
    ///
    /// # Errors
    ///
    /// - `UniqueConstraintViolation` if the email (or explicit id) is taken
    /// - `Database` if the connection fails
    pub async fn create(pool: &SqlitePool, data: CreateUser) -> DbResult<Self> {
        let now = Timestamp::now();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO user (id, name, email, email_verified, image, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id, name, email, email_verified, image, created_at, updated_at
            "#,
        )
        .bind(id_or_generate(data.id))
        .bind(data.name)
        .bind(data.email)
        .bind(data.email_verified.unwrap_or(false))
        .bind(data.image)
        .bind(data.created_at.unwrap_or(now))
        .bind(data.updated_at.unwrap_or(now))
        .fetch_one(pool)
        .await?;

        debug!(user_id = %user.id, "Created user");
        Ok(user)
    }

    /// Finds a user by ID
    ///
    /// # Returns
    ///
    /// The user if found, None otherwise
    pub async fn find_by_id(pool: &SqlitePool, id: &str) -> DbResult<Option<Self>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, email_verified, image, created_at, updated_at
            FROM user
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address (served by `user_email_idx`)
    ///
    /// # Returns
    ///
    /// The user if found, None otherwise
    pub async fn find_by_email(pool: &SqlitePool, email: &str) -> DbResult<Option<Self>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, email_verified, image, created_at, updated_at
            FROM user
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Updates an existing user
    ///
    /// Only non-None fields in `data` will be updated. The `updated_at` timestamp
    /// is always set to the current time.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no user has this ID
    /// - `UniqueConstraintViolation` if the new email belongs to another user
    pub async fn update(pool: &SqlitePool, id: &str, data: UpdateUser) -> DbResult<Self> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE user SET updated_at = ?");

        if data.name.is_some() {
            query.push_str(", name = ?");
        }
        if data.email.is_some() {
            query.push_str(", email = ?");
        }
        if data.email_verified.is_some() {
            query.push_str(", email_verified = ?");
        }
        if data.image.is_some() {
            query.push_str(", image = ?");
        }

        query.push_str(
            " WHERE id = ? RETURNING id, name, email, email_verified, image, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, User>(&query).bind(Timestamp::now());

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(verified) = data.email_verified {
            q = q.bind(verified);
        }
        if let Some(image) = data.image {
            q = q.bind(image);
        }

        q.bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DbError::not_found("user", id))
    }

    /// Deletes a user by ID together with everything that belongs to it
    ///
    /// The storage engine cascades the delete to the user's sessions, accounts,
    /// calendar events, playlists (and their tracks) and daily tasks. The whole
    /// cascade runs in one transaction: if any part fails, nothing is removed.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no user has this ID
    /// - `Database` if the delete or commit fails (the transaction is rolled back)
    pub async fn delete(pool: &SqlitePool, id: &str) -> DbResult<()> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query("DELETE FROM user WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("user", id));
        }

        tx.commit().await?;

        info!(user_id = %id, "Deleted user and dependent records");
        Ok(())
    }

    /// Lists all users with pagination
    ///
    /// # Returns
    ///
    /// Vector of users, ordered by creation date (newest first)
    pub async fn list(pool: &SqlitePool, limit: i64, offset: i64) -> DbResult<Vec<Self>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, email_verified, image, created_at, updated_at
            FROM user
            ORDER BY created_at DESC, id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Counts total number of users
    pub async fn count(pool: &SqlitePool) -> DbResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
