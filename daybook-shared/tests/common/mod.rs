//! Shared helpers for the integration tests
//!
//! Every test gets its own private in-memory database with the full schema
//! applied, so tests can run in parallel without interfering.

#![allow(dead_code)]

use daybook_shared::db::defaults::Timestamp;
use daybook_shared::db::pool::{create_pool, DatabaseConfig};
use daybook_shared::db::schema::apply_schema;
use daybook_shared::models::user::{CreateUser, User};
use sqlx::SqlitePool;

/// Fresh in-memory database with the schema applied
pub async fn setup_db() -> SqlitePool {
    let pool = create_pool(DatabaseConfig::in_memory())
        .await
        .expect("Failed to create in-memory pool");
    apply_schema(&pool).await.expect("Failed to apply schema");
    pool
}

/// Inserts a user with a unique-per-test email
pub async fn create_user(pool: &SqlitePool, name: &str) -> User {
    let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
    User::create(pool, CreateUser::new(name, email))
        .await
        .expect("Failed to create user")
}

/// Row count of a table
pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM \"{}\"", table))
        .fetch_one(pool)
        .await
        .expect("Failed to count rows");
    count
}

/// 2025-08-10 10:00:00 UTC
pub fn morning() -> Timestamp {
    Timestamp::from_unix(1_754_820_000)
}
