//! Integration tests for the database connection pool
//!
//! In-memory tests need no setup. File-backed tests create a throwaway
//! database under the system temp directory and remove it afterwards.

use daybook_shared::db::pool::{close_pool, create_pool, get_pool_stats, health_check, DatabaseConfig};
use std::path::PathBuf;

/// Unique database file path for one test
fn temp_database_path() -> PathBuf {
    std::env::temp_dir().join(format!("daybook-test-{}.db", uuid::Uuid::new_v4()))
}

fn remove_database_files(path: &PathBuf) {
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
    }
}

#[tokio::test]
async fn test_create_in_memory_pool() {
    let result = create_pool(DatabaseConfig::in_memory()).await;
    assert!(result.is_ok(), "Failed to create pool: {:?}", result.err());

    let pool = result.unwrap();
    let stats = get_pool_stats(&pool);
    assert_eq!(stats.total_connections, 1, "In-memory pool is pinned to one connection");

    close_pool(pool).await;
}

#[tokio::test]
async fn test_create_file_pool_creates_database() {
    let path = temp_database_path();
    let config = DatabaseConfig {
        url: format!("sqlite://{}", path.display()),
        max_connections: 3,
        ..Default::default()
    };

    let pool = create_pool(config).await.expect("Failed to create pool");
    assert!(path.exists(), "Database file should be created on first connect");

    let (mode,): (String,) = sqlx::query_as("PRAGMA journal_mode")
        .fetch_one(&pool)
        .await
        .expect("Failed to read journal mode");
    assert_eq!(mode.to_lowercase(), "wal");

    close_pool(pool).await;
    remove_database_files(&path);
}

#[tokio::test]
async fn test_create_pool_with_invalid_url() {
    let config = DatabaseConfig {
        url: "sqlite:///nonexistent-dir/daybook/daybook.db".to_string(),
        max_connections: 1,
        min_connections: 0,
        connect_timeout_seconds: 2,
        idle_timeout_seconds: None,
        max_lifetime_seconds: None,
        test_before_acquire: false,
    };

    let result = create_pool(config).await;
    assert!(result.is_err(), "Should fail when the database directory does not exist");
}

#[tokio::test]
async fn test_health_check_success() {
    let pool = create_pool(DatabaseConfig::in_memory())
        .await
        .expect("Failed to create pool");

    let result = health_check(&pool).await;
    assert!(result.is_ok(), "Health check should succeed");

    close_pool(pool).await;
}

#[tokio::test]
async fn test_in_memory_data_visible_across_acquires() {
    let pool = create_pool(DatabaseConfig::in_memory())
        .await
        .expect("Failed to create pool");

    sqlx::query("CREATE TABLE probe (value INTEGER)")
        .execute(&pool)
        .await
        .expect("Failed to create table");
    sqlx::query("INSERT INTO probe VALUES (42)")
        .execute(&pool)
        .await
        .expect("Failed to insert");

    // Every acquire must land on the same database
    for _ in 0..5 {
        let (value,): (i64,) = sqlx::query_as("SELECT value FROM probe")
            .fetch_one(&pool)
            .await
            .expect("Table should be visible");
        assert_eq!(value, 42);
    }

    close_pool(pool).await;
}

#[tokio::test]
async fn test_pool_concurrent_queries() {
    let pool = create_pool(DatabaseConfig::in_memory())
        .await
        .expect("Failed to create pool");

    // More tasks than connections to exercise queueing
    let mut handles = vec![];

    for i in 0..20i64 {
        let pool_clone = pool.clone();
        let handle = tokio::spawn(async move {
            let row: (i64,) = sqlx::query_as("SELECT ?")
                .bind(i)
                .fetch_one(&pool_clone)
                .await
                .expect("Failed to execute query");

            assert_eq!(row.0, i);
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.await.expect("Task panicked");
    }

    close_pool(pool).await;
}

#[tokio::test]
async fn test_pool_transaction_rollback() {
    let pool = create_pool(DatabaseConfig::in_memory())
        .await
        .expect("Failed to create pool");

    sqlx::query("CREATE TABLE probe (value INTEGER)")
        .execute(&pool)
        .await
        .unwrap();

    let mut tx = pool.begin().await.expect("Failed to begin transaction");
    sqlx::query("INSERT INTO probe VALUES (1)")
        .execute(&mut *tx)
        .await
        .expect("Failed to insert in transaction");
    tx.rollback().await.expect("Failed to rollback transaction");

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM probe")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);

    close_pool(pool).await;
}

#[tokio::test]
async fn test_close_pool() {
    let pool = create_pool(DatabaseConfig::in_memory())
        .await
        .expect("Failed to create pool");

    close_pool(pool.clone()).await;

    let result: Result<(i64,), _> = sqlx::query_as("SELECT 1").fetch_one(&pool).await;
    assert!(result.is_err(), "Queries should fail after pool is closed");
}

#[tokio::test]
async fn test_pool_exhaustion_timeout() {
    let config = DatabaseConfig {
        connect_timeout_seconds: 1,
        ..DatabaseConfig::in_memory()
    };

    let pool = create_pool(config).await.expect("Failed to create pool");

    // Hold the only connection
    let _conn = pool.acquire().await.expect("Failed to acquire connection");

    let start = std::time::Instant::now();
    let result = pool.acquire().await;
    let elapsed = start.elapsed();

    assert!(result.is_err(), "Should time out when the pool is exhausted");
    assert!(
        elapsed.as_millis() >= 900 && elapsed.as_secs() <= 3,
        "Should time out after approximately connect_timeout_seconds"
    );
}
