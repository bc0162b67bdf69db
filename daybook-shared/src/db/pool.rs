/// SQLite connection pool
///
/// Every pooled connection is opened with `PRAGMA foreign_keys = ON`, so the
/// engine itself rejects dangling parent ids and carries out `ON DELETE
/// CASCADE`. File databases run in WAL mode.
///
/// An in-memory database (`sqlite::memory:`) exists only inside the
/// connection that opened it, so such a pool holds exactly one connection
/// and never recycles it.
///
/// # Example
///
/// ```no_run
/// use daybook_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), sqlx::Error> {
/// let pool = create_pool(DatabaseConfig {
///     url: "sqlite://daybook.db".to_string(),
///     max_connections: 8,
///     ..Default::default()
/// })
/// .await?;
///
/// let (users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user")
///     .fetch_one(&pool)
///     .await?;
/// # Ok(())
/// # }
/// ```

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Connection URL for a private in-memory database
pub const IN_MEMORY_URL: &str = "sqlite::memory:";

/// Pool settings; durations are whole seconds so they map onto env vars
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// `sqlite://path/to/file.db` or `sqlite::memory:`
    pub url: String,

    /// Upper bound on open connections (5). Forced to 1 in memory.
    pub max_connections: u32,

    /// Connections kept open while idle (1)
    pub min_connections: u32,

    /// How long `acquire` waits for a free connection (30)
    pub connect_timeout_seconds: u64,

    /// Idle connections above the minimum are closed after this long (600)
    pub idle_timeout_seconds: Option<u64>,

    /// Connections are replaced after this long (1800)
    pub max_lifetime_seconds: Option<u64>,

    /// Ping each connection before handing it out (true)
    pub test_before_acquire: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_seconds: 30,
            idle_timeout_seconds: Some(600),
            max_lifetime_seconds: Some(1800),
            test_before_acquire: true,
        }
    }
}

impl DatabaseConfig {
    /// Private in-memory database (tests, demos)
    pub fn in_memory() -> Self {
        Self {
            url: IN_MEMORY_URL.to_string(),
            ..Default::default()
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

/// Opens the pool and checks that the database answers
///
/// The database file is created if it does not exist yet.
///
/// # Errors
///
/// Fails on an unparsable URL, a file that cannot be opened or created, or
/// a failed [`health_check`].
pub async fn create_pool(config: DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let in_memory = config.is_in_memory();

    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        in_memory,
        "Opening SQLite pool"
    );

    let mut connect_options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    if !in_memory {
        connect_options = connect_options.journal_mode(SqliteJournalMode::Wal);
    }

    let mut pool_options = SqlitePoolOptions::new()
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .test_before_acquire(config.test_before_acquire);

    pool_options = if in_memory {
        // A second connection would open a second, empty database.
        debug!("Pinning in-memory database to one connection");
        pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        pool_options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .idle_timeout(config.idle_timeout_seconds.map(Duration::from_secs))
            .max_lifetime(config.max_lifetime_seconds.map(Duration::from_secs))
    };

    let pool = pool_options.connect_with(connect_options).await?;

    health_check(&pool).await?;

    info!("SQLite pool ready");
    Ok(pool)
}

/// Round-trips `SELECT 1`
///
/// # Errors
///
/// Any failure to acquire a connection or run the query.
pub async fn health_check(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let (one,): (i64,) = sqlx::query_as("SELECT 1").fetch_one(pool).await?;

    if one != 1 {
        warn!(value = one, "SELECT 1 returned something else");
        return Err(sqlx::Error::Protocol(format!(
            "health check returned {}",
            one
        )));
    }

    debug!("Database health check passed");
    Ok(())
}

/// Snapshot of pool occupancy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStats {
    pub active_connections: usize,
    pub idle_connections: usize,
    pub total_connections: usize,
}

pub fn get_pool_stats(pool: &SqlitePool) -> PoolStats {
    let total = pool.size() as usize;
    let idle = pool.num_idle();

    PoolStats {
        active_connections: total.saturating_sub(idle),
        idle_connections: idle,
        total_connections: total,
    }
}

/// Waits for checked-out connections to come back, then closes them all
pub async fn close_pool(pool: SqlitePool) {
    info!("Closing SQLite pool");
    pool.close().await;
    debug!("SQLite pool closed");
}
