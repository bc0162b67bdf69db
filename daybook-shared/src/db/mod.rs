/// Database layer for Daybook
///
/// This module provides connection pooling, the table definitions with their
/// integrity rules, named relations between tables, and default-value factories.
///
/// # Modules
///
/// - `pool`: SQLite connection pool management with health checks
/// - `schema`: Table definitions, DDL rendering and schema application
/// - `relations`: Named one-to-many / many-to-one lookup paths
/// - `defaults`: Identifier and timestamp factories used by the insert path
/// - Models are in the `models` module at crate root level
///
/// # Example
///
/// ```no_run
/// use daybook_shared::db::pool::{create_pool, DatabaseConfig};
/// use daybook_shared::db::schema::apply_schema;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: "sqlite://daybook.db".to_string(),
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     apply_schema(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod defaults;
pub mod pool;
pub mod relations;
pub mod schema;
