/// Storage error taxonomy
///
/// Every model operation returns [`DbResult`]. Constraint failures reported by
/// the storage engine are classified into typed variants so callers can tell a
/// duplicate key or a dangling reference apart from an infrastructure failure.
///
/// # Classification
///
/// | Engine error                   | Variant                      |
/// |--------------------------------|------------------------------|
/// | `UNIQUE` / primary key clash   | `UniqueConstraintViolation`  |
/// | `FOREIGN KEY` failure          | `ForeignKeyViolation`        |
/// | lookup / update / delete miss  | `NotFound`                   |
/// | anything else                  | `Database`                   |
///
/// # Example
///
/// ```no_run
/// use daybook_shared::error::DbError;
/// use daybook_shared::models::user::{CreateUser, User};
/// use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool) {
/// let data = CreateUser::new("Ada", "ada@example.com");
/// match User::create(&pool, data).await {
///     Ok(user) => println!("created {}", user.id),
///     Err(DbError::UniqueConstraintViolation { column }) => println!("duplicate {}", column),
///     Err(e) => println!("failed: {}", e),
/// }
/// # }
/// ```

use sqlx::error::ErrorKind;

/// Result alias used by all model operations
pub type DbResult<T> = Result<T, DbError>;

/// Errors surfaced by the schema and model layer
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A write collided with an existing value in a unique column
    ///
    /// `column` is the qualified column reported by the engine, e.g. `user.email`.
    #[error("unique constraint violated: {column}")]
    UniqueConstraintViolation { column: String },

    /// A write referenced a parent row that does not exist
    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    /// The addressed row does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Any other storage failure (connection, syntax, decoding)
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl DbError {
    /// Builds a `NotFound` error for the given entity and key
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Whether this error is a constraint failure (unique or foreign key)
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DbError::UniqueConstraintViolation { .. } | DbError::ForeignKeyViolation(_)
        )
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            match db_err.kind() {
                ErrorKind::UniqueViolation => {
                    return DbError::UniqueConstraintViolation {
                        column: violated_columns(db_err.message()),
                    };
                }
                ErrorKind::ForeignKeyViolation => {
                    return DbError::ForeignKeyViolation(db_err.message().to_string());
                }
                _ => {}
            }
        }

        if let sqlx::Error::RowNotFound = err {
            return DbError::not_found("row", "unknown");
        }

        DbError::Database(err)
    }
}

/// Extracts the column list from an SQLite constraint message
///
/// `"UNIQUE constraint failed: user.email"` becomes `"user.email"`.
fn violated_columns(message: &str) -> String {
    message
        .split_once("constraint failed:")
        .map(|(_, columns)| columns.trim().to_string())
        .unwrap_or_else(|| message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violated_columns() {
        assert_eq!(
            violated_columns("UNIQUE constraint failed: user.email"),
            "user.email"
        );
        assert_eq!(
            violated_columns("UNIQUE constraint failed: oauth_access_token.access_token"),
            "oauth_access_token.access_token"
        );
        assert_eq!(violated_columns("something else"), "something else");
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err = DbError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, DbError::NotFound { .. }));
        assert!(!err.is_constraint_violation());
    }

    #[test]
    fn test_error_display() {
        let err = DbError::not_found("user", "abc");
        assert_eq!(err.to_string(), "user not found: abc");

        let err = DbError::UniqueConstraintViolation {
            column: "user.email".to_string(),
        };
        assert_eq!(err.to_string(), "unique constraint violated: user.email");
        assert!(err.is_constraint_violation());
    }
}
