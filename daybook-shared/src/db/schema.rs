/// Table definitions and schema application
///
/// Every table of the data model is declared here as a static [`TableDef`]:
/// its columns with type, nullability, uniqueness, defaults and foreign keys,
/// plus its secondary indexes. The definitions render to SQLite DDL and are
/// applied with [`apply_schema`], which is idempotent.
///
/// # Integrity rules
///
/// - Unique: `user.email`, `session.token`, `oauth_application.client_id`,
///   `oauth_access_token.access_token`, `oauth_access_token.refresh_token`.
///   Nullable unique columns accept any number of NULLs.
/// - Cascade: `session`, `account`, `calendar_events`, `music_playlists` and
///   `daily_tasks` follow `user`; `music_tracks` follows `music_playlists`.
/// - The OAuth tables keep `client_id` / `user_id` as plain columns with no
///   foreign key, so orphaned rows are allowed.
///
/// # Defaults
///
/// [`DefaultValue::GeneratedId`] and [`DefaultValue::Now`] are filled by the
/// insert path (see `db::defaults`); literal defaults are part of the DDL.
///
/// # Example
///
/// ```no_run
/// use daybook_shared::db::pool::{create_pool, DatabaseConfig};
/// use daybook_shared::db::schema::{apply_schema, schema_status, USER};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::in_memory()).await?;
/// apply_schema(&pool).await?;
///
/// println!("{}", USER.create_table_sql());
/// assert!(schema_status(&pool).await?.is_up_to_date());
/// # Ok(())
/// # }
/// ```

use sqlx::SqlitePool;
use tracing::{debug, info};

/// Storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Free text and identifiers
    Text,
    /// Plain integer
    Integer,
    /// Flag stored as 0/1
    Boolean,
    /// Unix seconds
    Timestamp,
}

impl ColumnType {
    /// SQLite type affinity for the column
    pub fn sql(&self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Integer | ColumnType::Boolean | ColumnType::Timestamp => "INTEGER",
        }
    }
}

/// Where a column's value comes from when the caller omits it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    /// Fresh opaque identifier, generated by the insert path
    GeneratedId,
    /// Current time, generated by the insert path
    Now,
    /// Literal flag, declared in the DDL
    Bool(bool),
    /// Literal text, declared in the DDL
    Text(&'static str),
}

impl DefaultValue {
    /// DDL fragment for engine-side defaults; `None` for application-side ones
    pub fn sql(&self) -> Option<String> {
        match self {
            DefaultValue::GeneratedId | DefaultValue::Now => None,
            DefaultValue::Bool(value) => Some(format!("DEFAULT {}", i32::from(*value))),
            DefaultValue::Text(value) => Some(format!("DEFAULT '{}'", value.replace('\'', "''"))),
        }
    }
}

/// Action taken on child rows when the referenced parent is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    Cascade,
    NoAction,
}

impl OnDelete {
    pub fn sql(&self) -> &'static str {
        match self {
            OnDelete::Cascade => "CASCADE",
            OnDelete::NoAction => "NO ACTION",
        }
    }
}

/// Foreign key from a column to another table's column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: &'static str,
    pub column: &'static str,
    pub on_delete: OnDelete,
}

/// Column declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    /// Storage (snake_case) name
    pub name: &'static str,
    pub column_type: ColumnType,
    pub primary_key: bool,
    pub not_null: bool,
    pub unique: bool,
    pub default: Option<DefaultValue>,
    pub references: Option<ForeignKey>,
    /// Closed set of accepted text values
    pub allowed_values: Option<&'static [&'static str]>,
}

impl ColumnDef {
    const fn new(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            column_type,
            primary_key: false,
            not_null: false,
            unique: false,
            default: None,
            references: None,
            allowed_values: None,
        }
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, ColumnType::Text)
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, ColumnType::Integer)
    }

    pub const fn boolean(name: &'static str) -> Self {
        Self::new(name, ColumnType::Boolean)
    }

    pub const fn timestamp(name: &'static str) -> Self {
        Self::new(name, ColumnType::Timestamp)
    }

    /// Text primary key filled with a generated id when omitted
    pub const fn id() -> Self {
        Self::text("id").primary_key().default(DefaultValue::GeneratedId)
    }

    pub const fn primary_key(self) -> Self {
        Self {
            primary_key: true,
            not_null: true,
            ..self
        }
    }

    pub const fn not_null(self) -> Self {
        Self {
            not_null: true,
            ..self
        }
    }

    pub const fn unique(self) -> Self {
        Self {
            unique: true,
            ..self
        }
    }

    pub const fn default(self, default: DefaultValue) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }

    pub const fn references(self, table: &'static str, column: &'static str, on_delete: OnDelete) -> Self {
        Self {
            references: Some(ForeignKey {
                table,
                column,
                on_delete,
            }),
            ..self
        }
    }

    pub const fn one_of(self, values: &'static [&'static str]) -> Self {
        Self {
            allowed_values: Some(values),
            ..self
        }
    }

    /// Column definition as it appears inside `CREATE TABLE`
    pub fn sql(&self) -> String {
        let mut parts = vec![format!("\"{}\"", self.name), self.column_type.sql().to_string()];

        if self.primary_key {
            parts.push("PRIMARY KEY".to_string());
        }
        if self.not_null {
            parts.push("NOT NULL".to_string());
        }
        if self.unique {
            parts.push("UNIQUE".to_string());
        }
        if let Some(default) = self.default.and_then(|d| d.sql()) {
            parts.push(default);
        }
        if let Some(values) = self.allowed_values {
            let list = values
                .iter()
                .map(|v| format!("'{}'", v.replace('\'', "''")))
                .collect::<Vec<_>>()
                .join(", ");
            parts.push(format!("CHECK (\"{}\" IN ({}))", self.name, list));
        }
        if let Some(fk) = self.references {
            parts.push(format!(
                "REFERENCES \"{}\"(\"{}\") ON DELETE {}",
                fk.table,
                fk.column,
                fk.on_delete.sql()
            ));
        }

        parts.join(" ")
    }
}

/// Secondary index declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexDef {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

/// Table declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
    pub indexes: &'static [IndexDef],
}

impl TableDef {
    /// Looks up a column by storage name
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns carrying a foreign key
    pub fn foreign_keys(&self) -> impl Iterator<Item = (&ColumnDef, ForeignKey)> + '_ {
        self.columns
            .iter()
            .filter_map(|c| c.references.map(|fk| (c, fk)))
    }

    /// Columns declared unique (excluding the primary key)
    pub fn unique_columns(&self) -> impl Iterator<Item = &ColumnDef> + '_ {
        self.columns.iter().filter(|c| c.unique)
    }

    /// `CREATE TABLE IF NOT EXISTS` statement
    pub fn create_table_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| format!("    {}", c.sql()))
            .collect::<Vec<_>>()
            .join(",\n");

        format!("CREATE TABLE IF NOT EXISTS \"{}\" (\n{}\n)", self.name, columns)
    }

    /// `CREATE INDEX IF NOT EXISTS` statements, one per index
    pub fn create_index_sql(&self) -> Vec<String> {
        self.indexes
            .iter()
            .map(|index| {
                let columns = index
                    .columns
                    .iter()
                    .map(|c| format!("\"{}\"", c))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "CREATE INDEX IF NOT EXISTS \"{}\" ON \"{}\" ({})",
                    index.name, self.name, columns
                )
            })
            .collect()
    }
}

/// Accepted values of `daily_tasks.priority`
pub const PRIORITY_VALUES: &[&str] = &["low", "medium", "high"];

pub static USER: TableDef = TableDef {
    name: "user",
    columns: &[
        ColumnDef::id(),
        ColumnDef::text("name").not_null(),
        ColumnDef::text("email").not_null().unique(),
        ColumnDef::boolean("email_verified")
            .not_null()
            .default(DefaultValue::Bool(false)),
        ColumnDef::text("image"),
        ColumnDef::timestamp("created_at").not_null().default(DefaultValue::Now),
        ColumnDef::timestamp("updated_at").not_null().default(DefaultValue::Now),
    ],
    indexes: &[IndexDef {
        name: "user_email_idx",
        columns: &["email"],
    }],
};

pub static SESSION: TableDef = TableDef {
    name: "session",
    columns: &[
        ColumnDef::id(),
        ColumnDef::timestamp("expires_at").not_null(),
        ColumnDef::text("token").not_null().unique(),
        ColumnDef::timestamp("created_at").not_null().default(DefaultValue::Now),
        ColumnDef::timestamp("updated_at").not_null().default(DefaultValue::Now),
        ColumnDef::text("ip_address"),
        ColumnDef::text("user_agent"),
        ColumnDef::text("user_id")
            .not_null()
            .references("user", "id", OnDelete::Cascade),
    ],
    indexes: &[],
};

pub static ACCOUNT: TableDef = TableDef {
    name: "account",
    columns: &[
        ColumnDef::id(),
        ColumnDef::text("account_id").not_null(),
        ColumnDef::text("provider_id").not_null(),
        ColumnDef::text("user_id")
            .not_null()
            .references("user", "id", OnDelete::Cascade),
        ColumnDef::text("access_token"),
        ColumnDef::text("refresh_token"),
        ColumnDef::text("id_token"),
        ColumnDef::timestamp("access_token_expires_at"),
        ColumnDef::timestamp("refresh_token_expires_at"),
        ColumnDef::text("scope"),
        ColumnDef::text("password"),
        ColumnDef::timestamp("created_at").not_null().default(DefaultValue::Now),
        ColumnDef::timestamp("updated_at").not_null().default(DefaultValue::Now),
    ],
    indexes: &[],
};

pub static VERIFICATION: TableDef = TableDef {
    name: "verification",
    columns: &[
        ColumnDef::id(),
        ColumnDef::text("identifier").not_null(),
        ColumnDef::text("value").not_null(),
        ColumnDef::timestamp("expires_at").not_null(),
        ColumnDef::timestamp("created_at").default(DefaultValue::Now),
        ColumnDef::timestamp("updated_at").default(DefaultValue::Now),
    ],
    indexes: &[],
};

pub static OAUTH_APPLICATION: TableDef = TableDef {
    name: "oauth_application",
    columns: &[
        ColumnDef::id(),
        ColumnDef::text("name"),
        ColumnDef::text("icon"),
        ColumnDef::text("metadata"),
        ColumnDef::text("client_id").unique(),
        ColumnDef::text("client_secret"),
        ColumnDef::text("redirect_u_r_ls"),
        ColumnDef::text("type"),
        ColumnDef::boolean("disabled"),
        ColumnDef::text("user_id"),
        ColumnDef::timestamp("created_at"),
        ColumnDef::timestamp("updated_at"),
    ],
    indexes: &[],
};

pub static OAUTH_ACCESS_TOKEN: TableDef = TableDef {
    name: "oauth_access_token",
    columns: &[
        ColumnDef::id(),
        ColumnDef::text("access_token").unique(),
        ColumnDef::text("refresh_token").unique(),
        ColumnDef::timestamp("access_token_expires_at"),
        ColumnDef::timestamp("refresh_token_expires_at"),
        ColumnDef::text("client_id"),
        ColumnDef::text("user_id"),
        ColumnDef::text("scopes"),
        ColumnDef::timestamp("created_at"),
        ColumnDef::timestamp("updated_at"),
    ],
    indexes: &[],
};

pub static OAUTH_CONSENT: TableDef = TableDef {
    name: "oauth_consent",
    columns: &[
        ColumnDef::id(),
        ColumnDef::text("client_id"),
        ColumnDef::text("user_id"),
        ColumnDef::text("scopes"),
        ColumnDef::timestamp("created_at"),
        ColumnDef::timestamp("updated_at"),
        ColumnDef::boolean("consent_given"),
    ],
    indexes: &[],
};

pub static CALENDAR_EVENTS: TableDef = TableDef {
    name: "calendar_events",
    columns: &[
        ColumnDef::id(),
        ColumnDef::text("user_id")
            .not_null()
            .references("user", "id", OnDelete::Cascade),
        ColumnDef::text("title").not_null(),
        ColumnDef::text("description"),
        ColumnDef::timestamp("start_time").not_null(),
        ColumnDef::timestamp("end_time").not_null(),
        ColumnDef::text("location"),
        ColumnDef::timestamp("created_at").not_null().default(DefaultValue::Now),
        ColumnDef::timestamp("updated_at").not_null().default(DefaultValue::Now),
    ],
    indexes: &[
        IndexDef {
            name: "calendar_events_user_id_idx",
            columns: &["user_id"],
        },
        IndexDef {
            name: "calendar_events_start_time_idx",
            columns: &["start_time"],
        },
    ],
};

pub static MUSIC_PLAYLISTS: TableDef = TableDef {
    name: "music_playlists",
    columns: &[
        ColumnDef::id(),
        ColumnDef::text("user_id")
            .not_null()
            .references("user", "id", OnDelete::Cascade),
        ColumnDef::text("name").not_null(),
        ColumnDef::text("description"),
        ColumnDef::boolean("is_active")
            .not_null()
            .default(DefaultValue::Bool(false)),
        ColumnDef::timestamp("created_at").not_null().default(DefaultValue::Now),
        ColumnDef::timestamp("updated_at").not_null().default(DefaultValue::Now),
    ],
    indexes: &[IndexDef {
        name: "music_playlists_user_id_idx",
        columns: &["user_id"],
    }],
};

pub static MUSIC_TRACKS: TableDef = TableDef {
    name: "music_tracks",
    columns: &[
        ColumnDef::id(),
        ColumnDef::text("playlist_id")
            .not_null()
            .references("music_playlists", "id", OnDelete::Cascade),
        ColumnDef::text("title").not_null(),
        ColumnDef::text("artist").not_null(),
        ColumnDef::integer("duration").not_null(),
        ColumnDef::integer("track_order").not_null(),
        ColumnDef::boolean("is_current")
            .not_null()
            .default(DefaultValue::Bool(false)),
        ColumnDef::timestamp("created_at").not_null().default(DefaultValue::Now),
    ],
    indexes: &[
        IndexDef {
            name: "music_tracks_playlist_id_idx",
            columns: &["playlist_id"],
        },
        IndexDef {
            name: "music_tracks_track_order_idx",
            columns: &["track_order"],
        },
    ],
};

pub static DAILY_TASKS: TableDef = TableDef {
    name: "daily_tasks",
    columns: &[
        ColumnDef::id(),
        ColumnDef::text("user_id")
            .not_null()
            .references("user", "id", OnDelete::Cascade),
        ColumnDef::text("title").not_null(),
        ColumnDef::text("description"),
        ColumnDef::boolean("completed")
            .not_null()
            .default(DefaultValue::Bool(false)),
        ColumnDef::text("priority")
            .not_null()
            .default(DefaultValue::Text("medium"))
            .one_of(PRIORITY_VALUES),
        ColumnDef::text("due_date"),
        ColumnDef::timestamp("created_at").not_null().default(DefaultValue::Now),
        ColumnDef::timestamp("updated_at").not_null().default(DefaultValue::Now),
    ],
    indexes: &[
        IndexDef {
            name: "daily_tasks_user_id_idx",
            columns: &["user_id"],
        },
        IndexDef {
            name: "daily_tasks_due_date_idx",
            columns: &["due_date"],
        },
        IndexDef {
            name: "daily_tasks_priority_idx",
            columns: &["priority"],
        },
    ],
};

/// All tables, parents before children
pub static TABLES: &[&TableDef] = &[
    &USER,
    &SESSION,
    &ACCOUNT,
    &VERIFICATION,
    &OAUTH_APPLICATION,
    &OAUTH_ACCESS_TOKEN,
    &OAUTH_CONSENT,
    &CALENDAR_EVENTS,
    &MUSIC_PLAYLISTS,
    &MUSIC_TRACKS,
    &DAILY_TASKS,
];

/// Looks up a table definition by storage name
pub fn table(name: &str) -> Option<&'static TableDef> {
    TABLES.iter().copied().find(|t| t.name == name)
}

/// Creates every table and index that does not exist yet
///
/// All statements run inside one transaction; either the whole schema is
/// created or nothing is.
///
/// # Errors
///
/// Returns an error if any statement fails or the transaction cannot commit.
pub async fn apply_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    info!(tables = TABLES.len(), "Applying database schema");

    let mut tx = pool.begin().await?;

    for table in TABLES {
        sqlx::query(&table.create_table_sql())
            .execute(&mut *tx)
            .await?;

        for statement in table.create_index_sql() {
            sqlx::query(&statement).execute(&mut *tx).await?;
        }

        debug!(table = table.name, indexes = table.indexes.len(), "Table ready");
    }

    tx.commit().await?;

    info!("Database schema applied");
    Ok(())
}

/// Which declared tables and indexes exist in the database
#[derive(Debug, Clone)]
pub struct SchemaStatus {
    /// Declared tables present in the database
    pub tables_present: Vec<&'static str>,

    /// Declared tables missing from the database
    pub tables_missing: Vec<&'static str>,

    /// Declared indexes missing from the database
    pub indexes_missing: Vec<&'static str>,
}

impl SchemaStatus {
    /// Whether every declared table and index exists
    pub fn is_up_to_date(&self) -> bool {
        self.tables_missing.is_empty() && self.indexes_missing.is_empty()
    }
}

/// Compares the declared schema with the live database catalogue
///
/// # Errors
///
/// Returns an error if the catalogue cannot be queried.
pub async fn schema_status(pool: &SqlitePool) -> Result<SchemaStatus, sqlx::Error> {
    debug!("Checking schema status");

    let existing: Vec<(String, String)> = sqlx::query_as(
        "SELECT type, name FROM sqlite_master WHERE type IN ('table', 'index')",
    )
    .fetch_all(pool)
    .await?;

    let exists = |kind: &str, name: &str| existing.iter().any(|(t, n)| t == kind && n == name);

    let (tables_present, tables_missing): (Vec<_>, Vec<_>) = TABLES
        .iter()
        .map(|t| t.name)
        .partition(|name| exists("table", name));

    let indexes_missing = TABLES
        .iter()
        .flat_map(|t| t.indexes.iter())
        .map(|i| i.name)
        .filter(|name| !exists("index", name))
        .collect();

    Ok(SchemaStatus {
        tables_present,
        tables_missing,
        indexes_missing,
    })
}
