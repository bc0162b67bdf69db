//! Named relations between tables
//!
//! Relations name the lookup paths that callers compose queries from, e.g.
//! `user.calendarEvents` (one-to-many) or `musicTracks.playlist`
//! (many-to-one). They carry no constraints of their own; integrity comes from
//! the foreign keys declared in `db::schema`.
//!
//! ```text
//! user ──< calendar_events
//!      ──< music_playlists ──< music_tracks
//!      ──< daily_tasks
//! ```
//!
//! # Example
//!
//! ```
//! use daybook_shared::db::relations::find_relation;
//!
//! let relation = find_relation("user", "calendarEvents").unwrap();
//! assert_eq!(
//!     relation.join_condition(),
//!     "\"calendar_events\".\"user_id\" = \"user\".\"id\""
//! );
//! ```

/// Cardinality seen from the owning table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// Each row points at exactly one target row
    One,
    /// Each row is pointed at by any number of target rows
    Many,
}

/// A named lookup path from `table` to `target`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    /// Owning table
    pub table: &'static str,
    /// Relation name as exposed to callers
    pub name: &'static str,
    pub kind: RelationKind,
    /// Related table
    pub target: &'static str,
    /// Column on the owning table
    pub local_column: &'static str,
    /// Column on the related table
    pub target_column: &'static str,
}

impl Relation {
    const fn many(
        table: &'static str,
        name: &'static str,
        target: &'static str,
        target_column: &'static str,
    ) -> Self {
        Self {
            table,
            name,
            kind: RelationKind::Many,
            target,
            local_column: "id",
            target_column,
        }
    }

    const fn one(
        table: &'static str,
        name: &'static str,
        target: &'static str,
        local_column: &'static str,
    ) -> Self {
        Self {
            table,
            name,
            kind: RelationKind::One,
            target,
            local_column,
            target_column: "id",
        }
    }

    /// SQL join predicate between the two tables
    pub fn join_condition(&self) -> String {
        format!(
            "\"{}\".\"{}\" = \"{}\".\"{}\"",
            self.target, self.target_column, self.table, self.local_column
        )
    }
}

pub static RELATIONS: &[Relation] = &[
    Relation::many("user", "calendarEvents", "calendar_events", "user_id"),
    Relation::many("user", "musicPlaylists", "music_playlists", "user_id"),
    Relation::many("user", "dailyTasks", "daily_tasks", "user_id"),
    Relation::one("calendar_events", "user", "user", "user_id"),
    Relation::one("music_playlists", "user", "user", "user_id"),
    Relation::many("music_playlists", "tracks", "music_tracks", "playlist_id"),
    Relation::one("music_tracks", "playlist", "music_playlists", "playlist_id"),
    Relation::one("daily_tasks", "user", "user", "user_id"),
];

/// All relations owned by a table
pub fn relations_for(table: &str) -> impl Iterator<Item = &'static Relation> + '_ {
    RELATIONS.iter().filter(move |r| r.table == table)
}

/// Looks up a relation by owning table and name
pub fn find_relation(table: &str, name: &str) -> Option<&'static Relation> {
    RELATIONS.iter().find(|r| r.table == table && r.name == name)
}
