/// Default-value factories for the insert path
///
/// Identifiers and timestamps are generated by the application, not by the
/// storage engine. Model `create` functions call these factories only for
/// fields the caller left as `None`, so a caller-supplied value always wins.
///
/// Timestamps are stored as integer Unix seconds.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a fresh opaque identifier (UUID v4, hyphenated)
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Returns the caller's id, or a freshly generated one
pub fn id_or_generate(id: Option<String>) -> String {
    id.unwrap_or_else(generate_id)
}

/// Returns the caller's timestamp, or the current time
pub fn timestamp_or_now(timestamp: Option<Timestamp>) -> Timestamp {
    timestamp.unwrap_or_else(Timestamp::now)
}

/// Point in time with second precision, stored as an integer column
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Current wall-clock time
    pub fn now() -> Self {
        Self(Utc::now().timestamp())
    }

    /// Builds a timestamp from Unix seconds
    pub const fn from_unix(seconds: i64) -> Self {
        Self(seconds)
    }

    /// Unix seconds
    pub const fn unix(&self) -> i64 {
        self.0
    }

    /// Timestamp shifted by the given number of seconds (may be negative),
    /// clamped to the representable range
    pub const fn plus_seconds(self, seconds: i64) -> Self {
        Self(self.0.saturating_add(seconds))
    }

    /// Converts to a chrono `DateTime<Utc>`
    pub fn to_datetime(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.0, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Whether this instant lies before the current time
    pub fn is_past(&self) -> bool {
        *self < Self::now()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value.timestamp())
    }
}
