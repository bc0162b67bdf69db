/// Calendar event model and database operations
///
/// Events belong to a user and are deleted with it. Listing is ordered by
/// start time and served by `calendar_events_user_id_idx` and
/// `calendar_events_start_time_idx`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE "calendar_events" (
///     "id" TEXT PRIMARY KEY NOT NULL,
///     "user_id" TEXT NOT NULL REFERENCES "user"("id") ON DELETE CASCADE,
///     "title" TEXT NOT NULL,
///     "description" TEXT,
///     "start_time" INTEGER NOT NULL,
///     "end_time" INTEGER NOT NULL,
///     "location" TEXT,
///     "created_at" INTEGER NOT NULL,
///     "updated_at" INTEGER NOT NULL
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use daybook_shared::db::defaults::Timestamp;
/// use daybook_shared::models::calendar_event::{CalendarEvent, CreateCalendarEvent};
/// # use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool, user_id: String) -> Result<(), Box<dyn std::error::Error>> {
/// let start = Timestamp::now();
/// let event = CalendarEvent::create(
///     &pool,
///     CreateCalendarEvent::new(user_id.clone(), "Standup", start, start.plus_seconds(900)),
/// )
/// .await?;
///
/// let today = CalendarEvent::list_by_user_in_range(&pool, &user_id, start, start.plus_seconds(86_400)).await?;
/// assert_eq!(today[0].id, event.id);
/// # Ok(())
/// # }
/// ```

use crate::db::defaults::{id_or_generate, Timestamp};
use crate::error::{DbError, DbResult};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

/// Calendar event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CalendarEvent {
    pub id: String,

    /// Owning user
    pub user_id: String,

    pub title: String,
    pub description: Option<String>,

    /// Event start
    pub start_time: Timestamp,

    /// Event end
    pub end_time: Timestamp,

    pub location: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for creating a calendar event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCalendarEvent {
    pub id: Option<String>,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub location: Option<String>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl CreateCalendarEvent {
    pub fn new(
        user_id: impl Into<String>,
        title: impl Into<String>,
        start_time: Timestamp,
        end_time: Timestamp,
    ) -> Self {
        Self {
            id: None,
            user_id: user_id.into(),
            title: title.into(),
            description: None,
            start_time,
            end_time,
            location: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Input for updating a calendar event
///
/// `None` leaves a column untouched. For the nullable columns `Some(None)`
/// clears the value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCalendarEvent {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    pub location: Option<Option<String>>,
}

impl CalendarEvent {
    /// Creates an event for an existing user
    ///
    /// # Errors
    ///
    /// `ForeignKeyViolation` if `user_id` names no user; nothing is written
    pub async fn create(pool: &SqlitePool, data: CreateCalendarEvent) -> DbResult<Self> {
        let now = Timestamp::now();

        let event = sqlx::query_as::<_, CalendarEvent>(
            r#"
            INSERT INTO calendar_events (
                id, user_id, title, description, start_time, end_time, location, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, user_id, title, description, start_time, end_time, location,
                      created_at, updated_at
            "#,
        )
        .bind(id_or_generate(data.id))
        .bind(data.user_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(data.location)
        .bind(data.created_at.unwrap_or(now))
        .bind(data.updated_at.unwrap_or(now))
        .fetch_one(pool)
        .await?;

        debug!(event_id = %event.id, user_id = %event.user_id, "Created calendar event");
        Ok(event)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: &str) -> DbResult<Option<Self>> {
        let event = sqlx::query_as::<_, CalendarEvent>(
            r#"
            SELECT id, user_id, title, description, start_time, end_time, location,
                   created_at, updated_at
            FROM calendar_events
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(event)
    }

    /// Lists a user's events, earliest start first
    pub async fn list_by_user(pool: &SqlitePool, user_id: &str) -> DbResult<Vec<Self>> {
        let events = sqlx::query_as::<_, CalendarEvent>(
            r#"
            SELECT id, user_id, title, description, start_time, end_time, location,
                   created_at, updated_at
            FROM calendar_events
            WHERE user_id = ?
            ORDER BY start_time, id
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(events)
    }

    /// Lists a user's events starting in `[start, end)`, earliest first
    pub async fn list_by_user_in_range(
        pool: &SqlitePool,
        user_id: &str,
        start: Timestamp,
        end: Timestamp,
    ) -> DbResult<Vec<Self>> {
        let events = sqlx::query_as::<_, CalendarEvent>(
            r#"
            SELECT id, user_id, title, description, start_time, end_time, location,
                   created_at, updated_at
            FROM calendar_events
            WHERE user_id = ? AND start_time >= ? AND start_time < ?
            ORDER BY start_time, id
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;

        Ok(events)
    }

    /// Updates an event, bumping `updated_at`
    ///
    /// # Errors
    ///
    /// `NotFound` if no event has this ID
    pub async fn update(pool: &SqlitePool, id: &str, data: UpdateCalendarEvent) -> DbResult<Self> {
        let set_description = data.description.is_some();
        let set_location = data.location.is_some();

        sqlx::query_as::<_, CalendarEvent>(
            r#"
            UPDATE calendar_events SET
                title = COALESCE(?, title),
                description = CASE WHEN ? THEN ? ELSE description END,
                start_time = COALESCE(?, start_time),
                end_time = COALESCE(?, end_time),
                location = CASE WHEN ? THEN ? ELSE location END,
                updated_at = ?
            WHERE id = ?
            RETURNING id, user_id, title, description, start_time, end_time, location,
                      created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(set_description)
        .bind(data.description.flatten())
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(set_location)
        .bind(data.location.flatten())
        .bind(Timestamp::now())
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DbError::not_found("calendar_event", id))
    }

    /// Event length in seconds, clamped to the `i64` range
    pub fn duration_seconds(&self) -> i64 {
        self.end_time.unix().saturating_sub(self.start_time.unix())
    }

    pub async fn delete(pool: &SqlitePool, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM calendar_events WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("calendar_event", id));
        }

        Ok(())
    }
}
