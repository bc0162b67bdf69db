/// Daily task model and database operations
///
/// Tasks belong to a user. `priority` is one of low/medium/high and is
/// `medium` unless the caller picks one. `due_date` is a caller-formatted
/// date string (e.g. `2025-08-10`), so filtering on it is an exact match.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE "daily_tasks" (
///     "id" TEXT PRIMARY KEY NOT NULL,
///     "user_id" TEXT NOT NULL REFERENCES "user"("id") ON DELETE CASCADE,
///     "title" TEXT NOT NULL,
///     "description" TEXT,
///     "completed" INTEGER NOT NULL DEFAULT 0,
///     "priority" TEXT NOT NULL DEFAULT 'medium'
///         CHECK ("priority" IN ('low', 'medium', 'high')),
///     "due_date" TEXT,
///     "created_at" INTEGER NOT NULL,
///     "updated_at" INTEGER NOT NULL
/// );
/// ```

use crate::db::defaults::{id_or_generate, Timestamp};
use crate::error::{DbError, DbResult};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Task priority
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority: {}", other)),
        }
    }
}

/// Daily task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DailyTask {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: Priority,
    pub due_date: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for creating a task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateDailyTask {
    pub id: Option<String>,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,

    /// Defaults to false
    pub completed: Option<bool>,

    /// Defaults to [`Priority::Medium`]
    pub priority: Option<Priority>,

    pub due_date: Option<String>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl CreateDailyTask {
    pub fn new(user_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Input for updating a task
///
/// `Some(None)` clears `description` or `due_date`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDailyTask {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<String>>,
}

/// Optional filters for [`DailyTask::list_by_user`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFilter {
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub due_date: Option<String>,
}

impl DailyTask {
    /// Creates a task for an existing user
    ///
    /// # Errors
    ///
    /// `ForeignKeyViolation` if the user does not exist
    pub async fn create(pool: &SqlitePool, data: CreateDailyTask) -> DbResult<Self> {
        let now = Timestamp::now();

        let task = sqlx::query_as::<_, DailyTask>(
            r#"
            INSERT INTO daily_tasks (
                id, user_id, title, description, completed, priority, due_date, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, user_id, title, description, completed, priority, due_date,
                      created_at, updated_at
            "#,
        )
        .bind(id_or_generate(data.id))
        .bind(data.user_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.completed.unwrap_or(false))
        .bind(data.priority.unwrap_or_default())
        .bind(data.due_date)
        .bind(data.created_at.unwrap_or(now))
        .bind(data.updated_at.unwrap_or(now))
        .fetch_one(pool)
        .await?;

        debug!(task_id = %task.id, priority = %task.priority, "Created daily task");
        Ok(task)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: &str) -> DbResult<Option<Self>> {
        let task = sqlx::query_as::<_, DailyTask>(
            r#"
            SELECT id, user_id, title, description, completed, priority, due_date,
                   created_at, updated_at
            FROM daily_tasks
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists a user's tasks matching every filter that is set
    ///
    /// Tasks with a due date come first (earliest first), then undated tasks
    /// in creation order.
    pub async fn list_by_user(
        pool: &SqlitePool,
        user_id: &str,
        filter: TaskFilter,
    ) -> DbResult<Vec<Self>> {
        let tasks = sqlx::query_as::<_, DailyTask>(
            r#"
            SELECT id, user_id, title, description, completed, priority, due_date,
                   created_at, updated_at
            FROM daily_tasks
            WHERE user_id = ?
              AND (? IS NULL OR completed = ?)
              AND (? IS NULL OR priority = ?)
              AND (? IS NULL OR due_date = ?)
            ORDER BY due_date IS NULL, due_date, created_at, id
            "#,
        )
        .bind(user_id)
        .bind(filter.completed)
        .bind(filter.completed)
        .bind(filter.priority)
        .bind(filter.priority)
        .bind(filter.due_date.as_deref())
        .bind(filter.due_date.as_deref())
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Updates a task, bumping `updated_at`
    ///
    /// # Errors
    ///
    /// `NotFound` if no task has this ID
    pub async fn update(pool: &SqlitePool, id: &str, data: UpdateDailyTask) -> DbResult<Self> {
        let set_description = data.description.is_some();
        let set_due_date = data.due_date.is_some();

        sqlx::query_as::<_, DailyTask>(
            r#"
            UPDATE daily_tasks SET
                title = COALESCE(?, title),
                description = CASE WHEN ? THEN ? ELSE description END,
                completed = COALESCE(?, completed),
                priority = COALESCE(?, priority),
                due_date = CASE WHEN ? THEN ? ELSE due_date END,
                updated_at = ?
            WHERE id = ?
            RETURNING id, user_id, title, description, completed, priority, due_date,
                      created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(set_description)
        .bind(data.description.flatten())
        .bind(data.completed)
        .bind(data.priority)
        .bind(set_due_date)
        .bind(data.due_date.flatten())
        .bind(Timestamp::now())
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DbError::not_found("daily_task", id))
    }

    pub async fn delete(pool: &SqlitePool, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM daily_tasks WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("daily_task", id));
        }

        Ok(())
    }
}
