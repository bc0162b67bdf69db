/// Daily task endpoints
///
/// # Endpoints
///
/// - `GET /v1/users/:id/tasks?completed=&priority=&due_date=` - List tasks
/// - `POST /v1/users/:id/tasks` - Create a task (priority defaults to medium)
/// - `PATCH /v1/tasks/:id` - Update a task
///
/// # Example
///
/// ```text
/// PATCH /v1/tasks/0f8c...
/// Content-Type: application/json
///
/// { "completed": true, "due_date": null }
/// ```
///
/// A `null` clears `description` or `due_date`; an absent field is left as is.

use crate::{
    app::AppState,
    error::{validate, ApiResult},
    routes::users::require_user,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use daybook_shared::models::daily_task::{
    CreateDailyTask, DailyTask, Priority, TaskFilter, UpdateDailyTask,
};
use serde::{Deserialize, Deserializer};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    pub description: Option<String>,

    pub priority: Option<Priority>,

    /// Caller-formatted date, e.g. `2025-08-10`
    #[validate(length(min = 1, max = 32, message = "Due date must be 1-32 characters"))]
    pub due_date: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,

    pub completed: Option<bool>,

    pub priority: Option<Priority>,

    #[serde(default, deserialize_with = "nullable")]
    pub due_date: Option<Option<String>>,
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent field (`None`)
fn nullable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(filter): Query<TaskFilter>,
) -> ApiResult<Json<Vec<DailyTask>>> {
    require_user(&state, &user_id).await?;
    Ok(Json(DailyTask::list_by_user(&state.db, &user_id, filter).await?))
}

/// Create a task
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed or the user does not exist
pub async fn create_task(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<DailyTask>)> {
    validate(&req)?;

    let task = DailyTask::create(
        &state.db,
        CreateDailyTask {
            description: req.description,
            priority: req.priority,
            due_date: req.due_date,
            ..CreateDailyTask::new(user_id, req.title)
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Update a task
///
/// # Errors
///
/// - `404 Not Found`: No task with this id
/// - `422 Unprocessable Entity`: Validation failed
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<DailyTask>> {
    validate(&req)?;

    let task = DailyTask::update(
        &state.db,
        &id,
        UpdateDailyTask {
            title: req.title,
            description: req.description,
            completed: req.completed,
            priority: req.priority,
            due_date: req.due_date,
        },
    )
    .await?;

    Ok(Json(task))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_null_vs_absent() {
        let req: UpdateTaskRequest =
            serde_json::from_str(r#"{"completed": true, "due_date": null}"#).unwrap();

        assert_eq!(req.completed, Some(true));
        assert_eq!(req.due_date, Some(None));
        assert_eq!(req.description, None);
    }

    #[test]
    fn test_create_request_rejects_unknown_priority() {
        let result: Result<CreateTaskRequest, _> =
            serde_json::from_str(r#"{"title": "t", "priority": "urgent"}"#);
        assert!(result.is_err());
    }
}
