/// Calendar event endpoints
///
/// # Endpoints
///
/// - `GET /v1/users/:id/calendar-events?from=&to=` - List events by start time
/// - `POST /v1/users/:id/calendar-events` - Create an event
///
/// Times are Unix seconds.

use crate::{
    app::AppState,
    error::{validate, ApiError, ApiResult, ValidationErrorDetail},
    routes::users::require_user,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use daybook_shared::db::defaults::Timestamp;
use daybook_shared::models::calendar_event::{CalendarEvent, CreateCalendarEvent};
use serde::Deserialize;
use validator::Validate;

/// Optional start-time window
#[derive(Debug, Default, Deserialize)]
pub struct EventRange {
    /// Inclusive lower bound
    pub from: Option<i64>,

    /// Exclusive upper bound
    pub to: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    pub description: Option<String>,

    pub start_time: i64,

    pub end_time: i64,

    #[validate(length(max = 200, message = "Location must be at most 200 characters"))]
    pub location: Option<String>,
}

/// List a user's events, earliest first
///
/// Without `from`/`to` every event is returned. With either bound the list
/// is limited to events starting inside the window. An inverted window is
/// a `400 Bad Request`.
pub async fn list_events(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(range): Query<EventRange>,
) -> ApiResult<Json<Vec<CalendarEvent>>> {
    require_user(&state, &user_id).await?;

    if let (Some(from), Some(to)) = (range.from, range.to) {
        if from > to {
            return Err(ApiError::BadRequest(format!(
                "from ({}) is after to ({})",
                from, to
            )));
        }
    }

    let events = match (range.from, range.to) {
        (None, None) => CalendarEvent::list_by_user(&state.db, &user_id).await?,
        (from, to) => {
            CalendarEvent::list_by_user_in_range(
                &state.db,
                &user_id,
                Timestamp::from_unix(from.unwrap_or(i64::MIN)),
                Timestamp::from_unix(to.unwrap_or(i64::MAX)),
            )
            .await?
        }
    };

    Ok(Json(events))
}

/// Create an event
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed, end before start, or
///   the user does not exist
pub async fn create_event(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<CreateEventRequest>,
) -> ApiResult<(StatusCode, Json<CalendarEvent>)> {
    validate(&req)?;

    if req.end_time < req.start_time {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "end_time".to_string(),
            message: "End time must not be before start time".to_string(),
        }]));
    }

    let event = CalendarEvent::create(
        &state.db,
        CreateCalendarEvent {
            description: req.description,
            location: req.location,
            ..CreateCalendarEvent::new(
                user_id,
                req.title,
                Timestamp::from_unix(req.start_time),
                Timestamp::from_unix(req.end_time),
            )
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(event)))
}
