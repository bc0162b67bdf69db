/// User endpoints
///
/// # Endpoints
///
/// - `POST /v1/users` - Create a user
/// - `GET /v1/users/:id` - Fetch a user
/// - `DELETE /v1/users/:id` - Delete a user and everything it owns

use crate::{
    app::AppState,
    error::{validate, ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use daybook_shared::models::user::{CreateUser, User};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

/// Create user request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Optional avatar URL
    #[validate(url(message = "Image must be a URL"))]
    pub image: Option<String>,
}

/// Create a user
///
/// # Errors
///
/// - `409 Conflict`: Email already exists
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    validate(&req)?;

    let user = User::create(
        &state.db,
        CreateUser {
            image: req.image,
            ..CreateUser::new(req.name, req.email)
        },
    )
    .await?;

    info!(user_id = %user.id, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// Fetch a user by id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    require_user(&state, &id).await.map(Json)
}

/// Delete a user
///
/// Sessions, accounts, calendar events, playlists with their tracks and
/// daily tasks go with it.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    User::delete(&state.db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Fails with 404 unless the user exists
pub(crate) async fn require_user(state: &AppState, id: &str) -> ApiResult<User> {
    User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user {} not found", id)))
}
