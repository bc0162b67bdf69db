/// Playlist and track endpoints
///
/// # Endpoints
///
/// - `GET /v1/users/:id/playlists` - List a user's playlists
/// - `POST /v1/users/:id/playlists` - Create a playlist
/// - `GET /v1/playlists/:id` - Playlist with its tracks in play order
/// - `GET /v1/playlists/:id/tracks` - Tracks in play order
/// - `POST /v1/playlists/:id/tracks` - Add a track

use crate::{
    app::AppState,
    error::{validate, ApiError, ApiResult},
    routes::users::require_user,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use daybook_shared::models::{
    music_playlist::{CreateMusicPlaylist, MusicPlaylist, PlaylistWithTracks},
    music_track::{CreateMusicTrack, MusicTrack},
};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePlaylistRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    pub description: Option<String>,

    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddTrackRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 200, message = "Artist must be 1-200 characters"))]
    pub artist: String,

    /// Length in seconds
    #[validate(range(min = 0, message = "Duration must not be negative"))]
    pub duration: i64,

    /// Position in the playlist; appended after the last track when omitted
    pub track_order: Option<i64>,

    #[serde(default)]
    pub is_current: bool,
}

pub async fn list_playlists(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<MusicPlaylist>>> {
    require_user(&state, &user_id).await?;
    Ok(Json(MusicPlaylist::list_by_user(&state.db, &user_id).await?))
}

/// Create a playlist
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed or the user does not exist
pub async fn create_playlist(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<CreatePlaylistRequest>,
) -> ApiResult<(StatusCode, Json<MusicPlaylist>)> {
    validate(&req)?;

    let playlist = MusicPlaylist::create(
        &state.db,
        CreateMusicPlaylist {
            description: req.description,
            is_active: Some(req.is_active),
            ..CreateMusicPlaylist::new(user_id, req.name)
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(playlist)))
}

pub async fn get_playlist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PlaylistWithTracks>> {
    MusicPlaylist::find_with_tracks(&state.db, &id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("playlist {} not found", id)))
}

pub async fn list_tracks(
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
) -> ApiResult<Json<Vec<MusicTrack>>> {
    if MusicPlaylist::find_by_id(&state.db, &playlist_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("playlist {} not found", playlist_id)));
    }

    Ok(Json(MusicTrack::list_by_playlist(&state.db, &playlist_id).await?))
}

/// Add a track to a playlist
///
/// # Errors
///
/// - `400 Bad Request`: `track_order` omitted and the last track already sits at `i64::MAX`
/// - `422 Unprocessable Entity`: Validation failed or the playlist does not exist
pub async fn add_track(
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
    Json(req): Json<AddTrackRequest>,
) -> ApiResult<(StatusCode, Json<MusicTrack>)> {
    validate(&req)?;

    let track_order = match req.track_order {
        Some(order) => order,
        None => MusicTrack::list_by_playlist(&state.db, &playlist_id)
            .await?
            .iter()
            .map(|t| t.track_order)
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| {
                ApiError::BadRequest(
                    "Playlist has no room after its last track; pass track_order".to_string(),
                )
            })?,
    };

    let track = MusicTrack::create(
        &state.db,
        CreateMusicTrack {
            is_current: Some(req.is_current),
            ..CreateMusicTrack::new(playlist_id, req.title, req.artist, req.duration, track_order)
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(track)))
}
