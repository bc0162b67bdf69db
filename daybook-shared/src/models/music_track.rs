/// Music track model and database operations
///
/// `track_order` carries no uniqueness and `is_current` may be set on any
/// number of tracks; callers own those conventions.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE "music_tracks" (
///     "id" TEXT PRIMARY KEY NOT NULL,
///     "playlist_id" TEXT NOT NULL REFERENCES "music_playlists"("id") ON DELETE CASCADE,
///     "title" TEXT NOT NULL,
///     "artist" TEXT NOT NULL,
///     "duration" INTEGER NOT NULL,
///     "track_order" INTEGER NOT NULL,
///     "is_current" INTEGER NOT NULL DEFAULT 0,
///     "created_at" INTEGER NOT NULL
/// );
/// ```

use crate::db::defaults::{id_or_generate, Timestamp};
use crate::error::{DbError, DbResult};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MusicTrack {
    pub id: String,
    pub playlist_id: String,
    pub title: String,
    pub artist: String,

    /// Length in seconds
    pub duration: i64,

    /// Position within the playlist
    pub track_order: i64,

    pub is_current: bool,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateMusicTrack {
    pub id: Option<String>,
    pub playlist_id: String,
    pub title: String,
    pub artist: String,
    pub duration: i64,
    pub track_order: i64,
    pub is_current: Option<bool>,
    pub created_at: Option<Timestamp>,
}

impl CreateMusicTrack {
    pub fn new(
        playlist_id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        duration: i64,
        track_order: i64,
    ) -> Self {
        Self {
            playlist_id: playlist_id.into(),
            title: title.into(),
            artist: artist.into(),
            duration,
            track_order,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMusicTrack {
    /// Moves the track to another playlist (must exist)
    pub playlist_id: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub duration: Option<i64>,
    pub track_order: Option<i64>,
    pub is_current: Option<bool>,
}

impl MusicTrack {
    /// Adds a track to an existing playlist
    ///
    /// # Errors
    ///
    /// `ForeignKeyViolation` if the playlist does not exist
    pub async fn create(pool: &SqlitePool, data: CreateMusicTrack) -> DbResult<Self> {
        let track = sqlx::query_as::<_, MusicTrack>(
            r#"
            INSERT INTO music_tracks (id, playlist_id, title, artist, duration, track_order, is_current, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, playlist_id, title, artist, duration, track_order, is_current, created_at
            "#,
        )
        .bind(id_or_generate(data.id))
        .bind(data.playlist_id)
        .bind(data.title)
        .bind(data.artist)
        .bind(data.duration)
        .bind(data.track_order)
        .bind(data.is_current.unwrap_or(false))
        .bind(data.created_at.unwrap_or_else(Timestamp::now))
        .fetch_one(pool)
        .await?;

        debug!(track_id = %track.id, playlist_id = %track.playlist_id, "Added track");
        Ok(track)
    }

    /// Lists a playlist's tracks by `track_order`
    ///
    /// Ties keep a stable order by id.
    pub async fn list_by_playlist(pool: &SqlitePool, playlist_id: &str) -> DbResult<Vec<Self>> {
        let tracks = sqlx::query_as::<_, MusicTrack>(
            r#"
            SELECT id, playlist_id, title, artist, duration, track_order, is_current, created_at
            FROM music_tracks
            WHERE playlist_id = ?
            ORDER BY track_order, id
            "#,
        )
        .bind(playlist_id)
        .fetch_all(pool)
        .await?;

        Ok(tracks)
    }

    /// Updates a track
    ///
    /// # Errors
    ///
    /// - `NotFound` if no track has this ID
    /// - `ForeignKeyViolation` if `playlist_id` names no playlist
    pub async fn update(pool: &SqlitePool, id: &str, data: UpdateMusicTrack) -> DbResult<Self> {
        sqlx::query_as::<_, MusicTrack>(
            r#"
            UPDATE music_tracks SET
                playlist_id = COALESCE(?, playlist_id),
                title = COALESCE(?, title),
                artist = COALESCE(?, artist),
                duration = COALESCE(?, duration),
                track_order = COALESCE(?, track_order),
                is_current = COALESCE(?, is_current)
            WHERE id = ?
            RETURNING id, playlist_id, title, artist, duration, track_order, is_current, created_at
            "#,
        )
        .bind(data.playlist_id)
        .bind(data.title)
        .bind(data.artist)
        .bind(data.duration)
        .bind(data.track_order)
        .bind(data.is_current)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DbError::not_found("music_track", id))
    }

    pub async fn delete(pool: &SqlitePool, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM music_tracks WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("music_track", id));
        }

        Ok(())
    }
}
