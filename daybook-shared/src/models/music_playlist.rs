/// Music playlist model and database operations
///
/// Playlists belong to a user; tracks belong to a playlist. Deleting a
/// playlist removes its tracks, and deleting the user removes both.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE "music_playlists" (
///     "id" TEXT PRIMARY KEY NOT NULL,
///     "user_id" TEXT NOT NULL REFERENCES "user"("id") ON DELETE CASCADE,
///     "name" TEXT NOT NULL,
///     "description" TEXT,
///     "is_active" INTEGER NOT NULL DEFAULT 0,
///     "created_at" INTEGER NOT NULL,
///     "updated_at" INTEGER NOT NULL
/// );
/// ```

use crate::db::defaults::{id_or_generate, Timestamp};
use crate::error::{DbError, DbResult};
use crate::models::music_track::MusicTrack;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info};

/// Music playlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MusicPlaylist {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,

    /// Whether this is the playlist currently playing
    pub is_active: bool,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A playlist together with its tracks in play order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistWithTracks {
    #[serde(flatten)]
    pub playlist: MusicPlaylist,
    pub tracks: Vec<MusicTrack>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateMusicPlaylist {
    pub id: Option<String>,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,

    /// Defaults to false
    pub is_active: Option<bool>,

    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl CreateMusicPlaylist {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Input for updating a playlist (`Some(None)` clears the description)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMusicPlaylist {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl MusicPlaylist {
    /// Creates a playlist for an existing user
    ///
    /// # Errors
    ///
    /// `ForeignKeyViolation` if the user does not exist
    pub async fn create(pool: &SqlitePool, data: CreateMusicPlaylist) -> DbResult<Self> {
        let now = Timestamp::now();

        let playlist = sqlx::query_as::<_, MusicPlaylist>(
            r#"
            INSERT INTO music_playlists (id, user_id, name, description, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id, user_id, name, description, is_active, created_at, updated_at
            "#,
        )
        .bind(id_or_generate(data.id))
        .bind(data.user_id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.is_active.unwrap_or(false))
        .bind(data.created_at.unwrap_or(now))
        .bind(data.updated_at.unwrap_or(now))
        .fetch_one(pool)
        .await?;

        debug!(playlist_id = %playlist.id, user_id = %playlist.user_id, "Created playlist");
        Ok(playlist)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: &str) -> DbResult<Option<Self>> {
        let playlist = sqlx::query_as::<_, MusicPlaylist>(
            r#"
            SELECT id, user_id, name, description, is_active, created_at, updated_at
            FROM music_playlists
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(playlist)
    }

    /// Lists a user's playlists in creation order
    pub async fn list_by_user(pool: &SqlitePool, user_id: &str) -> DbResult<Vec<Self>> {
        let playlists = sqlx::query_as::<_, MusicPlaylist>(
            r#"
            SELECT id, user_id, name, description, is_active, created_at, updated_at
            FROM music_playlists
            WHERE user_id = ?
            ORDER BY created_at, id
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(playlists)
    }

    /// Loads a playlist and its tracks ordered by `track_order`
    ///
    /// Both reads run in one transaction so the tracks match the playlist.
    pub async fn find_with_tracks(pool: &SqlitePool, id: &str) -> DbResult<Option<PlaylistWithTracks>> {
        let mut tx = pool.begin().await?;

        let playlist = sqlx::query_as::<_, MusicPlaylist>(
            r#"
            SELECT id, user_id, name, description, is_active, created_at, updated_at
            FROM music_playlists
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(playlist) = playlist else {
            return Ok(None);
        };

        let tracks = sqlx::query_as::<_, MusicTrack>(
            r#"
            SELECT id, playlist_id, title, artist, duration, track_order, is_current, created_at
            FROM music_tracks
            WHERE playlist_id = ?
            ORDER BY track_order, id
            "#,
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(PlaylistWithTracks { playlist, tracks }))
    }

    /// Updates a playlist, bumping `updated_at`
    ///
    /// # Errors
    ///
    /// `NotFound` if no playlist has this ID
    pub async fn update(pool: &SqlitePool, id: &str, data: UpdateMusicPlaylist) -> DbResult<Self> {
        let set_description = data.description.is_some();

        sqlx::query_as::<_, MusicPlaylist>(
            r#"
            UPDATE music_playlists SET
                name = COALESCE(?, name),
                description = CASE WHEN ? THEN ? ELSE description END,
                is_active = COALESCE(?, is_active),
                updated_at = ?
            WHERE id = ?
            RETURNING id, user_id, name, description, is_active, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(set_description)
        .bind(data.description.flatten())
        .bind(data.is_active)
        .bind(Timestamp::now())
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DbError::not_found("music_playlist", id))
    }

    /// Deletes a playlist and, through the cascade, all of its tracks
    pub async fn delete(pool: &SqlitePool, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM music_playlists WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("music_playlist", id));
        }

        info!(playlist_id = %id, "Deleted playlist");
        Ok(())
    }
}
