//! PostgreSQL repository
//!
//! Relationship lists are `UUID[]` columns. Every mutation is a single
//! statement, so concurrent requests touching the same row are serialized by
//! the row lock instead of overwriting each other's changes. Playlist writes
//! carry the actor's rights in their `WHERE` clause; when nothing matches, a
//! follow-up read tells a missing playlist from a denied or no-op write.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{
    LikeState, PlaylistRepository, PlaylistWrite, SongRepository, UserRepository, order_by_ids,
    unmatched,
};
use crate::{
    authorization::{can_manage_collaborators, can_modify_playlist},
    models::{
        NewPlaylist, NewSong, Playlist, PlaylistChanges, Song, SongChanges, User, UserSummary,
    },
};

/// Repository backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    /// Create a new repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Outcome of a guarded playlist write, given the row it returned
    async fn written(
        &self,
        id: Uuid,
        returned: Option<Playlist>,
        permitted: impl Fn(&Playlist) -> bool,
        otherwise: impl FnOnce(Playlist) -> PlaylistWrite,
    ) -> Result<PlaylistWrite> {
        if let Some(playlist) = returned {
            return Ok(PlaylistWrite::Applied(playlist));
        }

        let stored = PlaylistRepository::find_by_id(self, id).await?;
        Ok(unmatched(stored, permitted, otherwise))
    }

    fn like_state(liked: bool) -> LikeState {
        if liked {
            LikeState::Liked
        } else {
            LikeState::Unliked
        }
    }
}

#[async_trait]
impl UserRepository for PgRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, email, liked_songs, liked_playlists,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_summaries(&self, ids: &[Uuid]) -> Result<Vec<UserSummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT id, first_name, last_name
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(order_by_ids(ids, users, |u| u.id))
    }

    async fn toggle_liked_song(&self, user_id: Uuid, song_id: Uuid) -> Result<Option<LikeState>> {
        let row = sqlx::query(
            r#"
            UPDATE users
            SET liked_songs = CASE
                    WHEN $2 = ANY(liked_songs) THEN array_remove(liked_songs, $2)
                    ELSE array_append(liked_songs, $2)
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING $2 = ANY(liked_songs) AS liked
            "#,
        )
        .bind(user_id)
        .bind(song_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Self::like_state(row.get("liked"))))
    }

    async fn toggle_liked_playlist(
        &self,
        user_id: Uuid,
        playlist_id: Uuid,
    ) -> Result<Option<LikeState>> {
        let row = sqlx::query(
            r#"
            UPDATE users
            SET liked_playlists = CASE
                    WHEN $2 = ANY(liked_playlists) THEN array_remove(liked_playlists, $2)
                    ELSE array_append(liked_playlists, $2)
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING $2 = ANY(liked_playlists) AS liked
            "#,
        )
        .bind(user_id)
        .bind(playlist_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Self::like_state(row.get("liked"))))
    }
}

#[async_trait]
impl SongRepository for PgRepository {
    async fn list(&self) -> Result<Vec<Song>> {
        let songs = sqlx::query_as::<_, Song>(
            r#"
            SELECT id, name, thumbnail, track, artist, created_at, updated_at
            FROM songs
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(songs)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Song>> {
        let song = sqlx::query_as::<_, Song>(
            r#"
            SELECT id, name, thumbnail, track, artist, created_at, updated_at
            FROM songs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(song)
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Song>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let songs = sqlx::query_as::<_, Song>(
            r#"
            SELECT id, name, thumbnail, track, artist, created_at, updated_at
            FROM songs
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(order_by_ids(ids, songs, |s| s.id))
    }

    async fn create(&self, song: NewSong) -> Result<Song> {
        let song = sqlx::query_as::<_, Song>(
            r#"
            INSERT INTO songs (id, name, thumbnail, track, artist)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, thumbnail, track, artist, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&song.name)
        .bind(&song.thumbnail)
        .bind(&song.track)
        .bind(song.artist)
        .fetch_one(&self.pool)
        .await?;

        Ok(song)
    }

    async fn update(&self, id: Uuid, changes: SongChanges) -> Result<Option<Song>> {
        let song = sqlx::query_as::<_, Song>(
            r#"
            UPDATE songs
            SET name = COALESCE($2, name),
                thumbnail = COALESCE($3, thumbnail),
                track = COALESCE($4, track),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, thumbnail, track, artist, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.thumbnail)
        .bind(changes.track)
        .fetch_optional(&self.pool)
        .await?;

        Ok(song)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM songs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl PlaylistRepository for PgRepository {
    async fn list(&self) -> Result<Vec<Playlist>> {
        let playlists = sqlx::query_as::<_, Playlist>(
            r#"
            SELECT id, name, description, thumbnail, owner, songs, collaborators,
                   is_public, total_duration, created_at, updated_at
            FROM playlists
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(playlists)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Playlist>> {
        let playlist = sqlx::query_as::<_, Playlist>(
            r#"
            SELECT id, name, description, thumbnail, owner, songs, collaborators,
                   is_public, total_duration, created_at, updated_at
            FROM playlists
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(playlist)
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Playlist>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let playlists = sqlx::query_as::<_, Playlist>(
            r#"
            SELECT id, name, description, thumbnail, owner, songs, collaborators,
                   is_public, total_duration, created_at, updated_at
            FROM playlists
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(order_by_ids(ids, playlists, |p| p.id))
    }

    async fn create(&self, playlist: NewPlaylist) -> Result<Playlist> {
        let playlist = sqlx::query_as::<_, Playlist>(
            r#"
            INSERT INTO playlists (id, name, description, thumbnail, owner)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, thumbnail, owner, songs, collaborators,
                      is_public, total_duration, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&playlist.name)
        .bind(&playlist.description)
        .bind(&playlist.thumbnail)
        .bind(playlist.owner)
        .fetch_one(&self.pool)
        .await?;

        Ok(playlist)
    }

    async fn update(
        &self,
        id: Uuid,
        actor: Uuid,
        changes: PlaylistChanges,
    ) -> Result<PlaylistWrite> {
        let returned = sqlx::query_as::<_, Playlist>(
            r#"
            UPDATE playlists
            SET name = COALESCE($3, name),
                description = COALESCE($4, description),
                thumbnail = COALESCE($5, thumbnail),
                is_public = COALESCE($6, is_public),
                updated_at = NOW()
            WHERE id = $1 AND (owner = $2 OR $2 = ANY(collaborators))
            RETURNING id, name, description, thumbnail, owner, songs, collaborators,
                      is_public, total_duration, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(actor)
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.thumbnail)
        .bind(changes.is_public)
        .fetch_optional(&self.pool)
        .await?;

        self.written(
            id,
            returned,
            |p| can_modify_playlist(actor, p),
            PlaylistWrite::Applied,
        )
        .await
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM playlists WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_song(&self, id: Uuid, actor: Uuid, song_id: Uuid) -> Result<PlaylistWrite> {
        let returned = sqlx::query_as::<_, Playlist>(
            r#"
            UPDATE playlists
            SET songs = array_append(songs, $3),
                updated_at = NOW()
            WHERE id = $1
              AND (owner = $2 OR $2 = ANY(collaborators))
              AND NOT ($3 = ANY(songs))
            RETURNING id, name, description, thumbnail, owner, songs, collaborators,
                      is_public, total_duration, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(actor)
        .bind(song_id)
        .fetch_optional(&self.pool)
        .await?;

        // Allowed but unmatched: the song is already there
        self.written(
            id,
            returned,
            |p| can_modify_playlist(actor, p),
            |_| PlaylistWrite::Duplicate,
        )
        .await
    }

    async fn remove_song(&self, id: Uuid, actor: Uuid, song_id: Uuid) -> Result<PlaylistWrite> {
        let returned = sqlx::query_as::<_, Playlist>(
            r#"
            UPDATE playlists
            SET songs = array_remove(songs, $3),
                updated_at = NOW()
            WHERE id = $1 AND (owner = $2 OR $2 = ANY(collaborators))
            RETURNING id, name, description, thumbnail, owner, songs, collaborators,
                      is_public, total_duration, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(actor)
        .bind(song_id)
        .fetch_optional(&self.pool)
        .await?;

        self.written(
            id,
            returned,
            |p| can_modify_playlist(actor, p),
            PlaylistWrite::Applied,
        )
        .await
    }

    async fn add_collaborator(
        &self,
        id: Uuid,
        actor: Uuid,
        user_id: Uuid,
    ) -> Result<PlaylistWrite> {
        let returned = sqlx::query_as::<_, Playlist>(
            r#"
            UPDATE playlists
            SET collaborators = array_append(collaborators, $3),
                updated_at = NOW()
            WHERE id = $1 AND owner = $2 AND NOT ($3 = ANY(collaborators))
            RETURNING id, name, description, thumbnail, owner, songs, collaborators,
                      is_public, total_duration, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(actor)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        // Allowed but unmatched: already a collaborator, row left untouched
        self.written(
            id,
            returned,
            |p| can_manage_collaborators(actor, p),
            PlaylistWrite::Applied,
        )
        .await
    }

    async fn remove_collaborator(
        &self,
        id: Uuid,
        actor: Uuid,
        user_id: Uuid,
    ) -> Result<PlaylistWrite> {
        let returned = sqlx::query_as::<_, Playlist>(
            r#"
            UPDATE playlists
            SET collaborators = array_remove(collaborators, $3),
                updated_at = NOW()
            WHERE id = $1 AND owner = $2
            RETURNING id, name, description, thumbnail, owner, songs, collaborators,
                      is_public, total_duration, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(actor)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        self.written(
            id,
            returned,
            |p| can_manage_collaborators(actor, p),
            PlaylistWrite::Applied,
        )
        .await
    }
}
