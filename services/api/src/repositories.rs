//! Repositories for the users, songs and playlists collections
//!
//! Handlers only see these traits. `postgres` is the production backend;
//! `memory` backs the router tests. Relationship lists are mutated through
//! dedicated operations (append, remove, toggle) so a backend can apply them
//! atomically instead of writing back a whole document.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    NewPlaylist, NewSong, Playlist, PlaylistChanges, Song, SongChanges, User, UserSummary,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

/// Membership after a like toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeState {
    Liked,
    Unliked,
}

/// Outcome of a playlist write guarded by the actor's rights
#[derive(Debug, Clone, PartialEq)]
pub enum PlaylistWrite {
    /// The stored playlist after the write; a no-op write returns it unchanged
    Applied(Playlist),
    /// The song was already in the playlist; nothing changed
    Duplicate,
    /// The actor may not make this change; nothing changed
    Denied,
    /// The playlist does not exist
    Missing,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Name fields for `ids`, in the order given; unknown ids are skipped
    async fn find_summaries(&self, ids: &[Uuid]) -> Result<Vec<UserSummary>>;

    /// Flip membership of `song_id` in the user's liked songs.
    /// `None` when the user does not exist.
    async fn toggle_liked_song(&self, user_id: Uuid, song_id: Uuid) -> Result<Option<LikeState>>;

    /// Flip membership of `playlist_id` in the user's liked playlists.
    /// `None` when the user does not exist.
    async fn toggle_liked_playlist(
        &self,
        user_id: Uuid,
        playlist_id: Uuid,
    ) -> Result<Option<LikeState>>;

    async fn find_summary(&self, id: Uuid) -> Result<Option<UserSummary>> {
        Ok(self.find_summaries(&[id]).await?.into_iter().next())
    }
}

#[async_trait]
pub trait SongRepository: Send + Sync {
    /// All songs in creation order
    async fn list(&self) -> Result<Vec<Song>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Song>>;

    /// Songs for `ids`, in the order given; unknown ids are skipped
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Song>>;

    async fn create(&self, song: NewSong) -> Result<Song>;

    /// `None` when the song does not exist
    async fn update(&self, id: Uuid, changes: SongChanges) -> Result<Option<Song>>;

    /// `false` when the song did not exist
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait PlaylistRepository: Send + Sync {
    /// All playlists in creation order
    async fn list(&self) -> Result<Vec<Playlist>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Playlist>>;

    /// Playlists for `ids`, in the order given; unknown ids are skipped
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Playlist>>;

    async fn create(&self, playlist: NewPlaylist) -> Result<Playlist>;

    /// Apply `changes` if `actor` may modify the playlist
    async fn update(
        &self,
        id: Uuid,
        actor: Uuid,
        changes: PlaylistChanges,
    ) -> Result<PlaylistWrite>;

    /// `false` when the playlist did not exist
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Append `song_id` unless it is already present; `actor` must be able to
    /// modify the playlist
    async fn add_song(&self, id: Uuid, actor: Uuid, song_id: Uuid) -> Result<PlaylistWrite>;

    /// Remove `song_id` if present; `actor` must be able to modify the playlist
    async fn remove_song(&self, id: Uuid, actor: Uuid, song_id: Uuid) -> Result<PlaylistWrite>;

    /// Add `user_id` to the collaborator set; `actor` must own the playlist.
    /// Adding an existing collaborator leaves the playlist untouched.
    async fn add_collaborator(
        &self,
        id: Uuid,
        actor: Uuid,
        user_id: Uuid,
    ) -> Result<PlaylistWrite>;

    /// Remove `user_id` from the collaborator set; `actor` must own the playlist
    async fn remove_collaborator(
        &self,
        id: Uuid,
        actor: Uuid,
        user_id: Uuid,
    ) -> Result<PlaylistWrite>;
}

/// Reorder `items` to follow `ids`, dropping ids with no matching item
pub(crate) fn order_by_ids<T>(ids: &[Uuid], items: Vec<T>, key: impl Fn(&T) -> Uuid) -> Vec<T> {
    let mut by_id: HashMap<Uuid, T> = items.into_iter().map(|item| (key(&item), item)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

/// Classify a guarded write that matched no row, given the stored playlist.
/// `otherwise` decides the outcome when the playlist exists and the actor is
/// permitted.
pub(crate) fn unmatched(
    stored: Option<Playlist>,
    permitted: impl Fn(&Playlist) -> bool,
    otherwise: impl FnOnce(Playlist) -> PlaylistWrite,
) -> PlaylistWrite {
    match stored {
        None => PlaylistWrite::Missing,
        Some(playlist) if !permitted(&playlist) => PlaylistWrite::Denied,
        Some(playlist) => otherwise(playlist),
    }
}

/// Flip membership of `id` in `ids`
pub(crate) fn toggle(ids: &mut Vec<Uuid>, id: Uuid) -> LikeState {
    if ids.contains(&id) {
        ids.retain(|existing| *existing != id);
        LikeState::Unliked
    } else {
        ids.push(id);
        LikeState::Liked
    }
}
