//! In-memory repository used by the router tests
//!
//! All three collections sit behind one async mutex, so every operation is
//! atomic with respect to every other.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    LikeState, PlaylistRepository, PlaylistWrite, SongRepository, UserRepository, order_by_ids,
    toggle,
};
use crate::{
    authorization::{can_manage_collaborators, can_modify_playlist},
    models::{
        NewPlaylist, NewSong, Playlist, PlaylistChanges, Song, SongChanges, User, UserSummary,
    },
};

#[derive(Debug, Default)]
struct Collections {
    users: Vec<User>,
    songs: Vec<Song>,
    playlists: Vec<Playlist>,
}

impl Collections {
    fn user_mut(&mut self, id: Uuid) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    fn playlist_mut(&mut self, id: Uuid) -> Option<&mut Playlist> {
        self.playlists.iter_mut().find(|p| p.id == id)
    }
}

/// Repository keeping every collection in process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    inner: Arc<Mutex<Collections>>,
}

impl MemoryRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user record. Registration belongs to the identity service, so
    /// this is the only way users enter the in-memory store.
    pub async fn insert_user(&self, user: User) {
        self.inner.lock().await.users.push(user);
    }

    /// Run `write` on playlist `id` if `permitted` holds for it, all under
    /// the lock
    async fn write_playlist(
        &self,
        id: Uuid,
        permitted: impl Fn(&Playlist) -> bool,
        write: impl FnOnce(&mut Playlist) -> PlaylistWrite,
    ) -> PlaylistWrite {
        let mut inner = self.inner.lock().await;
        let Some(playlist) = inner.playlist_mut(id) else {
            return PlaylistWrite::Missing;
        };
        if !permitted(playlist) {
            return PlaylistWrite::Denied;
        }
        write(playlist)
    }
}

#[async_trait]
impl UserRepository for MemoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let inner = self.inner.lock().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_summaries(&self, ids: &[Uuid]) -> Result<Vec<UserSummary>> {
        let inner = self.inner.lock().await;
        let found = inner
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .map(UserSummary::from)
            .collect();
        Ok(order_by_ids(ids, found, |u| u.id))
    }

    async fn toggle_liked_song(&self, user_id: Uuid, song_id: Uuid) -> Result<Option<LikeState>> {
        let mut inner = self.inner.lock().await;
        Ok(inner.user_mut(user_id).map(|user| {
            user.updated_at = Utc::now();
            toggle(&mut user.liked_songs, song_id)
        }))
    }

    async fn toggle_liked_playlist(
        &self,
        user_id: Uuid,
        playlist_id: Uuid,
    ) -> Result<Option<LikeState>> {
        let mut inner = self.inner.lock().await;
        Ok(inner.user_mut(user_id).map(|user| {
            user.updated_at = Utc::now();
            toggle(&mut user.liked_playlists, playlist_id)
        }))
    }
}

#[async_trait]
impl SongRepository for MemoryRepository {
    async fn list(&self) -> Result<Vec<Song>> {
        Ok(self.inner.lock().await.songs.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Song>> {
        let inner = self.inner.lock().await;
        Ok(inner.songs.iter().find(|s| s.id == id).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Song>> {
        let inner = self.inner.lock().await;
        let found = inner
            .songs
            .iter()
            .filter(|s| ids.contains(&s.id))
            .cloned()
            .collect();
        Ok(order_by_ids(ids, found, |s| s.id))
    }

    async fn create(&self, song: NewSong) -> Result<Song> {
        let now = Utc::now();
        let song = Song {
            id: Uuid::new_v4(),
            name: song.name,
            thumbnail: song.thumbnail,
            track: song.track,
            artist: song.artist,
            created_at: now,
            updated_at: now,
        };
        self.inner.lock().await.songs.push(song.clone());
        Ok(song)
    }

    async fn update(&self, id: Uuid, changes: SongChanges) -> Result<Option<Song>> {
        let mut inner = self.inner.lock().await;
        let Some(song) = inner.songs.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };

        if let Some(name) = changes.name {
            song.name = name;
        }
        if let Some(thumbnail) = changes.thumbnail {
            song.thumbnail = thumbnail;
        }
        if let Some(track) = changes.track {
            song.track = track;
        }
        song.updated_at = Utc::now();

        Ok(Some(song.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        let before = inner.songs.len();
        inner.songs.retain(|s| s.id != id);
        Ok(inner.songs.len() < before)
    }
}

#[async_trait]
impl PlaylistRepository for MemoryRepository {
    async fn list(&self) -> Result<Vec<Playlist>> {
        Ok(self.inner.lock().await.playlists.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Playlist>> {
        let inner = self.inner.lock().await;
        Ok(inner.playlists.iter().find(|p| p.id == id).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Playlist>> {
        let inner = self.inner.lock().await;
        let found = inner
            .playlists
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect();
        Ok(order_by_ids(ids, found, |p| p.id))
    }

    async fn create(&self, playlist: NewPlaylist) -> Result<Playlist> {
        let now = Utc::now();
        let playlist = Playlist {
            id: Uuid::new_v4(),
            name: playlist.name,
            description: playlist.description,
            thumbnail: playlist.thumbnail,
            owner: playlist.owner,
            songs: Vec::new(),
            collaborators: Vec::new(),
            is_public: true,
            total_duration: 0.0,
            created_at: now,
            updated_at: now,
        };
        self.inner.lock().await.playlists.push(playlist.clone());
        Ok(playlist)
    }

    async fn update(
        &self,
        id: Uuid,
        actor: Uuid,
        changes: PlaylistChanges,
    ) -> Result<PlaylistWrite> {
        let outcome = self
            .write_playlist(id, |p| can_modify_playlist(actor, p), |playlist| {
                if let Some(name) = changes.name {
                    playlist.name = name;
                }
                if let Some(description) = changes.description {
                    playlist.description = description;
                }
                if let Some(thumbnail) = changes.thumbnail {
                    playlist.thumbnail = thumbnail;
                }
                if let Some(is_public) = changes.is_public {
                    playlist.is_public = is_public;
                }
                playlist.updated_at = Utc::now();
                PlaylistWrite::Applied(playlist.clone())
            })
            .await;

        Ok(outcome)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        let before = inner.playlists.len();
        inner.playlists.retain(|p| p.id != id);
        Ok(inner.playlists.len() < before)
    }

    async fn add_song(&self, id: Uuid, actor: Uuid, song_id: Uuid) -> Result<PlaylistWrite> {
        let outcome = self
            .write_playlist(id, |p| can_modify_playlist(actor, p), |playlist| {
                if playlist.songs.contains(&song_id) {
                    return PlaylistWrite::Duplicate;
                }
                playlist.songs.push(song_id);
                playlist.updated_at = Utc::now();
                PlaylistWrite::Applied(playlist.clone())
            })
            .await;

        Ok(outcome)
    }

    async fn remove_song(&self, id: Uuid, actor: Uuid, song_id: Uuid) -> Result<PlaylistWrite> {
        let outcome = self
            .write_playlist(id, |p| can_modify_playlist(actor, p), |playlist| {
                playlist.songs.retain(|s| *s != song_id);
                playlist.updated_at = Utc::now();
                PlaylistWrite::Applied(playlist.clone())
            })
            .await;

        Ok(outcome)
    }

    async fn add_collaborator(
        &self,
        id: Uuid,
        actor: Uuid,
        user_id: Uuid,
    ) -> Result<PlaylistWrite> {
        let outcome = self
            .write_playlist(id, |p| can_manage_collaborators(actor, p), |playlist| {
                if !playlist.collaborators.contains(&user_id) {
                    playlist.collaborators.push(user_id);
                    playlist.updated_at = Utc::now();
                }
                PlaylistWrite::Applied(playlist.clone())
            })
            .await;

        Ok(outcome)
    }

    async fn remove_collaborator(
        &self,
        id: Uuid,
        actor: Uuid,
        user_id: Uuid,
    ) -> Result<PlaylistWrite> {
        let outcome = self
            .write_playlist(id, |p| can_manage_collaborators(actor, p), |playlist| {
                playlist.collaborators.retain(|c| *c != user_id);
                playlist.updated_at = Utc::now();
                PlaylistWrite::Applied(playlist.clone())
            })
            .await;

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_playlist(owner: Uuid) -> NewPlaylist {
        NewPlaylist {
            name: "Road Trip".to_string(),
            description: String::new(),
            thumbnail: "t.png".to_string(),
            owner,
        }
    }

    #[tokio::test]
    async fn test_add_song_rejects_duplicates() -> Result<()> {
        let repo = MemoryRepository::new();
        let owner = Uuid::new_v4();
        let playlist = PlaylistRepository::create(&repo, new_playlist(owner)).await?;
        let song_id = Uuid::new_v4();

        let PlaylistWrite::Applied(before) = repo.add_song(playlist.id, owner, song_id).await?
        else {
            panic!("first add was not applied");
        };
        assert_eq!(before.songs, vec![song_id]);

        assert_eq!(
            repo.add_song(playlist.id, owner, song_id).await?,
            PlaylistWrite::Duplicate
        );
        let after = PlaylistRepository::find_by_id(&repo, playlist.id)
            .await?
            .unwrap();
        assert_eq!(after, before);

        assert_eq!(
            repo.add_song(Uuid::new_v4(), owner, song_id).await?,
            PlaylistWrite::Missing
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_writes_check_rights_against_the_stored_playlist() -> Result<()> {
        let repo = MemoryRepository::new();
        let owner = Uuid::new_v4();
        let collaborator = Uuid::new_v4();
        let playlist = PlaylistRepository::create(&repo, new_playlist(owner)).await?;

        repo.add_collaborator(playlist.id, owner, collaborator)
            .await?;
        assert!(matches!(
            repo.add_song(playlist.id, collaborator, Uuid::new_v4()).await?,
            PlaylistWrite::Applied(_)
        ));

        // Collaborators cannot manage collaborators
        assert_eq!(
            repo.remove_collaborator(playlist.id, collaborator, collaborator)
                .await?,
            PlaylistWrite::Denied
        );

        repo.remove_collaborator(playlist.id, owner, collaborator)
            .await?;
        let revoked = PlaylistRepository::find_by_id(&repo, playlist.id)
            .await?
            .unwrap();

        assert_eq!(
            repo.add_song(playlist.id, collaborator, Uuid::new_v4()).await?,
            PlaylistWrite::Denied
        );
        assert_eq!(
            repo.remove_song(playlist.id, collaborator, revoked.songs[0])
                .await?,
            PlaylistWrite::Denied
        );
        assert_eq!(
            PlaylistRepository::update(
                &repo,
                playlist.id,
                collaborator,
                PlaylistChanges {
                    name: Some("Taken".to_string()),
                    ..Default::default()
                },
            )
            .await?,
            PlaylistWrite::Denied
        );

        let stored = PlaylistRepository::find_by_id(&repo, playlist.id)
            .await?
            .unwrap();
        assert_eq!(stored, revoked);
        Ok(())
    }

    #[tokio::test]
    async fn test_adding_a_collaborator_twice_changes_nothing() -> Result<()> {
        let repo = MemoryRepository::new();
        let owner = Uuid::new_v4();
        let collaborator = Uuid::new_v4();
        let playlist = PlaylistRepository::create(&repo, new_playlist(owner)).await?;

        let PlaylistWrite::Applied(first) = repo
            .add_collaborator(playlist.id, owner, collaborator)
            .await?
        else {
            panic!("first add was not applied");
        };
        let second = repo
            .add_collaborator(playlist.id, owner, collaborator)
            .await?;

        assert_eq!(second, PlaylistWrite::Applied(first.clone()));
        assert_eq!(first.collaborators, vec![collaborator]);
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_like_toggles_are_not_lost() -> Result<()> {
        let repo = MemoryRepository::new();
        let user = User::new("Ada", "Lovelace", "ada@example.com");
        let user_id = user.id;
        repo.insert_user(user).await;

        let targets: Vec<Uuid> = (0..16).map(|_| Uuid::new_v4()).collect();
        let handles: Vec<_> = targets
            .iter()
            .map(|target| {
                let repo = repo.clone();
                let target = *target;
                tokio::spawn(async move { repo.toggle_liked_song(user_id, target).await })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await??, Some(LikeState::Liked));
        }

        let user = UserRepository::find_by_id(&repo, user_id).await?.unwrap();
        assert_eq!(user.liked_songs.len(), targets.len());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_applies_only_given_fields() -> Result<()> {
        let repo = MemoryRepository::new();
        let owner = Uuid::new_v4();
        let playlist = PlaylistRepository::create(&repo, new_playlist(owner)).await?;

        let PlaylistWrite::Applied(updated) = PlaylistRepository::update(
            &repo,
            playlist.id,
            owner,
            PlaylistChanges {
                is_public: Some(false),
                ..Default::default()
            },
        )
        .await?
        else {
            panic!("owner update was not applied");
        };

        assert!(!updated.is_public);
        assert_eq!(updated.name, playlist.name);
        assert!(updated.updated_at >= playlist.updated_at);
        Ok(())
    }
}
