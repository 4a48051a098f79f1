//! Ownership rules deciding who may change playlists and songs

use uuid::Uuid;

use crate::models::{Playlist, Song};

/// Owner or collaborator. Gates update, add-song and remove-song.
pub fn can_modify_playlist(actor: Uuid, playlist: &Playlist) -> bool {
    actor == playlist.owner || playlist.collaborators.contains(&actor)
}

/// Owner only
pub fn can_delete_playlist(actor: Uuid, playlist: &Playlist) -> bool {
    actor == playlist.owner
}

/// Owner only
pub fn can_manage_collaborators(actor: Uuid, playlist: &Playlist) -> bool {
    actor == playlist.owner
}

/// The artist who created the song. Gates update and delete.
pub fn can_modify_song(actor: Uuid, song: &Song) -> bool {
    actor == song.artist
}
