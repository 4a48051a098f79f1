//! Playlist handlers

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use axum_extra::extract::WithRejection;
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use super::{JsonBody, PathParams, require};
use crate::{
    AppState,
    authorization::{can_delete_playlist, can_manage_collaborators, can_modify_playlist},
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::{
        AddCollaboratorRequest, AddSongRequest, CreatePlaylistRequest, Playlist, PlaylistView,
        Song, UpdatePlaylistRequest, UserSummary,
    },
    repositories::{LikeState, PlaylistWrite},
};

const PLAYLIST_NOT_FOUND: &str = "Playlist not found";
const SONG_ALREADY_PRESENT: &str = "Song already in playlist";
const MODIFY_DENIED: &str = "Not authorized to modify this playlist";
const MANAGE_DENIED: &str = "Not authorized to manage collaborators";

/// Turn a guarded write into a response; `denied` is the 403 message
fn written(write: PlaylistWrite, denied: &str) -> ApiResult<Json<Playlist>> {
    match write {
        PlaylistWrite::Applied(playlist) => Ok(Json(playlist)),
        PlaylistWrite::Duplicate => Err(ApiError::BadRequest(SONG_ALREADY_PRESENT.to_string())),
        PlaylistWrite::Denied => Err(ApiError::forbidden(denied)),
        PlaylistWrite::Missing => Err(ApiError::not_found(PLAYLIST_NOT_FOUND)),
    }
}

async fn load_playlist(state: &AppState, id: Uuid, context: &'static str) -> ApiResult<Playlist> {
    state
        .playlists
        .find_by_id(id)
        .await
        .map_err(ApiError::store(context))?
        .ok_or_else(|| ApiError::not_found(PLAYLIST_NOT_FOUND))
}

/// Get all playlists with owners and songs populated
pub async fn list_playlists(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PlaylistView<Song, Uuid>>>> {
    const CONTEXT: &str = "Server error";

    let playlists = state
        .playlists
        .list()
        .await
        .map_err(ApiError::store(CONTEXT))?;

    let owner_ids: Vec<Uuid> = playlists.iter().map(|p| p.owner).collect();
    let song_ids: Vec<Uuid> = playlists.iter().flat_map(|p| p.songs.clone()).collect();

    let owners: HashMap<Uuid, UserSummary> = state
        .users
        .find_summaries(&owner_ids)
        .await
        .map_err(ApiError::store(CONTEXT))?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();
    let songs: HashMap<Uuid, Song> = state
        .songs
        .find_many(&song_ids)
        .await
        .map_err(ApiError::store(CONTEXT))?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    let views = playlists
        .into_iter()
        .map(|playlist| {
            let owner = owners.get(&playlist.owner).cloned();
            let populated_songs = playlist
                .songs
                .iter()
                .filter_map(|id| songs.get(id).cloned())
                .collect();
            let collaborators = playlist.collaborators.clone();
            playlist.populate(owner, populated_songs, collaborators)
        })
        .collect();

    Ok(Json(views))
}

/// Create a playlist owned by the caller
pub async fn create_playlist(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(payload), _): JsonBody<CreatePlaylistRequest>,
) -> ApiResult<Json<PlaylistView<Uuid, Uuid>>> {
    const CONTEXT: &str = "Server error while creating playlist";

    let new_playlist = payload
        .into_new_playlist(user.id)
        .map_err(ApiError::BadRequest)?;

    let playlist = state
        .playlists
        .create(new_playlist)
        .await
        .map_err(ApiError::store(CONTEXT))?;
    info!("User {} created playlist {}", user.id, playlist.id);

    let owner = state
        .users
        .find_summary(user.id)
        .await
        .map_err(ApiError::store(CONTEXT))?;

    Ok(Json(playlist.with_owner(owner)))
}

/// Get a playlist with owner, songs and collaborators populated
pub async fn get_playlist(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathParams<Uuid>,
) -> ApiResult<Json<PlaylistView<Song, UserSummary>>> {
    const CONTEXT: &str = "Error fetching playlist";

    let playlist = load_playlist(&state, id, CONTEXT).await?;

    let owner = state
        .users
        .find_summary(playlist.owner)
        .await
        .map_err(ApiError::store(CONTEXT))?;
    let songs = state
        .songs
        .find_many(&playlist.songs)
        .await
        .map_err(ApiError::store(CONTEXT))?;
    let collaborators = state
        .users
        .find_summaries(&playlist.collaborators)
        .await
        .map_err(ApiError::store(CONTEXT))?;

    Ok(Json(playlist.populate(owner, songs, collaborators)))
}

/// Update name, description, thumbnail or visibility
pub async fn update_playlist(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(id), _): PathParams<Uuid>,
    WithRejection(Json(payload), _): JsonBody<UpdatePlaylistRequest>,
) -> ApiResult<Json<Playlist>> {
    const CONTEXT: &str = "Error updating playlist";

    const DENIED: &str = "Not authorized to update this playlist";

    let playlist = load_playlist(&state, id, CONTEXT).await?;
    require(can_modify_playlist(user.id, &playlist), DENIED)?;

    let changes = payload.into_changes().map_err(ApiError::BadRequest)?;

    let write = state
        .playlists
        .update(id, user.id, changes)
        .await
        .map_err(ApiError::store(CONTEXT))?;

    written(write, DENIED)
}

/// Delete a playlist; owner only
pub async fn delete_playlist(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(id), _): PathParams<Uuid>,
) -> ApiResult<Json<Value>> {
    const CONTEXT: &str = "Error deleting playlist";

    let playlist = load_playlist(&state, id, CONTEXT).await?;
    require(
        can_delete_playlist(user.id, &playlist),
        "Not authorized to delete this playlist",
    )?;

    if !state
        .playlists
        .delete(id)
        .await
        .map_err(ApiError::store(CONTEXT))?
    {
        return Err(ApiError::not_found(PLAYLIST_NOT_FOUND));
    }
    info!("User {} deleted playlist {}", user.id, id);

    Ok(Json(json!({ "message": "Playlist deleted successfully" })))
}

/// Append a song; a song already present is a client error
pub async fn add_song(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(id), _): PathParams<Uuid>,
    WithRejection(Json(payload), _): JsonBody<AddSongRequest>,
) -> ApiResult<Json<Playlist>> {
    const CONTEXT: &str = "Error adding song to playlist";

    let playlist = load_playlist(&state, id, CONTEXT).await?;
    require(can_modify_playlist(user.id, &playlist), MODIFY_DENIED)?;

    if playlist.songs.contains(&payload.song_id) {
        return Err(ApiError::BadRequest(SONG_ALREADY_PRESENT.to_string()));
    }

    state
        .songs
        .find_by_id(payload.song_id)
        .await
        .map_err(ApiError::store(CONTEXT))?
        .ok_or_else(|| ApiError::not_found("Song not found"))?;

    let write = state
        .playlists
        .add_song(id, user.id, payload.song_id)
        .await
        .map_err(ApiError::store(CONTEXT))?;

    written(write, MODIFY_DENIED)
}

/// Remove a song; removing an absent song changes nothing
pub async fn remove_song(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path((id, song_id)), _): PathParams<(Uuid, Uuid)>,
) -> ApiResult<Json<Playlist>> {
    const CONTEXT: &str = "Error removing song from playlist";

    let playlist = load_playlist(&state, id, CONTEXT).await?;
    require(can_modify_playlist(user.id, &playlist), MODIFY_DENIED)?;

    let write = state
        .playlists
        .remove_song(id, user.id, song_id)
        .await
        .map_err(ApiError::store(CONTEXT))?;

    written(write, MODIFY_DENIED)
}

/// Like or unlike a playlist for the caller
pub async fn toggle_like(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(id), _): PathParams<Uuid>,
) -> ApiResult<Json<Value>> {
    const CONTEXT: &str = "Server error";

    let actor = state
        .users
        .find_by_id(user.id)
        .await
        .map_err(ApiError::store(CONTEXT))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    // Only liking needs the playlist to exist; a dangling like can always be removed
    if !actor.liked_playlists.contains(&id) {
        load_playlist(&state, id, CONTEXT).await?;
    }

    let message = match state
        .users
        .toggle_liked_playlist(user.id, id)
        .await
        .map_err(ApiError::store(CONTEXT))?
    {
        Some(LikeState::Liked) => "Playlist added to liked playlists",
        Some(LikeState::Unliked) => "Playlist removed from liked playlists",
        None => return Err(ApiError::not_found("User not found")),
    };

    Ok(Json(json!({ "message": message })))
}

/// Grant a user modify rights; owner only
pub async fn add_collaborator(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(id), _): PathParams<Uuid>,
    WithRejection(Json(payload), _): JsonBody<AddCollaboratorRequest>,
) -> ApiResult<Json<Playlist>> {
    const CONTEXT: &str = "Error adding collaborator";

    let playlist = load_playlist(&state, id, CONTEXT).await?;
    require(can_manage_collaborators(user.id, &playlist), MANAGE_DENIED)?;

    if payload.user_id == playlist.owner {
        return Err(ApiError::BadRequest(
            "The owner cannot be a collaborator".to_string(),
        ));
    }

    state
        .users
        .find_summary(payload.user_id)
        .await
        .map_err(ApiError::store(CONTEXT))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let write = state
        .playlists
        .add_collaborator(id, user.id, payload.user_id)
        .await
        .map_err(ApiError::store(CONTEXT))?;

    written(write, MANAGE_DENIED)
}

/// Revoke a collaborator; owner only
pub async fn remove_collaborator(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path((id, collaborator)), _): PathParams<(Uuid, Uuid)>,
) -> ApiResult<Json<Playlist>> {
    const CONTEXT: &str = "Error removing collaborator";

    let playlist = load_playlist(&state, id, CONTEXT).await?;
    require(can_manage_collaborators(user.id, &playlist), MANAGE_DENIED)?;

    let write = state
        .playlists
        .remove_collaborator(id, user.id, collaborator)
        .await
        .map_err(ApiError::store(CONTEXT))?;

    written(write, MANAGE_DENIED)
}
