//! Song handlers

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use super::{JsonBody, PathParams, require};
use crate::{
    AppState,
    authorization::can_modify_song,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::{CreateSongRequest, Song, SongWithArtist, UpdateSongRequest, UserSummary},
    repositories::LikeState,
};

const SONG_NOT_FOUND: &str = "Song not found";

async fn load_song(state: &AppState, id: Uuid, context: &'static str) -> ApiResult<Song> {
    state
        .songs
        .find_by_id(id)
        .await
        .map_err(ApiError::store(context))?
        .ok_or_else(|| ApiError::not_found(SONG_NOT_FOUND))
}

/// Get all songs with their artists
pub async fn list_songs(State(state): State<AppState>) -> ApiResult<Json<Vec<SongWithArtist>>> {
    const CONTEXT: &str = "Server error";

    let songs = state.songs.list().await.map_err(ApiError::store(CONTEXT))?;

    let artist_ids: Vec<Uuid> = songs.iter().map(|s| s.artist).collect();
    let artists: HashMap<Uuid, UserSummary> = state
        .users
        .find_summaries(&artist_ids)
        .await
        .map_err(ApiError::store(CONTEXT))?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let songs = songs
        .into_iter()
        .map(|song| {
            let artist = artists.get(&song.artist).cloned();
            song.with_artist(artist)
        })
        .collect();

    Ok(Json(songs))
}

/// Create a song credited to the caller
pub async fn create_song(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(payload), _): JsonBody<CreateSongRequest>,
) -> ApiResult<(StatusCode, Json<Song>)> {
    let new_song = payload.into_new_song(user.id).map_err(ApiError::BadRequest)?;

    let song = state
        .songs
        .create(new_song)
        .await
        .map_err(ApiError::store("Error creating song"))?;
    info!("User {} created song {}", user.id, song.id);

    Ok((StatusCode::CREATED, Json(song)))
}

pub async fn get_song(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathParams<Uuid>,
) -> ApiResult<Json<Song>> {
    Ok(Json(load_song(&state, id, "Server error").await?))
}

/// Update name, thumbnail or track; artist only
pub async fn update_song(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(id), _): PathParams<Uuid>,
    WithRejection(Json(payload), _): JsonBody<UpdateSongRequest>,
) -> ApiResult<Json<Song>> {
    const CONTEXT: &str = "Server error";

    let song = load_song(&state, id, CONTEXT).await?;
    require(can_modify_song(user.id, &song), "Not authorized")?;

    let changes = payload.into_changes().map_err(ApiError::BadRequest)?;

    let updated = state
        .songs
        .update(id, changes)
        .await
        .map_err(ApiError::store(CONTEXT))?
        .ok_or_else(|| ApiError::not_found(SONG_NOT_FOUND))?;

    Ok(Json(updated))
}

/// Delete a song; artist only
pub async fn delete_song(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(id), _): PathParams<Uuid>,
) -> ApiResult<Json<Value>> {
    const CONTEXT: &str = "Server error";

    let song = load_song(&state, id, CONTEXT).await?;
    require(can_modify_song(user.id, &song), "Not authorized")?;

    if !state
        .songs
        .delete(id)
        .await
        .map_err(ApiError::store(CONTEXT))?
    {
        return Err(ApiError::not_found(SONG_NOT_FOUND));
    }
    info!("User {} deleted song {}", user.id, id);

    Ok(Json(json!({ "message": "Song removed" })))
}

/// Like or unlike a song for the caller
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

    if !actor.liked_songs.contains(&id) {
        load_song(&state, id, CONTEXT).await?;
    }

    let message = match state
        .users
        .toggle_liked_song(user.id, id)
        .await
        .map_err(ApiError::store(CONTEXT))?
    {
        Some(LikeState::Liked) => "Song added to liked songs",
        Some(LikeState::Unliked) => "Song removed from liked songs",
        None => return Err(ApiError::not_found("User not found")),
    };

    Ok(Json(json!({ "message": message })))
}
