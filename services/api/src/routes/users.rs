//! Aggregate queries over the caller's likes

use axum::{Extension, Json, extract::State};

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::{Playlist, Song, User},
};

const CONTEXT: &str = "Server error";

async fn load_actor(state: &AppState, user: AuthUser) -> ApiResult<User> {
    state
        .users
        .find_by_id(user.id)
        .await
        .map_err(ApiError::store(CONTEXT))?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

/// The caller's liked songs, most recently liked last
pub async fn liked_songs(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Song>>> {
    let actor = load_actor(&state, user).await?;

    let songs = state
        .songs
        .find_many(&actor.liked_songs)
        .await
        .map_err(ApiError::store(CONTEXT))?;

    Ok(Json(songs))
}

/// The caller's liked playlists, most recently liked last
pub async fn liked_playlists(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Playlist>>> {
    let actor = load_actor(&state, user).await?;

    let playlists = state
        .playlists
        .find_many(&actor.liked_playlists)
        .await
        .map_err(ApiError::store(CONTEXT))?;

    Ok(Json(playlists))
}
