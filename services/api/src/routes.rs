//! Playlist API routes

use std::path::Path as FsPath;

use axum::{
    Json, Router,
    extract::Path,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use axum_extra::extract::WithRejection;
use serde_json::json;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::auth_middleware,
};

pub mod playlists;
pub mod songs;
pub mod users;

/// JSON body whose rejections become 400s with a `message`
pub(crate) type JsonBody<T> = WithRejection<Json<T>, ApiError>;

/// Path parameters whose rejections become 400s with a `message`
pub(crate) type PathParams<T> = WithRejection<Path<T>, ApiError>;

/// Create the router for the playlist API
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/playlists", post(playlists::create_playlist))
        .route(
            "/playlists/:id",
            put(playlists::update_playlist).delete(playlists::delete_playlist),
        )
        .route("/playlists/:id/songs", post(playlists::add_song))
        .route("/playlists/:id/songs/:song_id", delete(playlists::remove_song))
        .route("/playlists/:id/like", post(playlists::toggle_like))
        .route("/playlists/:id/collaborators", post(playlists::add_collaborator))
        .route(
            "/playlists/:id/collaborators/:user_id",
            delete(playlists::remove_collaborator),
        )
        .route("/songs", get(songs::list_songs).post(songs::create_song))
        .route(
            "/songs/:id",
            put(songs::update_song).delete(songs::delete_song),
        )
        .route("/songs/:id/like", post(songs::toggle_like))
        .route("/users/liked-songs", get(users::liked_songs))
        .route("/users/liked-playlists", get(users::liked_playlists))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let public_routes = Router::new()
        .route("/playlists", get(playlists::list_playlists))
        .route("/playlists/:id", get(playlists::get_playlist))
        .route("/songs/:id", get(songs::get_song));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", public_routes.merge(protected_routes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the built frontend for every path the API does not claim
pub fn with_static_assets(router: Router, static_dir: &FsPath) -> Router {
    let index = static_dir.join("index.html");
    router.fallback_service(ServeDir::new(static_dir).fallback(ServeFile::new(index)))
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "playlist-api"
    }))
}

/// Turn a failed authorization rule into a 403
pub(crate) fn require(allowed: bool, message: &str) -> ApiResult<()> {
    if allowed {
        Ok(())
    } else {
        Err(ApiError::forbidden(message))
    }
}
