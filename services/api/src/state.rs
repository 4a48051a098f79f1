//! Application state shared across handlers

use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    middleware::JwtVerifier,
    repositories::{
        MemoryRepository, PgRepository, PlaylistRepository, SongRepository, UserRepository,
    },
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub songs: Arc<dyn SongRepository>,
    pub playlists: Arc<dyn PlaylistRepository>,
    pub jwt: JwtVerifier,
}

impl AppState {
    /// State backed by one repository serving all three collections
    pub fn new<R>(repository: R, jwt: JwtVerifier) -> Self
    where
        R: UserRepository + SongRepository + PlaylistRepository + Clone + 'static,
    {
        Self {
            users: Arc::new(repository.clone()),
            songs: Arc::new(repository.clone()),
            playlists: Arc::new(repository),
            jwt,
        }
    }

    /// State backed by PostgreSQL
    pub fn postgres(pool: PgPool, jwt: JwtVerifier) -> Self {
        Self::new(PgRepository::new(pool), jwt)
    }

    /// State backed by process memory
    pub fn in_memory(repository: MemoryRepository, jwt: JwtVerifier) -> Self {
        Self::new(repository, jwt)
    }
}
