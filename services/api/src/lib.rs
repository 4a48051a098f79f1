//! Playlist API: songs, playlists, collaborators and likes over a document store

pub mod authorization;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;

pub use state::AppState;
