//! API models for stored documents and request/response payloads

use serde::{Deserialize, Deserializer};

pub mod playlist;
pub mod song;
pub mod user;

pub use playlist::{
    AddCollaboratorRequest, AddSongRequest, CreatePlaylistRequest, NewPlaylist, Playlist,
    PlaylistChanges, PlaylistView, UpdatePlaylistRequest,
};
pub use song::{CreateSongRequest, NewSong, Song, SongChanges, SongWithArtist, UpdateSongRequest};
pub use user::{User, UserSummary};

/// Trimmed value of a required text field
fn required(value: Option<String>, field: &str) -> Result<String, String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(format!("{} is required", field)),
    }
}

/// Trimmed value of an optional text field that may not be blank when present
fn not_blank(value: Option<String>, field: &str) -> Result<Option<String>, String> {
    value.map(|v| required(Some(v), field)).transpose()
}

/// Deserialize a field so that `null` and "missing" stay distinguishable:
/// missing is `None` (via `#[serde(default)]`), `null` is `Some(None)`.
fn explicit<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims_and_rejects_blank() {
        assert_eq!(required(Some("  Road Trip ".into()), "Name"), Ok("Road Trip".into()));
        assert_eq!(required(Some("   ".into()), "Name"), Err("Name is required".into()));
        assert_eq!(required(None, "Name"), Err("Name is required".into()));
    }

    #[test]
    fn test_not_blank_passes_through_missing() {
        assert_eq!(not_blank(None, "Track"), Ok(None));
        assert_eq!(not_blank(Some("a.mp3".into()), "Track"), Ok(Some("a.mp3".into())));
        assert!(not_blank(Some(String::new()), "Track").is_err());
    }
}
