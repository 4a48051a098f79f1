//! Song documents and payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{UserSummary, not_blank, required};

/// Song entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: Uuid,
    pub name: String,
    pub thumbnail: String,
    pub track: String,
    /// The user who created the song; immutable
    pub artist: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Song {
    /// Replace the artist reference by the artist's name fields
    pub fn with_artist(self, artist: Option<UserSummary>) -> SongWithArtist {
        SongWithArtist {
            id: self.id,
            name: self.name,
            thumbnail: self.thumbnail,
            track: self.track,
            artist,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Song with its artist populated. A dangling artist serializes as `null`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongWithArtist {
    pub id: Uuid,
    pub name: String,
    pub thumbnail: String,
    pub track: String,
    pub artist: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request for song creation
#[derive(Debug, Deserialize)]
pub struct CreateSongRequest {
    pub name: Option<String>,
    pub thumbnail: Option<String>,
    pub track: Option<String>,
}

impl CreateSongRequest {
    /// Validate the payload into a song owned by `artist`
    pub fn into_new_song(self, artist: Uuid) -> Result<NewSong, String> {
        Ok(NewSong {
            name: required(self.name, "Song name")?,
            thumbnail: required(self.thumbnail, "Thumbnail")?,
            track: required(self.track, "Track")?,
            artist,
        })
    }
}

/// Request for song update. Only these fields may be changed.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateSongRequest {
    pub name: Option<String>,
    pub thumbnail: Option<String>,
    pub track: Option<String>,
}

impl UpdateSongRequest {
    pub fn into_changes(self) -> Result<SongChanges, String> {
        Ok(SongChanges {
            name: not_blank(self.name, "Song name")?,
            thumbnail: not_blank(self.thumbnail, "Thumbnail")?,
            track: not_blank(self.track, "Track")?,
        })
    }
}

/// Validated song ready to be stored
#[derive(Debug, Clone)]
pub struct NewSong {
    pub name: String,
    pub thumbnail: String,
    pub track: String,
    pub artist: Uuid,
}

/// Field-level song update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct SongChanges {
    pub name: Option<String>,
    pub thumbnail: Option<String>,
    pub track: Option<String>,
}
