//! Playlist documents, populated views and payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{UserSummary, explicit, not_blank, required};

/// Playlist entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub thumbnail: String,
    /// Immutable after creation
    pub owner: Uuid,
    /// Ordered, no duplicates
    pub songs: Vec<Uuid>,
    /// Never contains the owner
    pub collaborators: Vec<Uuid>,
    pub is_public: bool,
    /// Maintained outside this service
    pub total_duration: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Playlist {
    /// Populate the owner only; songs and collaborators stay ids
    pub fn with_owner(self, owner: Option<UserSummary>) -> PlaylistView<Uuid, Uuid> {
        let songs = self.songs.clone();
        let collaborators = self.collaborators.clone();
        self.populate(owner, songs, collaborators)
    }

    /// Build a view with every reference replaced by the given documents
    pub fn populate<S, C>(
        self,
        owner: Option<UserSummary>,
        songs: Vec<S>,
        collaborators: Vec<C>,
    ) -> PlaylistView<S, C> {
        PlaylistView {
            id: self.id,
            name: self.name,
            description: self.description,
            thumbnail: self.thumbnail,
            owner,
            songs,
            collaborators,
            is_public: self.is_public,
            total_duration: self.total_duration,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// A playlist whose owner is populated and whose songs and collaborators are
/// either ids or documents, depending on the endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistView<S, C> {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub thumbnail: String,
    pub owner: Option<UserSummary>,
    pub songs: Vec<S>,
    pub collaborators: Vec<C>,
    pub is_public: bool,
    pub total_duration: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request for playlist creation
#[derive(Debug, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: Option<String>,
    pub thumbnail: Option<String>,
    pub description: Option<String>,
}

impl CreatePlaylistRequest {
    /// Validate the payload into a playlist owned by `owner`
    pub fn into_new_playlist(self, owner: Uuid) -> Result<NewPlaylist, String> {
        Ok(NewPlaylist {
            name: required(self.name, "Playlist name")?,
            thumbnail: required(self.thumbnail, "Thumbnail")?,
            description: self.description.unwrap_or_default(),
            owner,
        })
    }
}

/// Request for playlist update
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlaylistRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "explicit")]
    pub is_public: Option<Option<bool>>,
}

impl UpdatePlaylistRequest {
    pub fn into_changes(self) -> Result<PlaylistChanges, String> {
        let is_public = match self.is_public {
            None => None,
            Some(Some(value)) => Some(value),
            Some(None) => return Err("isPublic must be a boolean".to_string()),
        };

        Ok(PlaylistChanges {
            name: not_blank(self.name, "Playlist name")?,
            description: self.description,
            thumbnail: not_blank(self.thumbnail, "Thumbnail")?,
            is_public,
        })
    }
}

/// Request to append a song
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSongRequest {
    pub song_id: Uuid,
}

/// Request to grant a user collaborator rights
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCollaboratorRequest {
    pub user_id: Uuid,
}

/// Validated playlist ready to be stored
#[derive(Debug, Clone)]
pub struct NewPlaylist {
    pub name: String,
    pub description: String,
    pub thumbnail: String,
    pub owner: Uuid,
}

/// Field-level playlist update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct PlaylistChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub is_public: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: serde_json::Value) -> Result<PlaylistChanges, String> {
        serde_json::from_value::<UpdatePlaylistRequest>(body)
            .unwrap()
            .into_changes()
    }

    #[test]
    fn test_update_distinguishes_false_null_and_missing() {
        assert_eq!(parse(json!({ "isPublic": false })).unwrap().is_public, Some(false));
        assert_eq!(parse(json!({})).unwrap().is_public, None);
        assert_eq!(
            parse(json!({ "isPublic": null })).unwrap_err(),
            "isPublic must be a boolean"
        );
    }

    #[test]
    fn test_update_allows_clearing_description_but_not_name() {
        let changes = parse(json!({ "description": "" })).unwrap();
        assert_eq!(changes.description.as_deref(), Some(""));

        assert!(parse(json!({ "name": "  " })).is_err());
    }

    #[test]
    fn test_create_trims_name_and_defaults_description() {
        let owner = Uuid::new_v4();
        let new_playlist = CreatePlaylistRequest {
            name: Some("  Road Trip ".into()),
            thumbnail: Some("t.png".into()),
            description: None,
        }
        .into_new_playlist(owner)
        .unwrap();

        assert_eq!(new_playlist.name, "Road Trip");
        assert_eq!(new_playlist.description, "");
        assert_eq!(new_playlist.owner, owner);
    }

    #[test]
    fn test_create_requires_thumbnail() {
        let err = CreatePlaylistRequest {
            name: Some("Road Trip".into()),
            thumbnail: None,
            description: None,
        }
        .into_new_playlist(Uuid::new_v4())
        .unwrap_err();
        assert_eq!(err, "Thumbnail is required");
    }
}
