//! Mood playlists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::Document;
use crate::validate;

/// A track reference inside a [`Playlist`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Track {
    /// Catalog track id.
    pub track_id: String,
    /// Track title.
    pub name: String,
    /// Artist names.
    pub artist: String,
    /// Cover image URL.
    pub album_art: String,
    /// URI that opens the track in the player.
    pub spotify_uri: String,
}

impl Track {
    fn validate(&self) -> Result<()> {
        validate::max_len("tracks.trackId", &self.track_id, 100)?;
        validate::max_len("tracks.name", &self.name, 200)?;
        validate::max_len("tracks.artist", &self.artist, 200)?;
        validate::max_len("tracks.albumArt", &self.album_art, 500)?;
        validate::max_len("tracks.spotifyUri", &self.spotify_uri, 200)
    }
}

/// A named list of tracks for a mood.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    /// Unique id.
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Display name.
    pub name: String,
    /// Mood it is meant for.
    pub mood: Option<String>,
    /// Catalog playlist this was built from.
    pub spotify_playlist_id: Option<String>,
    /// Tracks in order.
    pub tracks: Vec<Track>,
    /// When it was created.
    pub created_at: DateTime<Utc>,
    /// When it was last changed.
    pub updated_at: DateTime<Utc>,
}

impl Document for Playlist {
    const COLLECTION: &'static str = "playlists";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> Option<&str> {
        Some(&self.user_id)
    }
}

/// Payload for creating or replacing a [`Playlist`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistDraft {
    /// Display name.
    pub name: String,
    /// Mood name, such as `happy` or `calm`.
    pub mood: Option<String>,
    /// Catalog playlist this was built from.
    pub spotify_playlist_id: Option<String>,
    /// Tracks in order.
    #[serde(default)]
    pub tracks: Vec<Track>,
}

impl PlaylistDraft {
    /// Check field constraints.
    ///
    /// # Errors
    ///
    /// Returns a validation error for the first offending field.
    pub fn validate(&self) -> Result<()> {
        validate::required("name", &self.name, 100)?;
        validate::optional_max_len("mood", self.mood.as_deref(), 50)?;
        validate::optional_max_len(
            "spotifyPlaylistId",
            self.spotify_playlist_id.as_deref(),
            100,
        )?;
        self.tracks.iter().try_for_each(Track::validate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_validation() {
        let draft = PlaylistDraft {
            name: "Morning calm".to_string(),
            mood: Some("calm".to_string()),
            ..PlaylistDraft::default()
        };
        assert!(draft.validate().is_ok());
        assert!(PlaylistDraft::default().validate().is_err());
    }

    #[test]
    fn test_track_limits() {
        let draft = PlaylistDraft {
            name: "Long names".to_string(),
            tracks: vec![Track {
                name: "n".repeat(201),
                ..Track::default()
            }],
            ..PlaylistDraft::default()
        };
        let err = draft.validate().unwrap_err().to_string();
        assert!(err.contains("tracks.name"));
    }

    #[test]
    fn test_track_fields_default() {
        let track: Track = serde_json::from_str(r#"{"name": "Weightless"}"#).unwrap();
        assert_eq!(track.name, "Weightless");
        assert!(track.spotify_uri.is_empty());
    }
}
