//! Mood playlists, hand-made or built from the music catalog.

use chrono::Utc;
use tracing::{debug, info};

use super::{boost, owned};
use crate::error::Result;
use crate::external::MusicCatalog;
use crate::models::{new_id, ActivityKind, Playlist, PlaylistDraft};
use crate::storage::Storage;

const WHAT: &str = "playlist";

/// Curated catalog playlist for each supported mood, sorted by mood.
pub const MOOD_PLAYLISTS: [(&str, &str); 6] = [
    ("calm", "37i9dQZF1DX1s9knjP51Oa"),
    ("energetic", "37i9dQZF1DX76Wlfdnj7AP"),
    ("focus", "37i9dQZF1DX8NTLI2TtZa6"),
    ("happy", "37i9dQZF1DX3rxVfibe1L0"),
    ("sad", "37i9dQZF1DX7qK8ma5wgG1"),
    ("sleep", "37i9dQZF1DWZd79rJ6a7lp"),
];

const FALLBACK_MOOD: &str = "calm";

/// Supported moods, sorted.
#[must_use]
pub fn moods() -> Vec<&'static str> {
    MOOD_PLAYLISTS.iter().map(|(mood, _)| *mood).collect()
}

/// Catalog playlist id for a mood. Unknown moods get the calm playlist.
#[must_use]
pub fn catalog_id_for(mood: &str) -> &'static str {
    let mood = mood.to_lowercase();
    let lookup = |m: &str| MOOD_PLAYLISTS.iter().find(|(k, _)| *k == m).map(|(_, id)| *id);
    lookup(&mood)
        .or_else(|| lookup(FALLBACK_MOOD))
        .unwrap_or(MOOD_PLAYLISTS[0].1)
}

fn save_new(storage: &Storage, user_id: &str, draft: PlaylistDraft) -> Result<Playlist> {
    draft.validate()?;
    let now = Utc::now();
    let playlist = Playlist {
        id: new_id(),
        user_id: user_id.to_string(),
        name: draft.name,
        mood: draft.mood,
        spotify_playlist_id: draft.spotify_playlist_id,
        tracks: draft.tracks,
        created_at: now,
        updated_at: now,
    };
    storage.save(&playlist)?;
    info!(user_id, playlist_id = %playlist.id, tracks = playlist.tracks.len(), "playlist created");
    boost::record_activity(storage, user_id, ActivityKind::Playlist, now)?;
    Ok(playlist)
}

/// Create a playlist. Counts as playlist activity.
///
/// # Errors
///
/// Returns a validation error for bad input or a storage error.
pub fn create(storage: &Storage, user_id: &str, draft: PlaylistDraft) -> Result<Playlist> {
    save_new(storage, user_id, draft)
}

/// Build a playlist from the catalog's curated list for `mood`.
///
/// # Errors
///
/// Returns the catalog's error, which maps to 503, or a storage error.
pub async fn create_for_mood(
    storage: &Storage,
    catalog: &dyn MusicCatalog,
    user_id: &str,
    mood: &str,
    name: Option<String>,
) -> Result<Playlist> {
    let catalog_id = catalog_id_for(mood);
    debug!(mood, catalog_id, "building playlist from catalog");
    let source = catalog.playlist(catalog_id).await?;

    let draft = PlaylistDraft {
        name: name.unwrap_or_else(|| format!("{mood} Playlist")),
        mood: Some(mood.to_string()),
        spotify_playlist_id: Some(source.id),
        tracks: source.tracks,
    };
    save_new(storage, user_id, draft)
}

/// The user's playlists, newest first.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn list(storage: &Storage, user_id: &str) -> Result<Vec<Playlist>> {
    let mut playlists = storage.list_owned::<Playlist>(user_id)?;
    super::newest_first(&mut playlists, |p| p.created_at);
    Ok(playlists)
}

/// The user's playlists for a mood.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn by_mood(storage: &Storage, user_id: &str, mood: &str) -> Result<Vec<Playlist>> {
    storage.find_by_field::<Playlist>(Some(user_id), "mood", &mood)
}

/// One of the user's playlists.
///
/// # Errors
///
/// Returns not found or forbidden errors, or a storage error.
pub fn get(storage: &Storage, user_id: &str, id: &str) -> Result<Playlist> {
    owned(storage, user_id, id, WHAT)
}

/// Replace name, mood, catalog id and tracks.
///
/// # Errors
///
/// Returns validation, not found or forbidden errors, or a storage error.
pub fn update(
    storage: &Storage,
    user_id: &str,
    id: &str,
    draft: PlaylistDraft,
) -> Result<Playlist> {
    draft.validate()?;
    let mut playlist: Playlist = owned(storage, user_id, id, WHAT)?;
    playlist.name = draft.name;
    playlist.mood = draft.mood;
    playlist.spotify_playlist_id = draft.spotify_playlist_id;
    playlist.tracks = draft.tracks;
    playlist.updated_at = Utc::now();
    storage.save(&playlist)?;
    debug!(user_id, playlist_id = %id, "playlist updated");
    Ok(playlist)
}

/// Delete one of the user's playlists.
///
/// # Errors
///
/// Returns not found or forbidden errors, or a storage error.
pub fn delete(storage: &Storage, user_id: &str, id: &str) -> Result<()> {
    owned::<Playlist>(storage, user_id, id, WHAT)?;
    storage.delete::<Playlist>(id)?;
    info!(user_id, playlist_id = %id, "playlist deleted");
    Ok(())
}
