//! Journal operations.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::{boost, owned};
use crate::error::Result;
use crate::models::{new_id, ActivityKind, JournalDraft, JournalEntry, JournalPatch};
use crate::storage::Storage;

const WHAT: &str = "journal entry";

/// Write a new entry. Counts as journal activity.
///
/// # Errors
///
/// Returns a validation error for bad input or a storage error.
pub fn create(storage: &Storage, user_id: &str, draft: JournalDraft) -> Result<JournalEntry> {
    create_at(storage, user_id, draft, Utc::now())
}

/// [`create`] with an explicit creation time.
///
/// # Errors
///
/// See [`create`].
pub fn create_at(
    storage: &Storage,
    user_id: &str,
    draft: JournalDraft,
    now: DateTime<Utc>,
) -> Result<JournalEntry> {
    draft.validate()?;
    let entry = JournalEntry {
        id: new_id(),
        user_id: user_id.to_string(),
        title: draft.title,
        content: draft.content,
        mood: draft.mood,
        weather: draft.weather,
        motivation_level: draft.motivation_level,
        gratitude: draft.gratitude,
        custom_fields: draft.custom_fields,
        created_at: now,
        updated_at: now,
    };
    storage.save(&entry)?;
    info!(user_id, entry_id = %entry.id, "journal entry created");
    boost::record_activity(storage, user_id, ActivityKind::Journal, now)?;
    Ok(entry)
}

/// The user's entries, newest first.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn list(storage: &Storage, user_id: &str) -> Result<Vec<JournalEntry>> {
    let mut entries = storage.list_owned::<JournalEntry>(user_id)?;
    super::newest_first(&mut entries, |e| e.created_at);
    Ok(entries)
}

/// One of the user's entries.
///
/// # Errors
///
/// Returns not found or forbidden errors, or a storage error.
pub fn get(storage: &Storage, user_id: &str, id: &str) -> Result<JournalEntry> {
    owned(storage, user_id, id, WHAT)
}

/// Entries tagged with `mood`, newest first.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn by_mood(storage: &Storage, user_id: &str, mood: &str) -> Result<Vec<JournalEntry>> {
    let mut entries = storage.find_by_field::<JournalEntry>(Some(user_id), "mood", &mood)?;
    super::newest_first(&mut entries, |e| e.created_at);
    Ok(entries)
}

/// Entries created between `start` and `end` inclusive, newest first.
///
/// # Errors
///
/// Returns [`crate::Error::BadRequest`] if `start` is after `end`.
pub fn in_range(
    storage: &Storage,
    user_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<JournalEntry>> {
    super::check_range(start, end)?;
    Ok(list(storage, user_id)?
        .into_iter()
        .filter(|e| (start..=end).contains(&e.created_at))
        .collect())
}

/// Apply a partial update.
///
/// # Errors
///
/// Returns validation, not found or forbidden errors, or a storage error.
pub fn update(
    storage: &Storage,
    user_id: &str,
    id: &str,
    patch: JournalPatch,
) -> Result<JournalEntry> {
    patch.validate()?;
    let mut entry: JournalEntry = owned(storage, user_id, id, WHAT)?;

    if patch.title.is_some() {
        entry.title = patch.title;
    }
    if let Some(content) = patch.content {
        entry.content = content;
    }
    if patch.mood.is_some() {
        entry.mood = patch.mood;
    }
    if patch.weather.is_some() {
        entry.weather = patch.weather;
    }
    if patch.motivation_level.is_some() {
        entry.motivation_level = patch.motivation_level;
    }
    if patch.gratitude.is_some() {
        entry.gratitude = patch.gratitude;
    }
    if let Some(custom_fields) = patch.custom_fields {
        entry.custom_fields = custom_fields;
    }
    entry.updated_at = Utc::now();

    storage.save(&entry)?;
    debug!(user_id, entry_id = %id, "journal entry updated");
    Ok(entry)
}

/// Delete one of the user's entries.
///
/// # Errors
///
/// Returns not found or forbidden errors, or a storage error.
pub fn delete(storage: &Storage, user_id: &str, id: &str) -> Result<()> {
    owned::<JournalEntry>(storage, user_id, id, WHAT)?;
    storage.delete::<JournalEntry>(id)?;
    info!(user_id, entry_id = %id, "journal entry deleted");
    Ok(())
}
