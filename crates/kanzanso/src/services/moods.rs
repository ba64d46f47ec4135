//! Mood tracker operations. At most one new entry per user per day.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::{boost, existing};
use crate::error::Result;
use crate::models::{new_id, ActivityKind, MoodDraft, MoodEntry, MoodPatch};
use crate::storage::Storage;

const WHAT: &str = "mood entry";

/// A user's entries, newest first.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn list(storage: &Storage, user_id: &str) -> Result<Vec<MoodEntry>> {
    let mut entries = storage.list_owned::<MoodEntry>(user_id)?;
    super::newest_first(&mut entries, |e| e.date);
    Ok(entries)
}

/// Entry by id.
///
/// # Errors
///
/// Returns [`crate::Error::NotFound`] if there is no such entry.
pub fn get(storage: &Storage, id: &str) -> Result<MoodEntry> {
    existing(storage, id, WHAT)
}

/// Entries dated between `start` and `end` inclusive, newest first.
///
/// # Errors
///
/// Returns [`crate::Error::BadRequest`] if `start` is after `end`.
pub fn in_range(
    storage: &Storage,
    user_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<MoodEntry>> {
    super::check_range(start, end)?;
    Ok(list(storage, user_id)?
        .into_iter()
        .filter(|e| (start..=end).contains(&e.date))
        .collect())
}

/// Record a mood, replacing the one already recorded today.
///
/// A replaced entry is re-dated to `now`. A new entry keeps the submitted
/// date, if any.
///
/// Returns the entry and whether it is new.
///
/// # Errors
///
/// Returns a validation error for bad input or a storage error.
pub fn record(storage: &Storage, draft: MoodDraft) -> Result<(MoodEntry, bool)> {
    record_at(storage, draft, Utc::now())
}

/// [`record`] with an explicit current time.
///
/// # Errors
///
/// See [`record`].
pub fn record_at(
    storage: &Storage,
    draft: MoodDraft,
    now: DateTime<Utc>,
) -> Result<(MoodEntry, bool)> {
    draft.validate()?;
    let today = now.date_naive();

    let todays = list(storage, &draft.user_id)?
        .into_iter()
        .find(|e| e.date.date_naive() == today);

    let (entry, created) = match todays {
        Some(mut entry) => {
            entry.mood = draft.mood;
            entry.note = draft.note;
            entry.date = now;
            debug!(entry_id = %entry.id, %today, "replacing today's mood");
            (entry, false)
        }
        None => (
            MoodEntry {
                id: new_id(),
                user_id: draft.user_id,
                mood: draft.mood,
                note: draft.note,
                date: draft.date.unwrap_or(now),
            },
            true,
        ),
    };

    storage.save(&entry)?;
    info!(user_id = %entry.user_id, mood = %entry.mood, created, "mood recorded");
    boost::record_activity(storage, &entry.user_id, ActivityKind::Mood, now)?;
    Ok((entry, created))
}

/// Change mood and note.
///
/// # Errors
///
/// Returns a validation error, [`crate::Error::NotFound`], or a storage error.
pub fn update(storage: &Storage, id: &str, patch: MoodPatch) -> Result<MoodEntry> {
    patch.validate()?;
    let mut entry = get(storage, id)?;
    if let Some(mood) = patch.mood {
        entry.mood = mood;
    }
    if patch.note.is_some() {
        entry.note = patch.note;
    }
    storage.save(&entry)?;
    debug!(entry_id = %id, "mood entry updated");
    Ok(entry)
}

/// Delete an entry.
///
/// # Errors
///
/// Returns [`crate::Error::NotFound`] if there is no such entry.
pub fn delete(storage: &Storage, id: &str) -> Result<()> {
    if !storage.delete::<MoodEntry>(id)? {
        return Err(crate::Error::not_found(WHAT, id));
    }
    info!(entry_id = %id, "mood entry deleted");
    Ok(())
}
