//! Gratitude log operations.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use tracing::{debug, info};

use super::existing;
use crate::error::{Error, Result};
use crate::models::{new_id, GratitudeDraft, GratitudeEntry, GratitudePatch, GratitudeStats};
use crate::storage::Storage;

const WHAT: &str = "gratitude entry";

/// A user's entries, newest first.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn list(storage: &Storage, user_id: &str) -> Result<Vec<GratitudeEntry>> {
    let mut entries = storage.list_owned::<GratitudeEntry>(user_id)?;
    super::newest_first(&mut entries, |e| e.date);
    Ok(entries)
}

/// Entry by id.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if there is no such entry.
pub fn get(storage: &Storage, id: &str) -> Result<GratitudeEntry> {
    existing(storage, id, WHAT)
}

/// Entries dated between `start` and `end` inclusive, newest first.
///
/// # Errors
///
/// Returns [`Error::BadRequest`] if `start` is after `end`.
pub fn in_range(
    storage: &Storage,
    user_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<GratitudeEntry>> {
    super::check_range(start, end)?;
    Ok(list(storage, user_id)?
        .into_iter()
        .filter(|e| (start..=end).contains(&e.date))
        .collect())
}

/// Entries carrying `tag`, newest first.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn by_tag(storage: &Storage, user_id: &str, tag: &str) -> Result<Vec<GratitudeEntry>> {
    Ok(list(storage, user_id)?
        .into_iter()
        .filter(|e| e.tags.iter().any(|t| t == tag))
        .collect())
}

/// Log something to be grateful for.
///
/// # Errors
///
/// Returns a validation error for bad input or a storage error.
pub fn create(storage: &Storage, draft: GratitudeDraft) -> Result<GratitudeEntry> {
    draft.validate()?;
    let entry = GratitudeEntry {
        id: new_id(),
        user_id: draft.user_id,
        content: draft.content,
        tags: draft.tags,
        date: draft.date.unwrap_or_else(Utc::now),
    };
    storage.save(&entry)?;
    info!(user_id = %entry.user_id, entry_id = %entry.id, "gratitude entry created");
    Ok(entry)
}

/// Change content and tags.
///
/// # Errors
///
/// Returns a validation error, [`Error::NotFound`], or a storage error.
pub fn update(storage: &Storage, id: &str, patch: GratitudePatch) -> Result<GratitudeEntry> {
    patch.validate()?;
    let mut entry = get(storage, id)?;
    if let Some(content) = patch.content {
        entry.content = content;
    }
    if let Some(tags) = patch.tags {
        entry.tags = tags;
    }
    storage.save(&entry)?;
    debug!(entry_id = %id, "gratitude entry updated");
    Ok(entry)
}

/// Delete an entry.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if there is no such entry.
pub fn delete(storage: &Storage, id: &str) -> Result<()> {
    if !storage.delete::<GratitudeEntry>(id)? {
        return Err(Error::not_found(WHAT, id));
    }
    info!(entry_id = %id, "gratitude entry deleted");
    Ok(())
}

/// Totals and the current daily streak.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn stats(storage: &Storage, user_id: &str) -> Result<GratitudeStats> {
    stats_at(storage, user_id, Utc::now())
}

/// [`stats`] relative to `now`.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn stats_at(storage: &Storage, user_id: &str, now: DateTime<Utc>) -> Result<GratitudeStats> {
    let entries = storage.list_owned::<GratitudeEntry>(user_id)?;
    let today = now.date_naive();

    let monthly_entries = entries
        .iter()
        .filter(|e| e.date.year() == today.year() && e.date.month() == today.month())
        .count();

    let days: BTreeSet<NaiveDate> = entries.iter().map(|e| e.date.date_naive()).collect();

    Ok(GratitudeStats {
        total_entries: entries.len(),
        current_streak: day_streak(&days, today),
        monthly_entries,
    })
}

/// Consecutive days in `days` ending today, or yesterday if today is missing.
fn day_streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let yesterday = today.checked_sub_days(Days::new(1));
    let mut cursor = if days.contains(&today) {
        Some(today)
    } else {
        yesterday.filter(|d| days.contains(d))
    };

    let mut streak = 0;
    while let Some(day) = cursor.filter(|d| days.contains(d)) {
        streak += 1;
        cursor = day.checked_sub_days(Days::new(1));
    }
    streak
}
