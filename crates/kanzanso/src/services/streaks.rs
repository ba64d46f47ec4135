//! Habit streaks.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::owned;
use crate::error::{Error, Result};
use crate::models::{new_id, Streak, StreakDraft, User};
use crate::storage::Storage;

const WHAT: &str = "streak";

fn ensure_user(storage: &Storage, user_id: &str) -> Result<()> {
    if storage.exists::<User>(user_id)? {
        Ok(())
    } else {
        Err(Error::not_found("user", user_id))
    }
}

/// Start a streak with zero counts.
///
/// # Errors
///
/// Returns a validation error, [`Error::NotFound`] if the user does not
/// exist, or a storage error.
pub fn create(storage: &Storage, user_id: &str, draft: StreakDraft) -> Result<Streak> {
    draft.validate()?;
    ensure_user(storage, user_id)?;
    let streak = Streak::new(new_id(), user_id.to_string(), draft, Utc::now());
    storage.save(&streak)?;
    info!(user_id, streak_id = %streak.id, kind = %streak.kind, "streak created");
    Ok(streak)
}

/// The user's streaks, newest first.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the user does not exist.
pub fn list(storage: &Storage, user_id: &str) -> Result<Vec<Streak>> {
    ensure_user(storage, user_id)?;
    let mut streaks = storage.list_owned::<Streak>(user_id)?;
    super::newest_first(&mut streaks, |s| s.created_at);
    Ok(streaks)
}

/// The user's streaks of one type.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the user does not exist.
pub fn by_type(storage: &Storage, user_id: &str, kind: &str) -> Result<Vec<Streak>> {
    ensure_user(storage, user_id)?;
    storage.find_by_field::<Streak>(Some(user_id), "type", &kind)
}

/// One of the user's streaks.
///
/// # Errors
///
/// Returns not found or forbidden errors, or a storage error.
pub fn get(storage: &Storage, user_id: &str, id: &str) -> Result<Streak> {
    owned(storage, user_id, id, WHAT)
}

/// Rename a streak or change its description or type. Counts are kept.
///
/// # Errors
///
/// Returns validation, not found or forbidden errors, or a storage error.
pub fn update(storage: &Storage, user_id: &str, id: &str, draft: StreakDraft) -> Result<Streak> {
    draft.validate()?;
    let mut streak = get(storage, user_id, id)?;
    streak.name = draft.name;
    streak.description = draft.description;
    streak.kind = draft.kind;
    streak.updated_at = Utc::now();
    storage.save(&streak)?;
    debug!(user_id, streak_id = %id, "streak updated");
    Ok(streak)
}

/// Delete one of the user's streaks.
///
/// # Errors
///
/// Returns not found or forbidden errors, or a storage error.
pub fn delete(storage: &Storage, user_id: &str, id: &str) -> Result<()> {
    get(storage, user_id, id)?;
    storage.delete::<Streak>(id)?;
    info!(user_id, streak_id = %id, "streak deleted");
    Ok(())
}

/// Mark a streak done for today.
///
/// # Errors
///
/// Returns not found or forbidden errors, or a storage error.
pub fn complete(storage: &Storage, user_id: &str, id: &str) -> Result<Streak> {
    complete_at(storage, user_id, id, Utc::now())
}

/// [`complete`] at a fixed time.
///
/// # Errors
///
/// See [`complete`].
pub fn complete_at(
    storage: &Storage,
    user_id: &str,
    id: &str,
    now: DateTime<Utc>,
) -> Result<Streak> {
    let mut streak = get(storage, user_id, id)?;
    if streak.complete(now) {
        storage.save(&streak)?;
        info!(
            user_id,
            streak_id = %id,
            current = streak.current_count,
            highest = streak.highest_count,
            "streak completed"
        );
    } else {
        debug!(user_id, streak_id = %id, "streak already completed today");
    }
    Ok(streak)
}
