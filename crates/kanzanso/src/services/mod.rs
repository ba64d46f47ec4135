//! Resource operations on top of [`Storage`].
//!
//! Services validate input, enforce ownership and keep the Daily Boost
//! activity log up to date. HTTP handlers are thin wrappers around them.

pub mod boost;
pub mod favorites;
pub mod gratitude;
pub mod journal;
pub mod moods;
pub mod playlists;
pub mod quiz;
pub mod quotes;
pub mod streaks;
pub mod todos;
pub mod users;
pub mod weather;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::storage::{Document, Storage};

/// Load a document that must belong to `user_id`.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if it does not exist and [`Error::Forbidden`]
/// if it belongs to someone else.
pub(crate) fn owned<T: Document>(
    storage: &Storage,
    user_id: &str,
    id: &str,
    what: &'static str,
) -> Result<T> {
    let doc: T = storage
        .get(id)?
        .ok_or_else(|| Error::not_found(what, id))?;
    if doc.owner_id() != Some(user_id) {
        return Err(Error::forbidden(format!("{what} belongs to another user")));
    }
    Ok(doc)
}

/// Load a document or fail with [`Error::NotFound`].
pub(crate) fn existing<T: Document>(storage: &Storage, id: &str, what: &'static str) -> Result<T> {
    storage.get(id)?.ok_or_else(|| Error::not_found(what, id))
}

/// Sort newest first by the given timestamp.
pub(crate) fn newest_first<T>(items: &mut [T], at: impl Fn(&T) -> DateTime<Utc>) {
    items.sort_by_key(|item| std::cmp::Reverse(at(item)));
}

/// Fail if `start` is after `end`.
pub(crate) fn check_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
    if start > end {
        return Err(Error::bad_request("start must not be after end"));
    }
    Ok(())
}
