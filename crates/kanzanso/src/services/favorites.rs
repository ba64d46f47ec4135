//! A user's favorite quotes.

use chrono::Utc;
use tracing::info;

use super::existing;
use crate::error::{Error, Result};
use crate::models::{new_id, FavoriteDraft, FavoriteQuote};
use crate::storage::Storage;

const WHAT: &str = "favorite quote";

/// A user's favorites, newest first.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn list(storage: &Storage, user_id: &str) -> Result<Vec<FavoriteQuote>> {
    let mut favorites = storage.list_owned::<FavoriteQuote>(user_id)?;
    super::newest_first(&mut favorites, |f| f.date_added);
    Ok(favorites)
}

/// Favorite by id.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if there is no such favorite.
pub fn get(storage: &Storage, id: &str) -> Result<FavoriteQuote> {
    existing(storage, id, WHAT)
}

/// The user's favorite for `quote_id`, if any.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn find(storage: &Storage, user_id: &str, quote_id: &str) -> Result<Option<FavoriteQuote>> {
    storage.find_one_by_field::<FavoriteQuote>(Some(user_id), "quoteId", &quote_id)
}

/// Whether the user has saved `quote_id`.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn is_favorite(storage: &Storage, user_id: &str, quote_id: &str) -> Result<bool> {
    Ok(find(storage, user_id, quote_id)?.is_some())
}

/// Save a favorite. Saving the same quote twice returns the first one.
///
/// Returns the favorite and whether it is new.
///
/// # Errors
///
/// Returns a validation error for bad input or a storage error.
pub fn add(storage: &Storage, draft: FavoriteDraft) -> Result<(FavoriteQuote, bool)> {
    draft.validate()?;
    if let Some(existing) = find(storage, &draft.user_id, &draft.quote_id)? {
        return Ok((existing, false));
    }

    let favorite = FavoriteQuote {
        id: new_id(),
        user_id: draft.user_id,
        quote_id: draft.quote_id,
        text: draft.text,
        author: draft.author,
        category: draft.category,
        date_added: Utc::now(),
    };
    storage.save(&favorite)?;
    info!(user_id = %favorite.user_id, quote_id = %favorite.quote_id, "favorite added");
    Ok((favorite, true))
}

/// Remove the user's favorite for `quote_id`.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if it was not a favorite.
pub fn remove(storage: &Storage, user_id: &str, quote_id: &str) -> Result<()> {
    let favorite =
        find(storage, user_id, quote_id)?.ok_or_else(|| Error::not_found(WHAT, quote_id))?;
    storage.delete::<FavoriteQuote>(&favorite.id)?;
    info!(user_id, quote_id, "favorite removed");
    Ok(())
}

/// Remove a favorite by id.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if there is no such favorite.
pub fn delete(storage: &Storage, id: &str) -> Result<()> {
    if !storage.delete::<FavoriteQuote>(id)? {
        return Err(Error::not_found(WHAT, id));
    }
    info!(favorite_id = %id, "favorite removed");
    Ok(())
}
