//! Quote catalog with an external random source.

use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::{debug, info, warn};

use super::existing;
use crate::error::{Error, Result};
use crate::external::QuoteSource;
use crate::models::{new_id, Quote, QuoteDraft};
use crate::storage::Storage;

const WHAT: &str = "quote";

/// All stored quotes.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn list(storage: &Storage) -> Result<Vec<Quote>> {
    storage.list::<Quote>()
}

/// Quote by id.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if there is no such quote.
pub fn get(storage: &Storage, id: &str) -> Result<Quote> {
    existing(storage, id, WHAT)
}

/// Quotes in a category.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn by_category(storage: &Storage, category: &str) -> Result<Vec<Quote>> {
    storage.find_by_field::<Quote>(None, "category", &category)
}

/// Store a quote.
///
/// # Errors
///
/// Returns a validation error for bad input or a storage error.
pub fn create(storage: &Storage, draft: QuoteDraft) -> Result<Quote> {
    draft.validate()?;
    let quote = Quote {
        id: new_id(),
        text: draft.text,
        author: draft.author,
        category: draft.category,
    };
    storage.save(&quote)?;
    info!(quote_id = %quote.id, "quote created");
    Ok(quote)
}

/// Replace a stored quote.
///
/// # Errors
///
/// Returns a validation error, [`Error::NotFound`], or a storage error.
pub fn update(storage: &Storage, id: &str, draft: QuoteDraft) -> Result<Quote> {
    draft.validate()?;
    let mut quote = get(storage, id)?;
    quote.text = draft.text;
    quote.author = draft.author;
    quote.category = draft.category;
    storage.save(&quote)?;
    debug!(quote_id = %id, "quote updated");
    Ok(quote)
}

/// Delete a stored quote.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if there is no such quote.
pub fn delete(storage: &Storage, id: &str) -> Result<()> {
    if !storage.delete::<Quote>(id)? {
        return Err(Error::not_found(WHAT, id));
    }
    info!(quote_id = %id, "quote deleted");
    Ok(())
}

/// A random stored quote.
///
/// # Errors
///
/// Returns [`Error::NotFound`] when no quotes are stored.
pub fn random_stored<R: Rng + ?Sized>(storage: &Storage, rng: &mut R) -> Result<Quote> {
    list(storage)?
        .choose(rng)
        .cloned()
        .ok_or_else(|| Error::not_found(WHAT, "random"))
}

/// A random quote, preferring the external source when enabled.
///
/// Any failure of the external source falls back to stored quotes.
///
/// # Errors
///
/// Returns [`Error::NotFound`] when the fallback finds no quotes.
pub async fn random(
    storage: &Storage,
    source: &dyn QuoteSource,
    external_enabled: bool,
) -> Result<Quote> {
    if external_enabled {
        match source.random_quote().await {
            Ok(quote) => return Ok(quote),
            Err(e) => warn!(error = %e, "external quote failed, using stored quotes"),
        }
    }
    random_stored(storage, &mut rand::rng())
}

/// A random quote from the external source only.
///
/// # Errors
///
/// Returns the source's error, which maps to 503.
pub async fn external_random(source: &dyn QuoteSource) -> Result<Quote> {
    source.random_quote().await.inspect_err(|e| {
        warn!(error = %e, "external quote failed");
    })
}
