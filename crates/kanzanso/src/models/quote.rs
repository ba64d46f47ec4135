//! Quotes and a user's favorites.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::Document;
use crate::validate;

/// An inspirational quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Unique id.
    pub id: String,
    /// Text shown to the user.
    pub text: String,
    /// Who said it.
    pub author: String,
    /// Theme, such as `motivation`.
    pub category: Option<String>,
}

impl Document for Quote {
    const COLLECTION: &'static str = "quotes";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Payload for creating or replacing a [`Quote`].
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteDraft {
    /// Text shown to the user.
    pub text: String,
    /// Who said it.
    pub author: String,
    /// Theme, such as `motivation`.
    pub category: Option<String>,
}

impl QuoteDraft {
    /// Check field constraints.
    ///
    /// # Errors
    ///
    /// Returns a validation error for the first offending field.
    pub fn validate(&self) -> Result<()> {
        validate::required("text", &self.text, 1000)?;
        validate::required("author", &self.author, 200)?;
        validate::optional_max_len("category", self.category.as_deref(), 50)
    }
}

/// A quote saved by a user. The quote text is copied so favorites survive
/// quotes that came from the external source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteQuote {
    /// Unique id.
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Id of the quote, local or external.
    pub quote_id: String,
    /// Quote text at the time it was saved.
    pub text: String,
    /// Who said it.
    pub author: String,
    /// Grouping label.
    pub category: Option<String>,
    /// When it was saved.
    pub date_added: DateTime<Utc>,
}

impl Document for FavoriteQuote {
    const COLLECTION: &'static str = "favorite_quotes";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> Option<&str> {
        Some(&self.user_id)
    }
}

/// Payload for saving a favorite.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteDraft {
    /// Owning user.
    pub user_id: String,
    /// Id of the quote, local or external.
    pub quote_id: String,
    /// Text shown to the user.
    pub text: String,
    /// Who said it.
    pub author: String,
    /// Grouping label.
    pub category: Option<String>,
}

impl FavoriteDraft {
    /// Check field constraints.
    ///
    /// # Errors
    ///
    /// Returns a validation error for the first offending field.
    pub fn validate(&self) -> Result<()> {
        validate::required("userId", &self.user_id, 100)?;
        validate::required("quoteId", &self.quote_id, 100)?;
        validate::required("text", &self.text, 1000)?;
        validate::required("author", &self.author, 200)
    }
}
