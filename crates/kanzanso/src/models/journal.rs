//! Journal entries.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::storage::Document;
use crate::validate;

/// A free-form journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    /// Unique id.
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Optional heading.
    pub title: Option<String>,
    /// Body text.
    pub content: String,
    /// Mood name, such as `happy` or `calm`.
    pub mood: Option<String>,
    /// Weather at the time.
    pub weather: Option<String>,
    /// Self-rated motivation, 1 to 10.
    pub motivation_level: Option<u8>,
    /// Something the writer was grateful for.
    pub gratitude: Option<String>,
    /// Arbitrary extra fields.
    pub custom_fields: BTreeMap<String, Value>,
    /// When it was created.
    pub created_at: DateTime<Utc>,
    /// When it was last changed.
    pub updated_at: DateTime<Utc>,
}

impl Document for JournalEntry {
    const COLLECTION: &'static str = "journal_entries";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> Option<&str> {
        Some(&self.user_id)
    }
}

/// Payload for creating a [`JournalEntry`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalDraft {
    /// Short heading.
    pub title: Option<String>,
    /// Body text.
    pub content: String,
    /// Mood name, such as `happy` or `calm`.
    pub mood: Option<String>,
    /// Weather at the time.
    pub weather: Option<String>,
    /// Self-rated motivation, 1 to 10.
    pub motivation_level: Option<u8>,
    /// Something the writer was grateful for.
    pub gratitude: Option<String>,
    /// Arbitrary extra fields.
    #[serde(default)]
    pub custom_fields: BTreeMap<String, Value>,
}

impl JournalDraft {
    /// Check field constraints.
    ///
    /// # Errors
    ///
    /// Returns a validation error for the first offending field.
    pub fn validate(&self) -> Result<()> {
        validate::required("content", &self.content, 10_000)?;
        validate_optional(
            self.title.as_deref(),
            self.mood.as_deref(),
            self.weather.as_deref(),
            self.motivation_level,
            self.gratitude.as_deref(),
        )
    }
}

/// Partial update of a [`JournalEntry`]. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalPatch {
    /// New heading.
    pub title: Option<String>,
    /// New body text.
    pub content: Option<String>,
    /// New mood.
    pub mood: Option<String>,
    /// New weather.
    pub weather: Option<String>,
    /// New motivation rating.
    pub motivation_level: Option<u8>,
    /// New gratitude note.
    pub gratitude: Option<String>,
    /// Replacement extra fields.
    pub custom_fields: Option<BTreeMap<String, Value>>,
}

impl JournalPatch {
    /// Check constraints on the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns a validation error for the first offending field.
    pub fn validate(&self) -> Result<()> {
        if let Some(content) = &self.content {
            validate::required("content", content, 10_000)?;
        }
        validate_optional(
            self.title.as_deref(),
            self.mood.as_deref(),
            self.weather.as_deref(),
            self.motivation_level,
            self.gratitude.as_deref(),
        )
    }
}

fn validate_optional(
    title: Option<&str>,
    mood: Option<&str>,
    weather: Option<&str>,
    motivation_level: Option<u8>,
    gratitude: Option<&str>,
) -> Result<()> {
    validate::optional_max_len("title", title, 200)?;
    validate::optional_max_len("mood", mood, 50)?;
    validate::optional_max_len("weather", weather, 50)?;
    if let Some(level) = motivation_level {
        validate::in_range("motivationLevel", level, 1, 10)?;
    }
    validate::optional_max_len("gratitude", gratitude, 1000)
}
