//! Daily mood check-ins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::Document;
use crate::validate;

/// One mood check-in. Recording again on the same day replaces today's entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    /// Unique id.
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Mood name, such as `happy` or `calm`.
    pub mood: String,
    /// Optional remark.
    pub note: Option<String>,
    /// When the mood was felt.
    pub date: DateTime<Utc>,
}

impl Document for MoodEntry {
    const COLLECTION: &'static str = "mood_entries";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> Option<&str> {
        Some(&self.user_id)
    }
}

/// Payload for recording a mood.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodDraft {
    /// Owning user.
    pub user_id: String,
    /// Mood name, such as `happy` or `calm`.
    pub mood: String,
    /// Optional remark.
    pub note: Option<String>,
    /// Defaults to now.
    pub date: Option<DateTime<Utc>>,
}

impl MoodDraft {
    /// Check field constraints.
    ///
    /// # Errors
    ///
    /// Returns a validation error for the first offending field.
    pub fn validate(&self) -> Result<()> {
        validate::required("userId", &self.user_id, 100)?;
        validate::required("mood", &self.mood, 50)?;
        validate::optional_max_len("note", self.note.as_deref(), 1000)
    }
}

/// Update of mood and note.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoodPatch {
    /// New mood.
    pub mood: Option<String>,
    /// New remark.
    pub note: Option<String>,
}

impl MoodPatch {
    /// Check constraints on the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns a validation error for the first offending field.
    pub fn validate(&self) -> Result<()> {
        if let Some(mood) = &self.mood {
            validate::required("mood", mood, 50)?;
        }
        validate::optional_max_len("note", self.note.as_deref(), 1000)
    }
}
