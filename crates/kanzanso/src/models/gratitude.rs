//! Gratitude log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::Document;
use crate::validate;

/// Something a user was grateful for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GratitudeEntry {
    /// Unique id.
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Body text.
    pub content: String,
    /// Free-form labels.
    pub tags: Vec<String>,
    /// When it was logged.
    pub date: DateTime<Utc>,
}

impl Document for GratitudeEntry {
    const COLLECTION: &'static str = "gratitude_entries";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> Option<&str> {
        Some(&self.user_id)
    }
}

/// Payload for logging gratitude.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GratitudeDraft {
    /// Owning user.
    pub user_id: String,
    /// What the user is grateful for.
    pub content: String,
    /// Free-form labels.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Defaults to now.
    pub date: Option<DateTime<Utc>>,
}

impl GratitudeDraft {
    /// Check field constraints.
    ///
    /// # Errors
    ///
    /// Returns a validation error for the first offending field.
    pub fn validate(&self) -> Result<()> {
        validate::required("userId", &self.user_id, 100)?;
        validate::required("content", &self.content, 2000)
    }
}

/// Update of content and tags.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GratitudePatch {
    /// New text.
    pub content: Option<String>,
    /// New labels.
    pub tags: Option<Vec<String>>,
}

impl GratitudePatch {
    /// Check constraints on the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns a validation error for the first offending field.
    pub fn validate(&self) -> Result<()> {
        match &self.content {
            Some(content) => validate::required("content", content, 2000),
            None => Ok(()),
        }
    }
}

/// Summary of a user's gratitude habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GratitudeStats {
    /// All entries.
    pub total_entries: usize,
    /// Consecutive days with at least one entry, ending today or yesterday.
    pub current_streak: u32,
    /// Entries in the current calendar month.
    pub monthly_entries: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_validation() {
        let draft = GratitudeDraft {
            user_id: "u1".to_string(),
            content: "Sunny morning".to_string(),
            tags: vec!["nature".to_string()],
            date: None,
        };
        assert!(draft.validate().is_ok());

        let blank = GratitudeDraft {
            content: "  ".to_string(),
            ..draft
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let stats = GratitudeStats {
            total_entries: 3,
            current_streak: 2,
            monthly_entries: 1,
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert_eq!(
            json,
            r#"{"totalEntries":3,"currentStreak":2,"monthlyEntries":1}"#
        );
    }
}
