//! To-do items and their checklists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::Document;
use crate::validate;

/// Default priority (medium).
pub const DEFAULT_PRIORITY: u8 = 2;

/// A checklist entry inside a [`TodoItem`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubTask {
    /// Assigned by the service when missing.
    #[serde(default)]
    pub id: String,
    /// What to do.
    pub text: String,
    /// Checked off.
    #[serde(default)]
    pub completed: bool,
}

impl SubTask {
    fn validate(&self) -> Result<()> {
        validate::required("subTasks.text", &self.text, 200)
    }
}

/// A task on a user's to-do list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    /// Unique id.
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// The task.
    pub text: String,
    /// Checked off.
    pub completed: bool,
    /// When it was created.
    pub created_at: DateTime<Utc>,
    /// When it was last changed.
    pub updated_at: DateTime<Utc>,
    /// Free-form labels.
    pub tags: Vec<String>,
    /// Deadline.
    pub due_date: Option<DateTime<Utc>>,
    /// Whether a reminder is set.
    pub has_reminder: bool,
    /// When to remind.
    pub reminder_time: Option<DateTime<Utc>>,
    /// 1 low, 2 medium, 3 high.
    pub priority: u8,
    /// Checklist items.
    pub sub_tasks: Vec<SubTask>,
    /// Hex color such as `#4caf50`.
    pub color: Option<String>,
    /// Longer notes.
    pub notes: Option<String>,
}

impl Document for TodoItem {
    const COLLECTION: &'static str = "todo_items";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> Option<&str> {
        Some(&self.user_id)
    }
}

/// Payload for creating a [`TodoItem`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoDraft {
    /// The task.
    pub text: String,
    /// Done.
    #[serde(default)]
    pub completed: bool,
    /// Free-form labels.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Deadline.
    pub due_date: Option<DateTime<Utc>>,
    /// Whether a reminder is set.
    #[serde(default)]
    pub has_reminder: bool,
    /// When to remind.
    pub reminder_time: Option<DateTime<Utc>>,
    /// Defaults to medium.
    pub priority: Option<u8>,
    /// Checklist items.
    #[serde(default)]
    pub sub_tasks: Vec<SubTask>,
    /// Hex color such as `#4caf50`.
    pub color: Option<String>,
    /// Longer notes.
    pub notes: Option<String>,
}

impl TodoDraft {
    /// Check field constraints.
    ///
    /// # Errors
    ///
    /// Returns a validation error for the first offending field.
    pub fn validate(&self) -> Result<()> {
        validate::required("text", &self.text, 500)?;
        validate_common(
            self.priority,
            Some(&self.sub_tasks),
            self.color.as_deref(),
            self.notes.as_deref(),
        )
    }
}

/// Partial update of a [`TodoItem`]. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoPatch {
    /// New task text.
    pub text: Option<String>,
    /// New completion state.
    pub completed: Option<bool>,
    /// Replacement labels.
    pub tags: Option<Vec<String>>,
    /// New deadline.
    pub due_date: Option<DateTime<Utc>>,
    /// Turn the reminder on or off.
    pub has_reminder: Option<bool>,
    /// New reminder time.
    pub reminder_time: Option<DateTime<Utc>>,
    /// New priority.
    pub priority: Option<u8>,
    /// Replacement checklist.
    pub sub_tasks: Option<Vec<SubTask>>,
    /// New color.
    pub color: Option<String>,
    /// New notes.
    pub notes: Option<String>,
}

impl TodoPatch {
    /// Check constraints on the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns a validation error for the first offending field.
    pub fn validate(&self) -> Result<()> {
        if let Some(text) = &self.text {
            validate::required("text", text, 500)?;
        }
        validate_common(
            self.priority,
            self.sub_tasks.as_ref(),
            self.color.as_deref(),
            self.notes.as_deref(),
        )
    }
}

fn validate_common(
    priority: Option<u8>,
    sub_tasks: Option<&Vec<SubTask>>,
    color: Option<&str>,
    notes: Option<&str>,
) -> Result<()> {
    if let Some(priority) = priority {
        validate::in_range("priority", priority, 1, 3)?;
    }
    for sub_task in sub_tasks.into_iter().flatten() {
        sub_task.validate()?;
    }
    if let Some(color) = color {
        validate::hex_color("color", color)?;
    }
    validate::optional_max_len("notes", notes, 1000)
}
