//! To-do list operations.

use chrono::Utc;
use tracing::{debug, info};

use super::{boost, owned};
use crate::error::Result;
use crate::models::todo::DEFAULT_PRIORITY;
use crate::models::{new_id, ActivityKind, SubTask, TodoDraft, TodoItem, TodoPatch};
use crate::storage::Storage;

const WHAT: &str = "todo";

fn assign_ids(sub_tasks: &mut [SubTask]) {
    for sub_task in sub_tasks.iter_mut().filter(|s| s.id.trim().is_empty()) {
        sub_task.id = new_id();
    }
}

/// Create an item.
///
/// # Errors
///
/// Returns a validation error for bad input or a storage error.
pub fn create(storage: &Storage, user_id: &str, draft: TodoDraft) -> Result<TodoItem> {
    draft.validate()?;
    let now = Utc::now();
    let mut sub_tasks = draft.sub_tasks;
    assign_ids(&mut sub_tasks);

    let item = TodoItem {
        id: new_id(),
        user_id: user_id.to_string(),
        text: draft.text,
        completed: draft.completed,
        created_at: now,
        updated_at: now,
        tags: draft.tags,
        due_date: draft.due_date,
        has_reminder: draft.has_reminder,
        reminder_time: draft.reminder_time,
        priority: draft.priority.unwrap_or(DEFAULT_PRIORITY),
        sub_tasks,
        color: draft.color,
        notes: draft.notes,
    };
    storage.save(&item)?;
    info!(user_id, todo_id = %item.id, "todo created");
    Ok(item)
}

/// The user's items, newest first.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn list(storage: &Storage, user_id: &str) -> Result<Vec<TodoItem>> {
    let mut items = storage.list_owned::<TodoItem>(user_id)?;
    super::newest_first(&mut items, |t| t.created_at);
    Ok(items)
}

/// One of the user's items.
///
/// # Errors
///
/// Returns not found or forbidden errors, or a storage error.
pub fn get(storage: &Storage, user_id: &str, id: &str) -> Result<TodoItem> {
    owned(storage, user_id, id, WHAT)
}

/// Apply a partial update.
///
/// Completing an open item counts as to-do activity.
///
/// # Errors
///
/// Returns validation, not found or forbidden errors, or a storage error.
pub fn update(storage: &Storage, user_id: &str, id: &str, patch: TodoPatch) -> Result<TodoItem> {
    patch.validate()?;
    let mut item: TodoItem = owned(storage, user_id, id, WHAT)?;
    let was_completed = item.completed;

    if let Some(text) = patch.text {
        item.text = text;
    }
    if let Some(completed) = patch.completed {
        item.completed = completed;
    }
    if let Some(tags) = patch.tags {
        item.tags = tags;
    }
    if patch.due_date.is_some() {
        item.due_date = patch.due_date;
    }
    if let Some(has_reminder) = patch.has_reminder {
        item.has_reminder = has_reminder;
    }
    if patch.reminder_time.is_some() {
        item.reminder_time = patch.reminder_time;
    }
    if let Some(priority) = patch.priority {
        item.priority = priority;
    }
    if let Some(mut sub_tasks) = patch.sub_tasks {
        assign_ids(&mut sub_tasks);
        item.sub_tasks = sub_tasks;
    }
    if patch.color.is_some() {
        item.color = patch.color;
    }
    if patch.notes.is_some() {
        item.notes = patch.notes;
    }

    let now = Utc::now();
    item.updated_at = now;
    storage.save(&item)?;
    debug!(user_id, todo_id = %id, "todo updated");

    if item.completed && !was_completed {
        info!(user_id, todo_id = %id, "todo completed");
        boost::record_activity(storage, user_id, ActivityKind::Todo, now)?;
    }
    Ok(item)
}

/// Delete one of the user's items.
///
/// # Errors
///
/// Returns not found or forbidden errors, or a storage error.
pub fn delete(storage: &Storage, user_id: &str, id: &str) -> Result<()> {
    owned::<TodoItem>(storage, user_id, id, WHAT)?;
    storage.delete::<TodoItem>(id)?;
    info!(user_id, todo_id = %id, "todo deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::UserActivity;

    fn draft(text: &str) -> TodoDraft {
        TodoDraft {
            text: text.to_string(),
            ..TodoDraft::default()
        }
    }

    #[test]
    fn test_create_defaults() {
        let storage = Storage::open_in_memory().unwrap();
        let mut todo = draft("Plan the week");
        todo.sub_tasks = vec![SubTask {
            id: String::new(),
            text: "Check calendar".to_string(),
            completed: false,
        }];

        let item = create(&storage, "u1", todo).unwrap();
        assert_eq!(item.priority, DEFAULT_PRIORITY);
        assert!(!item.completed);
        assert!(!item.sub_tasks[0].id.is_empty());
        assert_eq!(get(&storage, "u1", &item.id).unwrap(), item);
    }

    #[test]
    fn test_list_is_scoped_and_newest_first() {
        let storage = Storage::open_in_memory().unwrap();
        let first = create(&storage, "u1", draft("first")).unwrap();
        let second = create(&storage, "u1", draft("second")).unwrap();
        create(&storage, "u2", draft("other")).unwrap();

        let items = list(&storage, "u1").unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[0].created_at >= items[1].created_at);
        assert!(items.iter().any(|t| t.id == first.id));
        assert!(items.iter().any(|t| t.id == second.id));
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let storage = Storage::open_in_memory().unwrap();
        let mut todo = draft("Write report");
        todo.tags = vec!["work".to_string()];
        todo.priority = Some(3);
        let item = create(&storage, "u1", todo).unwrap();

        let patch = TodoPatch {
            notes: Some("Due Friday".to_string()),
            ..TodoPatch::default()
        };
        let updated = update(&storage, "u1", &item.id, patch).unwrap();
        assert_eq!(updated.text, "Write report");
        assert_eq!(updated.tags, vec!["work".to_string()]);
        assert_eq!(updated.priority, 3);
        assert_eq!(updated.notes.as_deref(), Some("Due Friday"));
        assert_eq!(updated.created_at, item.created_at);
    }

    #[test]
    fn test_completion_records_activity_once() {
        let storage = Storage::open_in_memory().unwrap();
        let item = create(&storage, "u1", draft("Exercise")).unwrap();
        assert!(storage.get::<UserActivity>("u1").unwrap().is_none());

        let done = TodoPatch {
            completed: Some(true),
            ..TodoPatch::default()
        };
        update(&storage, "u1", &item.id, done).unwrap();
        let log = storage.get::<UserActivity>("u1").unwrap().unwrap();
        let first = log.last_todo_completion_date.unwrap();

        let again = TodoPatch {
            completed: Some(true),
            ..TodoPatch::default()
        };
        update(&storage, "u1", &item.id, again).unwrap();
        let log = storage.get::<UserActivity>("u1").unwrap().unwrap();
        assert_eq!(log.last_todo_completion_date, Some(first));
    }

    #[test]
    fn test_other_users_item() {
        let storage = Storage::open_in_memory().unwrap();
        let item = create(&storage, "u1", draft("Private")).unwrap();
        assert!(matches!(
            get(&storage, "u2", &item.id),
            Err(Error::Forbidden(_))
        ));
        assert!(matches!(
            delete(&storage, "u2", &item.id),
            Err(Error::Forbidden(_))
        ));
        delete(&storage, "u1", &item.id).unwrap();
        assert!(get(&storage, "u1", &item.id).unwrap_err().is_not_found());
    }
}
