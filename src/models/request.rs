use chrono::NaiveDate;
use serde::Deserialize;

use super::Priority;

/// Input for creating a task.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial edit. `None` leaves a field untouched; for the optional fields
/// `Some(None)` clears the value.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<NaiveDate>>,
    pub notes: Option<Option<String>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.notes.is_none()
    }
}

/// One entry of a reorder payload: the caller's desired 1-based rank for `id`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReorderItem {
    pub id: String,
    pub position: i64,
}
