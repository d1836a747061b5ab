use serde::{Deserialize, Serialize};

use super::task_id::TaskId;

/// One row in a user's task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned identifier, unique within the owning user's collection
    pub id: TaskId,
    /// Task text, non-empty after trimming
    pub text: String,
    /// Completion flag
    pub done: bool,
    /// Server-assigned creation timestamp in epoch milliseconds.
    /// `None` only in the window between an accepted insert and the server
    /// materializing the timestamp.
    #[serde(default)]
    pub created_at: Option<i64>,
}

impl Task {
    /// Create a task as materialized by the store.
    pub fn new(id: impl Into<TaskId>, text: impl Into<String>, done: bool, created_at: Option<i64>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            done,
            created_at,
        }
    }
}
