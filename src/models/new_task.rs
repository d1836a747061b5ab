use serde::{Deserialize, Serialize};

/// Payload for creating a task.
///
/// The store assigns the id and the creation timestamp; neither is ever
/// client-chosen, so the insert payload carries only text and the flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    /// Task text, already trimmed and non-empty
    pub text: String,
    /// Completion flag, `false` for every new task
    pub done: bool,
}

impl NewTask {
    /// Build an insert payload for freshly entered text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            done: false,
        }
    }
}
