use serde::{Deserialize, Serialize};

/// Partial update to a task document.
///
/// Only the fields present in the patch change; everything else is left
/// untouched by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    /// Replacement text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Replacement completion flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
}

impl TaskPatch {
    /// Patch that replaces the task text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            done: None,
        }
    }

    /// Patch that sets the completion flag.
    pub fn done(done: bool) -> Self {
        Self {
            text: None,
            done: Some(done),
        }
    }
}
