//! Alert/prompt dialog boundary.
//!
//! The platform's blocking dialog surface is an external collaborator; the
//! controllers only need a confirmation and a text prompt.

use async_trait::async_trait;

/// Outcome of a confirmation dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogOutcome {
    /// The user accepted the destructive action
    Accepted,
    /// The user cancelled
    Cancelled,
}

impl DialogOutcome {
    /// True when the user accepted.
    pub fn is_accepted(self) -> bool {
        matches!(self, DialogOutcome::Accepted)
    }
}

/// Platform dialog surface used for confirmations and text prompts.
#[async_trait]
pub trait DialogProvider: Send + Sync {
    /// Show a blocking confirmation dialog.
    async fn confirm(&self, title: &str, message: &str) -> DialogOutcome;

    /// Show a blocking text prompt seeded with `initial`.
    ///
    /// Returns `None` when the user cancels; otherwise the entered text,
    /// untrimmed.
    async fn prompt_text(&self, title: &str, message: &str, initial: &str) -> Option<String>;
}
