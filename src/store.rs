//! Document store boundary for per-user task collections.
//!
//! Every operation is explicitly scoped to the owning user's identity —
//! nothing reads the current session from ambient state, so consumers are
//! constructible and testable without a live identity collaborator.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{NewTask, Task, TaskId, TaskPatch, UserId};
use crate::subscription::TaskSubscription;

/// Per-user task collection with live query subscriptions.
///
/// The store is the sole arbiter of final state: mutations are requests,
/// and their effect becomes visible through the subscription snapshot
/// stream, never through local echo. Consistency across concurrent writers
/// (other devices, other sessions) is the store's own concern.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Establish a live subscription to all of `uid`'s tasks, ordered by
    /// creation time descending.
    ///
    /// The subscription re-delivers the full current result set on every
    /// accepted write from any client or session.
    async fn subscribe(&self, uid: &UserId) -> Result<TaskSubscription>;

    /// Create a task. The store assigns the id and the creation timestamp.
    async fn insert(&self, uid: &UserId, task: NewTask) -> Result<TaskId>;

    /// Apply a partial update to one task.
    async fn update(&self, uid: &UserId, id: &TaskId, patch: TaskPatch) -> Result<()>;

    /// Delete one task.
    async fn delete(&self, uid: &UserId, id: &TaskId) -> Result<()>;

    /// One-shot query for all of `uid`'s completed tasks.
    async fn fetch_completed(&self, uid: &UserId) -> Result<Vec<Task>>;

    /// Delete the listed tasks as a single atomic batch, all-or-nothing.
    ///
    /// Implementations must not fall back to a sequence of single deletes:
    /// partial failure would leave some completed tasks undeleted while
    /// others are removed.
    async fn batch_delete(&self, uid: &UserId, ids: &[TaskId]) -> Result<()>;
}
