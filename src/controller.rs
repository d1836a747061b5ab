//! Task list controller: keeps a rendered task list consistent with the
//! authoritative per-user collection and translates user intents into
//! store operations.
//!
//! The rendered list is always a direct, ordered projection of the latest
//! subscription snapshot — never independently reordered or mutated
//! outside of a round-trip through the store. Mutations are requests; the
//! subscription reflects their eventual effect. Every store failure is
//! routed to a non-fatal notification hook in addition to the returned
//! `Result`, so nothing escapes as an unhandled rejection.

use std::fmt;
use std::sync::Arc;

use crate::dialogs::DialogProvider;
use crate::error::{Result, TaskLinkError};
use crate::models::{NewTask, Task, TaskId, TaskPatch, UserId};
use crate::store::TaskStore;
use crate::subscription::TaskSubscription;

/// Callback invoked when a store operation fails.
pub type OnMutationErrorCallback = Arc<dyn Fn(&TaskLinkError) + Send + Sync>;

/// Callback invoked when the snapshot stream reports an error.
pub type OnSubscriptionErrorCallback = Arc<dyn Fn(&TaskLinkError) + Send + Sync>;

/// Non-fatal notification hooks for the controller.
///
/// Store failures are worth showing (a toast, a banner) but must never
/// take the application down; register the hooks that feed that surface.
#[derive(Clone, Default)]
pub struct ControllerEvents {
    on_mutation_error: Option<OnMutationErrorCallback>,
    on_subscription_error: Option<OnSubscriptionErrorCallback>,
}

impl fmt::Debug for ControllerEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerEvents")
            .field("on_mutation_error", &self.on_mutation_error.is_some())
            .field("on_subscription_error", &self.on_subscription_error.is_some())
            .finish()
    }
}

impl ControllerEvents {
    /// Create an empty hook set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for failed store mutations.
    pub fn on_mutation_error(mut self, f: impl Fn(&TaskLinkError) + Send + Sync + 'static) -> Self {
        self.on_mutation_error = Some(Arc::new(f));
        self
    }

    /// Register a callback for snapshot stream errors.
    pub fn on_subscription_error(
        mut self,
        f: impl Fn(&TaskLinkError) + Send + Sync + 'static,
    ) -> Self {
        self.on_subscription_error = Some(Arc::new(f));
        self
    }

    fn emit_mutation_error(&self, error: &TaskLinkError) {
        if let Some(cb) = &self.on_mutation_error {
            cb(error);
        }
    }

    fn emit_subscription_error(&self, error: &TaskLinkError) {
        if let Some(cb) = &self.on_subscription_error {
            cb(error);
        }
    }
}

/// Owns the live subscription for one user's task list and issues
/// mutations back to the store.
///
/// Constructed with an explicit [`UserId`] rather than reading ambient
/// session state, so it is constructible and testable without a live
/// identity collaborator.
pub struct TaskListController<S, D> {
    user_id: UserId,
    store: S,
    dialogs: D,
    events: ControllerEvents,
    tasks: Vec<Task>,
    subscription: Option<TaskSubscription>,
}

impl<S: TaskStore, D: DialogProvider> TaskListController<S, D> {
    /// Create an inactive controller for `user_id`'s list.
    pub fn new(user_id: UserId, store: S, dialogs: D) -> Self {
        Self::with_events(user_id, store, dialogs, ControllerEvents::new())
    }

    /// Create an inactive controller with notification hooks.
    pub fn with_events(user_id: UserId, store: S, dialogs: D, events: ControllerEvents) -> Self {
        Self {
            user_id,
            store,
            dialogs,
            events,
            tasks: Vec::new(),
            subscription: None,
        }
    }

    /// The user whose list this controller owns.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Establish the live subscription.
    ///
    /// Exactly one subscription exists per active controller; activating
    /// twice is an error.
    pub async fn activate(&mut self) -> Result<()> {
        if self.subscription.is_some() {
            return Err(TaskLinkError::Configuration(
                "Controller is already active".to_string(),
            ));
        }
        let subscription = self.store.subscribe(&self.user_id).await?;
        log::debug!(
            "[CONTROLLER] Activated for user {} (sub={})",
            self.user_id,
            subscription.subscription_id()
        );
        self.subscription = Some(subscription);
        Ok(())
    }

    /// True while the subscription is held.
    pub fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    /// Await the next subscription event and apply it.
    ///
    /// Snapshots are applied in delivery order; the latest applied
    /// snapshot wins. Returns `None` once the subscription is closed or
    /// the stream ends.
    pub async fn next_change(&mut self) -> Option<Result<()>> {
        let subscription = self.subscription.as_mut()?;
        match subscription.next().await {
            Some(Ok(snapshot)) => {
                self.apply_snapshot(snapshot);
                Some(Ok(()))
            }
            Some(Err(e)) => Some(Err(e)),
            None => None,
        }
    }

    /// Drive the apply loop until the subscription closes.
    ///
    /// Stream errors are routed to the notification hooks and do not end
    /// the loop; the worst case is a stale list until the next snapshot.
    pub async fn run_until_closed(&mut self) {
        while let Some(event) = self.next_change().await {
            if let Err(e) = event {
                log::warn!("[CONTROLLER] Subscription error: {}", e);
                self.events.emit_subscription_error(&e);
            }
        }
    }

    /// Replace the rendered list with a snapshot's contents.
    ///
    /// The snapshot arrives ordered by creation time descending and is
    /// rendered as-is.
    pub fn apply_snapshot(&mut self, snapshot: Vec<Task>) {
        self.tasks = snapshot;
    }

    /// The rendered task list: a direct projection of the latest snapshot.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Count of tasks not yet completed, recomputed from the current
    /// snapshot.
    pub fn remaining_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.done).count()
    }

    /// Whether any rendered task is completed; gates the clear-completed
    /// action in a UI.
    pub fn has_completed(&self) -> bool {
        self.tasks.iter().any(|t| t.done)
    }

    /// Add a task. Trimmed-empty text is a silent no-op; otherwise exactly
    /// one insert with `done = false` is issued.
    pub async fn add(&self, text: &str) -> Result<()> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(());
        }
        self.notify(
            self.store
                .insert(&self.user_id, NewTask::new(trimmed))
                .await,
        )?;
        Ok(())
    }

    /// Flip the completion flag of one task, as currently rendered.
    ///
    /// An id that is not in the rendered list is a no-op. There is no
    /// local optimistic flip; the change becomes visible through the
    /// subscription.
    pub async fn toggle(&self, id: &TaskId) -> Result<()> {
        let Some(task) = self.tasks.iter().find(|t| &t.id == id) else {
            return Ok(());
        };
        let patch = TaskPatch::done(!task.done);
        self.notify(self.store.update(&self.user_id, id, patch).await)
    }

    /// Edit a task's text through the prompt dialog.
    ///
    /// Cancelling the prompt, or confirming text that trims to empty,
    /// discards the edit — no write, no deletion. Otherwise exactly one
    /// update with the trimmed text is issued.
    pub async fn edit(&self, id: &TaskId) -> Result<()> {
        let Some(current) = self
            .tasks
            .iter()
            .find(|t| &t.id == id)
            .map(|t| t.text.clone())
        else {
            return Ok(());
        };

        let Some(entered) = self
            .dialogs
            .prompt_text("Edit Task", "Update your task text:", &current)
            .await
        else {
            return Ok(());
        };

        let trimmed = entered.trim();
        if trimmed.is_empty() {
            return Ok(());
        }
        self.notify(
            self.store
                .update(&self.user_id, id, TaskPatch::text(trimmed))
                .await,
        )
    }

    /// Delete one task.
    pub async fn delete(&self, id: &TaskId) -> Result<()> {
        self.notify(self.store.delete(&self.user_id, id).await)
    }

    /// Remove all completed tasks as a single atomic batch.
    ///
    /// Queries the store first: with no completed tasks this is a no-op
    /// and no confirmation dialog is shown. Once confirmed, exactly one
    /// batch delete is issued containing exactly the ids that were
    /// completed at query time.
    pub async fn clear_completed(&self) -> Result<()> {
        let completed = self.notify(self.store.fetch_completed(&self.user_id).await)?;
        if completed.is_empty() {
            return Ok(());
        }

        let outcome = self
            .dialogs
            .confirm("Clear completed?", "This cannot be undone.")
            .await;
        if !outcome.is_accepted() {
            return Ok(());
        }

        let ids: Vec<TaskId> = completed.into_iter().map(|t| t.id).collect();
        self.notify(self.store.batch_delete(&self.user_id, &ids).await)
    }

    /// Release the subscription.
    ///
    /// Mandatory on deactivation (sign-out, screen teardown); no further
    /// snapshot is delivered or applied afterwards. Safe to call multiple
    /// times.
    pub fn close(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            log::debug!("[CONTROLLER] Closing subscription for user {}", self.user_id);
            subscription.close();
        }
    }

    /// Route a store failure to the notification hook before returning it.
    fn notify<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            log::warn!("[CONTROLLER] Store operation failed: {}", e);
            self.events.emit_mutation_error(e);
        }
        result
    }
}
