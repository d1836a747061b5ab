#![allow(dead_code)]

//! In-memory fakes of the collaborator boundaries, used by the scenario
//! tests to drive the controllers without live services.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use task_link::dialogs::{DialogOutcome, DialogProvider};
use task_link::identity::{IdentityProvider, SessionCallback, SessionHub, SessionWatch};
use task_link::models::{NewTask, Task, TaskId, TaskPatch, UserId};
use task_link::subscription::{SnapshotSender, TaskSubscription};
use task_link::{Result, TaskLinkError, TaskStore};

#[derive(Default)]
struct StoreInner {
    tasks: Vec<Task>,
    next_id: u64,
    clock: i64,
    subscribers: Vec<SnapshotSender>,
    inserts: Vec<NewTask>,
    updates: Vec<(TaskId, TaskPatch)>,
    deletes: Vec<TaskId>,
    batch_deletes: Vec<Vec<TaskId>>,
    completed_queries: usize,
    fail_next: bool,
}

impl StoreInner {
    /// Current result set, ordered by creation time descending — the same
    /// ordering contract the real store honors.
    fn snapshot(&self) -> Vec<Task> {
        let mut tasks = self.tasks.clone();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tasks
    }

    fn check_failure(&mut self) -> Result<()> {
        if self.fail_next {
            self.fail_next = false;
            return Err(TaskLinkError::Server {
                status_code: 503,
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

/// In-memory task store that re-delivers the full snapshot to every
/// subscriber after each accepted write.
#[derive(Clone, Default)]
pub struct MemoryTaskStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next store operation fail with a server error.
    pub fn fail_next(&self) {
        self.inner.lock().unwrap().fail_next = true;
    }

    /// Seed a task directly, bypassing the operation log.
    pub async fn seed(&self, text: &str, done: bool) -> TaskId {
        let (id, snapshot, subscribers) = {
            let mut inner = self.inner.lock().unwrap();
            inner.next_id += 1;
            inner.clock += 1;
            let id = TaskId::new(format!("t{}", inner.next_id));
            let created_at = Some(inner.clock);
            inner.tasks.push(Task::new(id.clone(), text, done, created_at));
            (id, inner.snapshot(), inner.subscribers.clone())
        };
        broadcast(subscribers, snapshot).await;
        id
    }

    pub fn inserts(&self) -> Vec<NewTask> {
        self.inner.lock().unwrap().inserts.clone()
    }

    pub fn updates(&self) -> Vec<(TaskId, TaskPatch)> {
        self.inner.lock().unwrap().updates.clone()
    }

    pub fn deletes(&self) -> Vec<TaskId> {
        self.inner.lock().unwrap().deletes.clone()
    }

    pub fn batch_deletes(&self) -> Vec<Vec<TaskId>> {
        self.inner.lock().unwrap().batch_deletes.clone()
    }

    pub fn completed_queries(&self) -> usize {
        self.inner.lock().unwrap().completed_queries
    }

    /// Number of subscriptions still consuming snapshots.
    pub fn active_subscriptions(&self) -> usize {
        self.inner
            .lock()
            .unwrap()
            .subscribers
            .iter()
            .filter(|s| !s.is_closed())
            .count()
    }
}

async fn broadcast(subscribers: Vec<SnapshotSender>, snapshot: Vec<Task>) {
    for sender in subscribers {
        let _ = sender.send(snapshot.clone()).await;
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn subscribe(&self, _uid: &UserId) -> Result<TaskSubscription> {
        let (initial, sender, subscription) = {
            let mut inner = self.inner.lock().unwrap();
            let n = inner.subscribers.len();
            let (sender, subscription) = TaskSubscription::channel(format!("mem_{}", n));
            inner.subscribers.push(sender.clone());
            (inner.snapshot(), sender, subscription)
        };
        let _ = sender.send(initial).await;
        Ok(subscription)
    }

    async fn insert(&self, _uid: &UserId, task: NewTask) -> Result<TaskId> {
        let (id, snapshot, subscribers) = {
            let mut inner = self.inner.lock().unwrap();
            inner.check_failure()?;
            inner.inserts.push(task.clone());
            inner.next_id += 1;
            inner.clock += 1;
            let id = TaskId::new(format!("t{}", inner.next_id));
            let created_at = Some(inner.clock);
            inner
                .tasks
                .push(Task::new(id.clone(), task.text, task.done, created_at));
            (id, inner.snapshot(), inner.subscribers.clone())
        };
        broadcast(subscribers, snapshot).await;
        Ok(id)
    }

    async fn update(&self, _uid: &UserId, id: &TaskId, patch: TaskPatch) -> Result<()> {
        let (snapshot, subscribers) = {
            let mut inner = self.inner.lock().unwrap();
            inner.check_failure()?;
            inner.updates.push((id.clone(), patch.clone()));
            if let Some(task) = inner.tasks.iter_mut().find(|t| &t.id == id) {
                if let Some(text) = patch.text {
                    task.text = text;
                }
                if let Some(done) = patch.done {
                    task.done = done;
                }
            }
            (inner.snapshot(), inner.subscribers.clone())
        };
        broadcast(subscribers, snapshot).await;
        Ok(())
    }

    async fn delete(&self, _uid: &UserId, id: &TaskId) -> Result<()> {
        let (snapshot, subscribers) = {
            let mut inner = self.inner.lock().unwrap();
            inner.check_failure()?;
            inner.deletes.push(id.clone());
            inner.tasks.retain(|t| &t.id != id);
            (inner.snapshot(), inner.subscribers.clone())
        };
        broadcast(subscribers, snapshot).await;
        Ok(())
    }

    async fn fetch_completed(&self, _uid: &UserId) -> Result<Vec<Task>> {
        let mut inner = self.inner.lock().unwrap();
        inner.check_failure()?;
        inner.completed_queries += 1;
        Ok(inner.snapshot().into_iter().filter(|t| t.done).collect())
    }

    async fn batch_delete(&self, _uid: &UserId, ids: &[TaskId]) -> Result<()> {
        let (snapshot, subscribers) = {
            let mut inner = self.inner.lock().unwrap();
            inner.check_failure()?;
            inner.batch_deletes.push(ids.to_vec());
            // All-or-nothing: the whole batch applies in one step.
            inner.tasks.retain(|t| !ids.contains(&t.id));
            (inner.snapshot(), inner.subscribers.clone())
        };
        broadcast(subscribers, snapshot).await;
        Ok(())
    }
}

#[derive(Default)]
struct DialogsInner {
    confirms: VecDeque<DialogOutcome>,
    prompts: VecDeque<Option<String>>,
    confirm_calls: usize,
    prompt_calls: usize,
    prompt_initials: Vec<String>,
}

/// Dialog provider that replays scripted answers.
///
/// Unscripted calls cancel, mirroring a user dismissing the dialog.
#[derive(Clone, Default)]
pub struct ScriptedDialogs {
    inner: Arc<Mutex<DialogsInner>>,
}

impl ScriptedDialogs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_confirm(&self, outcome: DialogOutcome) {
        self.inner.lock().unwrap().confirms.push_back(outcome);
    }

    pub fn push_prompt(&self, reply: Option<&str>) {
        self.inner
            .lock()
            .unwrap()
            .prompts
            .push_back(reply.map(|s| s.to_string()));
    }

    pub fn confirm_calls(&self) -> usize {
        self.inner.lock().unwrap().confirm_calls
    }

    pub fn prompt_calls(&self) -> usize {
        self.inner.lock().unwrap().prompt_calls
    }

    pub fn prompt_initials(&self) -> Vec<String> {
        self.inner.lock().unwrap().prompt_initials.clone()
    }
}

#[async_trait]
impl DialogProvider for ScriptedDialogs {
    async fn confirm(&self, _title: &str, _message: &str) -> DialogOutcome {
        let mut inner = self.inner.lock().unwrap();
        inner.confirm_calls += 1;
        inner.confirms.pop_front().unwrap_or(DialogOutcome::Cancelled)
    }

    async fn prompt_text(&self, _title: &str, _message: &str, initial: &str) -> Option<String> {
        let mut inner = self.inner.lock().unwrap();
        inner.prompt_calls += 1;
        inner.prompt_initials.push(initial.to_string());
        inner.prompts.pop_front().flatten()
    }
}

/// Identity provider fake: accounts always resolve, unless a failure
/// message is injected.
#[derive(Clone, Default)]
pub struct MemoryIdentity {
    hub: SessionHub,
    fail_with: Arc<Mutex<Option<String>>>,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(&self, message: &str) {
        *self.fail_with.lock().unwrap() = Some(message.to_string());
    }

    fn resolve(&self, email: &str) -> Result<UserId> {
        if let Some(message) = self.fail_with.lock().unwrap().take() {
            return Err(TaskLinkError::Authentication(message));
        }
        let uid = UserId::new(format!("uid-{}", email));
        self.hub.set(Some(uid.clone()));
        Ok(uid)
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn sign_in(&self, email: &str, _password: &str) -> Result<UserId> {
        self.resolve(email)
    }

    async fn sign_up(&self, email: &str, _password: &str) -> Result<UserId> {
        self.resolve(email)
    }

    async fn sign_out(&self) -> Result<()> {
        self.hub.set(None);
        Ok(())
    }

    fn current_user_id(&self) -> Option<UserId> {
        self.hub.current()
    }

    fn subscribe_session(&self, callback: SessionCallback) -> SessionWatch {
        self.hub.subscribe(callback)
    }
}
