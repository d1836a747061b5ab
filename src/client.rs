//! Main task-link client with builder pattern.
//!
//! `TaskLinkClient` is the concrete implementation of the identity and
//! task-store boundaries, speaking HTTP for authentication and writes and
//! WebSocket for the live task subscription.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::{
    auth::AuthProvider,
    error::{Result, TaskLinkError},
    event_handlers::EventHandlers,
    identity::{IdentityProvider, SessionCallback, SessionHub, SessionWatch},
    leaderboard::{LeaderboardViewer, DEFAULT_LEADERBOARD_URL},
    models::{
        BatchDeleteRequest, ErrorBody, LoginRequest, LoginResponse, NewTask, Task, TaskCreated,
        TaskId, TaskPatch, UserId,
    },
    store::TaskStore,
    subscription::TaskSubscription,
    timeouts::TaskLinkTimeouts,
};

/// Client for the task service.
///
/// Use [`TaskLinkClient::builder`] to construct instances with custom
/// configuration.
///
/// # Examples
///
/// ```rust,no_run
/// use task_link::{TaskLinkClient, IdentityProvider};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = TaskLinkClient::builder()
///     .base_url("http://localhost:3000")
///     .build()?;
///
/// let uid = client.sign_in("alice@example.com", "secret123").await?;
/// println!("signed in as {}", uid);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TaskLinkClient {
    base_url: String,
    leaderboard_url: String,
    http_client: reqwest::Client,
    auth: Arc<Mutex<AuthProvider>>,
    session: SessionHub,
    timeouts: TaskLinkTimeouts,
    event_handlers: EventHandlers,
}

impl TaskLinkClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> TaskLinkClientBuilder {
        TaskLinkClientBuilder::new()
    }

    /// Get the configured timeouts.
    pub fn timeouts(&self) -> &TaskLinkTimeouts {
        &self.timeouts
    }

    /// Build a leaderboard viewer sharing this client's HTTP connection
    /// pool.
    pub fn leaderboard(&self) -> LeaderboardViewer {
        LeaderboardViewer::new(self.http_client.clone(), self.leaderboard_url.clone())
    }

    fn current_token(&self) -> Result<String> {
        self.auth
            .lock()
            .ok()
            .and_then(|auth| auth.token().map(|t| t.to_string()))
            .ok_or_else(|| {
                TaskLinkError::Authentication("No active session. Sign in first.".to_string())
            })
    }

    fn todos_url(&self, uid: &UserId) -> String {
        format!("{}/v1/api/users/{}/todos", self.base_url, uid)
    }

    /// POST credentials to an auth endpoint and install the session on
    /// success.
    async fn authenticate(&self, endpoint: &str, email: &str, password: &str) -> Result<UserId> {
        let url = format!("{}/v1/api/auth/{}", self.base_url, endpoint);
        log::debug!("[AUTH] {} for '{}' at url={}", endpoint, email, url);

        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };

        let response = self.http_client.post(&url).json(&request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = ErrorBody::message_from(&body);
            log::debug!("[AUTH] {} failed ({}): {}", endpoint, status, message);
            return Err(TaskLinkError::Authentication(message));
        }

        let login: LoginResponse = response.json().await?;
        if let Ok(mut auth) = self.auth.lock() {
            *auth = AuthProvider::session_token(login.access_token.clone());
        }
        self.session.set(Some(login.user_id.clone()));
        log::debug!("[AUTH] {} succeeded for user {}", endpoint, login.user_id);

        Ok(login.user_id)
    }

    /// Send a store request with the session attached; non-2xx becomes a
    /// `Server` error carrying the body's message.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let request = {
            let auth = self
                .auth
                .lock()
                .map_err(|_| TaskLinkError::Authentication("Session state poisoned".to_string()))?
                .clone();
            auth.apply_to_request(request)
        };

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = ErrorBody::message_from(&body);
            log::warn!("[STORE] Request failed: status={} message={}", status, message);
            return Err(TaskLinkError::Server {
                status_code: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl IdentityProvider for TaskLinkClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<UserId> {
        self.authenticate("login", email, password).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<UserId> {
        self.authenticate("signup", email, password).await
    }

    async fn sign_out(&self) -> Result<()> {
        // Best-effort server-side revocation; the local session ends either
        // way.
        if let Ok(token) = self.current_token() {
            let url = format!("{}/v1/api/auth/logout", self.base_url);
            let result = self
                .http_client
                .post(&url)
                .bearer_auth(&token)
                .send()
                .await;
            if let Err(e) = result {
                log::warn!("[AUTH] Logout request failed: {}", e);
            }
        }

        if let Ok(mut auth) = self.auth.lock() {
            *auth = AuthProvider::none();
        }
        self.session.set(None);
        Ok(())
    }

    fn current_user_id(&self) -> Option<UserId> {
        self.session.current()
    }

    fn subscribe_session(&self, callback: SessionCallback) -> SessionWatch {
        self.session.subscribe(callback)
    }
}

#[async_trait]
impl TaskStore for TaskLinkClient {
    async fn subscribe(&self, uid: &UserId) -> Result<TaskSubscription> {
        let token = self.current_token()?;
        TaskSubscription::connect(
            &self.base_url,
            &token,
            uid,
            &self.timeouts,
            &self.event_handlers,
        )
        .await
    }

    async fn insert(&self, uid: &UserId, task: NewTask) -> Result<TaskId> {
        let request = self.http_client.post(self.todos_url(uid)).json(&task);
        let response = self.execute(request).await?;
        let created: TaskCreated = response.json().await?;
        Ok(created.id)
    }

    async fn update(&self, uid: &UserId, id: &TaskId, patch: TaskPatch) -> Result<()> {
        let url = format!("{}/{}", self.todos_url(uid), id);
        let request = self.http_client.patch(url).json(&patch);
        self.execute(request).await?;
        Ok(())
    }

    async fn delete(&self, uid: &UserId, id: &TaskId) -> Result<()> {
        let url = format!("{}/{}", self.todos_url(uid), id);
        let request = self.http_client.delete(url);
        self.execute(request).await?;
        Ok(())
    }

    async fn fetch_completed(&self, uid: &UserId) -> Result<Vec<Task>> {
        let request = self
            .http_client
            .get(self.todos_url(uid))
            .query(&[("done", "true")]);
        let response = self.execute(request).await?;
        Ok(response.json().await?)
    }

    async fn batch_delete(&self, uid: &UserId, ids: &[TaskId]) -> Result<()> {
        let url = format!("{}/batch-delete", self.todos_url(uid));
        let body = BatchDeleteRequest { ids: ids.to_vec() };
        let request = self.http_client.post(url).json(&body);
        self.execute(request).await?;
        Ok(())
    }
}

/// Builder for configuring [`TaskLinkClient`] instances.
pub struct TaskLinkClientBuilder {
    base_url: Option<String>,
    leaderboard_url: String,
    timeouts: TaskLinkTimeouts,
    event_handlers: EventHandlers,
}

impl TaskLinkClientBuilder {
    fn new() -> Self {
        Self {
            base_url: None,
            leaderboard_url: DEFAULT_LEADERBOARD_URL.to_string(),
            timeouts: TaskLinkTimeouts::default(),
            event_handlers: EventHandlers::new(),
        }
    }

    /// Set the base URL for the task service.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Override the leaderboard endpoint URL.
    pub fn leaderboard_url(mut self, url: impl Into<String>) -> Self {
        self.leaderboard_url = url.into();
        self
    }

    /// Set the timeout configuration for all operations.
    pub fn timeouts(mut self, timeouts: TaskLinkTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set lifecycle event handlers for the live subscription.
    pub fn event_handlers(mut self, handlers: EventHandlers) -> Self {
        self.event_handlers = handlers;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<TaskLinkClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| TaskLinkError::Configuration("base_url is required".into()))?
            .trim_end_matches('/')
            .to_string();

        // Keep-alive pooling: the controller issues many small writes, and
        // reusing connections avoids per-request handshakes.
        let http_client = reqwest::Client::builder()
            .timeout(self.timeouts.receive_timeout)
            .connect_timeout(self.timeouts.connection_timeout)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .build()
            .map_err(|e| TaskLinkError::Configuration(e.to_string()))?;

        Ok(TaskLinkClient {
            base_url,
            leaderboard_url: self.leaderboard_url,
            http_client,
            auth: Arc::new(Mutex::new(AuthProvider::none())),
            session: SessionHub::new(),
            timeouts: self.timeouts,
            event_handlers: self.event_handlers,
        })
    }
}
