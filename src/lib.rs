//! # task-link
//!
//! Client library for a synced per-user task list: session management, a
//! live task subscription that re-delivers the full result set on every
//! change, fire-and-forget mutations, and leaderboard retrieval.
//!
//! The design separates collaborator boundaries (traits) from the concrete
//! remote client so that the controllers are constructible and testable
//! without live services:
//!
//! - [`IdentityProvider`] — sign-in/sign-up/sign-out and session-change
//!   signals
//! - [`TaskStore`] — per-user task documents with live full-snapshot
//!   subscriptions and atomic batch deletes
//! - [`DialogProvider`] — the platform's confirm/prompt dialog surface
//! - [`TaskLinkClient`] — HTTP + WebSocket implementation of the identity
//!   and store boundaries
//! - [`SessionGate`], [`TaskListController`], [`LeaderboardViewer`] — the
//!   application logic over those boundaries
//!
//! # Example
//!
//! ```rust,no_run
//! use task_link::{TaskLinkClient, TaskListController, IdentityProvider};
//! # use task_link::dialogs::{DialogOutcome, DialogProvider};
//! # struct NoDialogs;
//! # #[async_trait::async_trait]
//! # impl DialogProvider for NoDialogs {
//! #     async fn confirm(&self, _: &str, _: &str) -> DialogOutcome { DialogOutcome::Cancelled }
//! #     async fn prompt_text(&self, _: &str, _: &str, _: &str) -> Option<String> { None }
//! # }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = TaskLinkClient::builder()
//!     .base_url("https://tasks.example.com")
//!     .build()?;
//!
//! let uid = client.sign_in("alice@example.com", "secret123").await?;
//!
//! let mut controller = TaskListController::new(uid, client.clone(), NoDialogs);
//! controller.activate().await?;
//! controller.add("buy milk").await?;
//!
//! while let Some(event) = controller.next_change().await {
//!     event?;
//!     println!("{} remaining", controller.remaining_count());
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod auth_flow;
pub mod client;
pub mod controller;
pub mod dialogs;
pub mod error;
pub mod event_handlers;
pub mod identity;
pub mod leaderboard;
pub mod models;
pub mod session_gate;
pub mod store;
pub mod subscription;
pub mod timeouts;

pub use auth::AuthProvider;
pub use auth_flow::{AuthFlow, AuthMode};
pub use client::{TaskLinkClient, TaskLinkClientBuilder};
pub use controller::{ControllerEvents, TaskListController};
pub use dialogs::{DialogOutcome, DialogProvider};
pub use error::{Result, TaskLinkError};
pub use event_handlers::{ConnectionError, DisconnectReason, EventHandlers};
pub use identity::{IdentityProvider, SessionCallback, SessionHub, SessionWatch};
pub use leaderboard::{LeaderboardViewer, DEFAULT_LEADERBOARD_URL, LOAD_FAILED_MESSAGE};
pub use models::{
    LeaderboardRow, NewTask, Session, Task, TaskId, TaskPatch, UserId,
};
pub use session_gate::{GateState, Screen, SessionGate};
pub use store::TaskStore;
pub use subscription::{SnapshotSender, TaskSubscription};
pub use timeouts::{TaskLinkTimeouts, TaskLinkTimeoutsBuilder};
