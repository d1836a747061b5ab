//! Data models for the task-link client library.
//!
//! Defines the task document types, authentication payloads, leaderboard
//! rows, and WebSocket subscription messages.

pub mod batch_delete_request;
pub mod client_message;
pub mod error_body;
pub mod leaderboard_row;
pub mod login_request;
pub mod login_response;
pub mod new_task;
pub mod server_message;
pub mod session;
pub mod task;
pub mod task_created;
pub mod task_id;
pub mod task_patch;
pub mod user_id;


pub use batch_delete_request::BatchDeleteRequest;
pub use client_message::ClientMessage;
pub use error_body::ErrorBody;
pub use leaderboard_row::{LeaderboardResponse, LeaderboardRow};
pub use login_request::LoginRequest;
pub use login_response::LoginResponse;
pub use new_task::NewTask;
pub use server_message::ServerMessage;
pub use session::Session;
pub use task::Task;
pub use task_created::TaskCreated;
pub use task_id::TaskId;
pub use task_patch::TaskPatch;
pub use user_id::UserId;
