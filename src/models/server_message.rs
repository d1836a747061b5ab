use serde::{Deserialize, Serialize};

use super::task::Task;

/// Server-to-client subscription messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// WebSocket authentication accepted
    AuthSuccess {
        /// Authenticated user id
        user_id: String,
    },

    /// WebSocket authentication rejected
    AuthError {
        /// Human-readable reason
        message: String,
    },

    /// Full current result set of a subscribed query.
    ///
    /// Delivered once on registration and again after every accepted write
    /// from any client or session. Rows arrive ordered by creation time
    /// descending; the client renders them as-is.
    Snapshot {
        /// The subscription this snapshot belongs to
        subscription_id: String,
        /// The complete, ordered task list
        tasks: Vec<Task>,
    },

    /// Server-reported fault on a subscription
    Error {
        /// The subscription the error relates to
        subscription_id: String,
        /// Error code
        code: String,
        /// Human-readable message
        message: String,
    },
}
