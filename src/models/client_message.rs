use serde::{Deserialize, Serialize};

use super::user_id::UserId;

/// Client-to-server subscription messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Authenticate the WebSocket connection.
    ///
    /// Sent immediately after the connection is established; the server
    /// answers with `auth_success` or `auth_error` before any subscription
    /// is accepted.
    Authenticate {
        /// Session token obtained from sign-in
        token: String,
    },

    /// Register a live query over one user's task collection.
    Subscribe {
        /// Client-generated subscription identifier
        subscription_id: String,
        /// The user whose tasks the subscription covers
        user_id: UserId,
    },

    /// Tear down a live query.
    Unsubscribe {
        /// The subscription to remove
        subscription_id: String,
    },
}
