//! Error types for the task-link client library.

use thiserror::Error;

/// Result type used throughout task-link.
pub type Result<T> = std::result::Result<T, TaskLinkError>;

/// Errors that can occur in task-link operations.
#[derive(Error, Debug)]
pub enum TaskLinkError {
    /// Authentication failed. The payload is the provider's human-readable
    /// message and is suitable for showing to the user as-is.
    #[error("{0}")]
    Authentication(String),

    /// The server rejected a request with a non-success status.
    #[error("Server error ({status_code}): {message}")]
    Server {
        /// HTTP status code returned by the server
        status_code: u16,
        /// Error message extracted from the response body
        message: String,
    },

    /// Transport-level HTTP failure (connect, DNS, timeout inside reqwest).
    #[error("Network error: {0}")]
    Network(String),

    /// WebSocket connection or protocol failure.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Server-reported fault on an established subscription.
    #[error("Subscription error: {0}")]
    Subscription(String),

    /// Failed to serialize or parse a wire payload.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid client configuration (bad base URL, missing required field).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An operation exceeded its configured timeout.
    #[error("Timeout: {0}")]
    Timeout(String),
}

impl From<reqwest::Error> for TaskLinkError {
    fn from(err: reqwest::Error) -> Self {
        TaskLinkError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for TaskLinkError {
    fn from(err: serde_json::Error) -> Self {
        TaskLinkError::Serialization(err.to_string())
    }
}
