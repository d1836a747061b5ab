use serde::{Deserialize, Serialize};

/// Error payload the server attaches to non-success responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message
    pub message: String,
}

impl ErrorBody {
    /// Extract the server's message from a raw response body, falling back
    /// to the body text when it is not the structured error shape.
    pub fn message_from(body: &str) -> String {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => parsed.message,
            Err(_) if body.trim().is_empty() => "Unknown error".to_string(),
            Err(_) => body.to_string(),
        }
    }
}
