use serde::{Deserialize, Serialize};

/// Credentials submitted to the identity endpoints.
///
/// Used for both sign-in and sign-up; the two intents differ only in the
/// endpoint they are posted to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Account email, trimmed
    pub email: String,
    /// Account password, passed through untouched
    pub password: String,
}
