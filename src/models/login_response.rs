use serde::{Deserialize, Serialize};

use super::user_id::UserId;

/// Successful response from the sign-in and sign-up endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Identity of the authenticated user
    pub user_id: UserId,
    /// Session token for subsequent API calls
    pub access_token: String,
    /// Token expiration time in RFC3339 format
    #[serde(default)]
    pub expires_at: Option<String>,
}
