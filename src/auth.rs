//! Authentication provider for the task-link client.
//!
//! Attaches the session token to HTTP requests as a bearer Authorization
//! header.

/// Authentication state attached to outgoing requests.
///
/// # Examples
///
/// ```rust
/// use task_link::AuthProvider;
///
/// // Session token obtained from sign-in
/// let auth = AuthProvider::session_token("eyJhbGc...".to_string());
///
/// // No authentication (leaderboard endpoint, pre-sign-in)
/// let auth = AuthProvider::none();
/// ```
#[derive(Debug, Clone)]
pub enum AuthProvider {
    /// Bearer session token from a successful sign-in
    SessionToken(String),

    /// No authentication
    None,
}

impl AuthProvider {
    /// Create session-token authentication.
    pub fn session_token(token: impl Into<String>) -> Self {
        Self::SessionToken(token.into())
    }

    /// No authentication.
    pub fn none() -> Self {
        Self::None
    }

    /// Attach the Authorization header to an HTTP request builder.
    pub fn apply_to_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Self::SessionToken(token) => request.bearer_auth(token),
            Self::None => request,
        }
    }

    /// The raw bearer token, when one is held.
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::SessionToken(token) => Some(token.as_str()),
            Self::None => None,
        }
    }

    /// Check if authentication is configured.
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::None)
    }
}
