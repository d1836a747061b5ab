use super::user_id::UserId;

/// The identity, or absence of one, signaled by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    /// A user is signed in
    Authenticated {
        /// Identity that scopes all store operations
        user_id: UserId,
    },
    /// No user is signed in
    Unauthenticated,
}

impl Session {
    /// Build a session from an identity signal.
    pub fn from_signal(user_id: Option<UserId>) -> Self {
        match user_id {
            Some(user_id) => Session::Authenticated { user_id },
            None => Session::Unauthenticated,
        }
    }

    /// The signed-in user, if any.
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Session::Authenticated { user_id } => Some(user_id),
            Session::Unauthenticated => None,
        }
    }
}
