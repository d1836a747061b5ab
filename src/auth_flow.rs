//! Sign-in / sign-up flow over the identity provider boundary.
//!
//! Two intents only, both taking email and password, both delegating
//! entirely to the provider. The provider's failure message is surfaced
//! verbatim; no local email-format or password-strength validation is
//! performed.

use crate::error::{Result, TaskLinkError};
use crate::identity::IdentityProvider;
use crate::models::UserId;

/// Which intent the flow submits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Sign an existing user in
    SignIn,
    /// Create an account
    SignUp,
}

impl AuthMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        }
    }
}

/// Authentication flow state.
pub struct AuthFlow<P> {
    provider: P,
    mode: AuthMode,
}

impl<P: IdentityProvider> AuthFlow<P> {
    /// Create a flow in sign-in mode.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            mode: AuthMode::SignIn,
        }
    }

    /// Current mode.
    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    /// Switch between sign-in and sign-up.
    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
    }

    /// Whether the submit action is enabled.
    ///
    /// Both fields must be non-empty (email after trimming); this is the
    /// only client-side precondition.
    pub fn can_submit(email: &str, password: &str) -> bool {
        !email.trim().is_empty() && !password.is_empty()
    }

    /// Submit the current mode's intent.
    ///
    /// Never reaches the provider when [`can_submit`](Self::can_submit) is
    /// false — the action is disabled, not server-rejected.
    pub async fn submit(&self, email: &str, password: &str) -> Result<UserId> {
        if !Self::can_submit(email, password) {
            return Err(TaskLinkError::Configuration(
                "Email and password are required".to_string(),
            ));
        }

        match self.mode {
            AuthMode::SignIn => self.provider.sign_in(email.trim(), password).await,
            AuthMode::SignUp => self.provider.sign_up(email.trim(), password).await,
        }
    }

    /// The wrapped provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{SessionCallback, SessionHub, SessionWatch};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct CountingProvider {
        hub: SessionHub,
        sign_ins: Arc<AtomicUsize>,
        sign_ups: Arc<AtomicUsize>,
        fail_with: Arc<std::sync::Mutex<Option<String>>>,
    }

    #[async_trait]
    impl IdentityProvider for CountingProvider {
        async fn sign_in(&self, _email: &str, _password: &str) -> crate::Result<UserId> {
            self.sign_ins.fetch_add(1, Ordering::SeqCst);
            if let Some(message) = self.fail_with.lock().unwrap().clone() {
                return Err(TaskLinkError::Authentication(message));
            }
            Ok(UserId::new("u1"))
        }
        async fn sign_up(&self, _email: &str, _password: &str) -> crate::Result<UserId> {
            self.sign_ups.fetch_add(1, Ordering::SeqCst);
            Ok(UserId::new("u1"))
        }
        async fn sign_out(&self) -> crate::Result<()> {
            Ok(())
        }
        fn current_user_id(&self) -> Option<UserId> {
            self.hub.current()
        }
        fn subscribe_session(&self, callback: SessionCallback) -> SessionWatch {
            self.hub.subscribe(callback)
        }
    }

    #[test]
    fn can_submit_requires_both_fields() {
        type Flow = AuthFlow<CountingProvider>;
        assert!(Flow::can_submit("a@b.c", "pw"));
        assert!(!Flow::can_submit("", "pw"));
        assert!(!Flow::can_submit("   ", "pw"));
        assert!(!Flow::can_submit("a@b.c", ""));
        assert!(!Flow::can_submit("", ""));
    }

    #[tokio::test]
    async fn submit_with_empty_fields_never_reaches_provider() {
        let provider = CountingProvider::default();
        let flow = AuthFlow::new(provider.clone());

        assert!(flow.submit("", "pw").await.is_err());
        assert!(flow.submit("a@b.c", "").await.is_err());
        assert_eq!(provider.sign_ins.load(Ordering::SeqCst), 0);
        assert_eq!(provider.sign_ups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn mode_selects_the_intent() {
        let provider = CountingProvider::default();
        let mut flow = AuthFlow::new(provider.clone());

        flow.submit("a@b.c", "pw").await.unwrap();
        assert_eq!(provider.sign_ins.load(Ordering::SeqCst), 1);

        flow.toggle_mode();
        assert_eq!(flow.mode(), AuthMode::SignUp);
        flow.submit("a@b.c", "pw").await.unwrap();
        assert_eq!(provider.sign_ups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn provider_failure_message_is_verbatim() {
        let provider = CountingProvider::default();
        *provider.fail_with.lock().unwrap() = Some("The password is invalid.".to_string());
        let flow = AuthFlow::new(provider);

        let err = flow.submit("a@b.c", "wrong").await.unwrap_err();
        assert_eq!(err.to_string(), "The password is invalid.");
    }
}
