//! Identity provider boundary.
//!
//! The identity provider issues a durable user identity and session token
//! and notifies subscribers whenever the session changes. [`SessionHub`]
//! is the shared observer registry used by the remote client and by
//! in-memory providers in tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use crate::error::Result;
use crate::models::{Session, UserId};

/// Callback invoked on every session change with the new identity signal.
///
/// `Some(uid)` means a user is signed in; `None` means signed out.
pub type SessionCallback = Arc<dyn Fn(Option<&UserId>) + Send + Sync>;

/// External authentication service issuing session identities.
///
/// Failures from `sign_in` and `sign_up` carry the provider's
/// human-readable message verbatim; callers surface it to the user without
/// rewording.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Sign an existing user in.
    async fn sign_in(&self, email: &str, password: &str) -> Result<UserId>;

    /// Create an account and sign the new user in.
    async fn sign_up(&self, email: &str, password: &str) -> Result<UserId>;

    /// End the current session. Observers receive a `None` signal.
    async fn sign_out(&self) -> Result<()>;

    /// The currently signed-in user, if any.
    fn current_user_id(&self) -> Option<UserId>;

    /// The current session as a two-state value.
    fn current_session(&self) -> Session {
        Session::from_signal(self.current_user_id())
    }

    /// Register a session-change observer.
    ///
    /// The callback fires on every subsequent session change until the
    /// returned [`SessionWatch`] is dropped.
    fn subscribe_session(&self, callback: SessionCallback) -> SessionWatch;
}

struct HubInner {
    current: Option<UserId>,
    observers: HashMap<u64, SessionCallback>,
    next_id: u64,
}

/// Shared session state with an observer registry.
///
/// Holds the current identity signal and fans every change out to the
/// registered callbacks. Cloning shares the underlying state.
#[derive(Clone)]
pub struct SessionHub {
    inner: Arc<Mutex<HubInner>>,
}

impl Default for SessionHub {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHub {
    /// Create a hub with no session and no observers.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HubInner {
                current: None,
                observers: HashMap::new(),
                next_id: 0,
            })),
        }
    }

    /// The current identity signal.
    pub fn current(&self) -> Option<UserId> {
        self.inner
            .lock()
            .map(|inner| inner.current.clone())
            .unwrap_or(None)
    }

    /// Replace the identity signal and notify every observer.
    pub fn set(&self, user_id: Option<UserId>) {
        // Callbacks run outside the lock so an observer may re-enter the hub.
        let callbacks: Vec<SessionCallback> = {
            let Ok(mut inner) = self.inner.lock() else {
                return;
            };
            inner.current = user_id.clone();
            inner.observers.values().cloned().collect()
        };
        for cb in callbacks {
            cb(user_id.as_ref());
        }
    }

    /// Register an observer; the watch guard unregisters it on drop.
    pub fn subscribe(&self, callback: SessionCallback) -> SessionWatch {
        let id = {
            let Ok(mut inner) = self.inner.lock() else {
                return SessionWatch {
                    hub: Weak::new(),
                    id: 0,
                };
            };
            let id = inner.next_id;
            inner.next_id += 1;
            inner.observers.insert(id, callback);
            id
        };
        SessionWatch {
            hub: Arc::downgrade(&self.inner),
            id,
        }
    }

    #[cfg(test)]
    fn observer_count(&self) -> usize {
        self.inner.lock().map(|inner| inner.observers.len()).unwrap_or(0)
    }
}

/// Guard for a registered session observer.
///
/// Dropping the watch removes the observer from the hub; no signal is
/// delivered afterwards.
pub struct SessionWatch {
    hub: Weak<Mutex<HubInner>>,
    id: u64,
}

impl Drop for SessionWatch {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            if let Ok(mut inner) = hub.lock() {
                inner.observers.remove(&self.id);
            }
        }
    }
}
