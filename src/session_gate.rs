//! Session gate: routes between the authentication flow and the main
//! application based on identity signals.

use std::sync::{Arc, Mutex};

use crate::identity::{IdentityProvider, SessionWatch};
use crate::models::UserId;

/// Gate state.
///
/// `Initializing` is entered exactly once, at construction, and exited
/// permanently by the first identity signal. Every subsequent signal moves
/// directly between `Authenticated` and `Unauthenticated`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    /// No identity signal received yet; show a loading indicator only
    Initializing,
    /// A user is signed in
    Authenticated(UserId),
    /// No user is signed in
    Unauthenticated,
}

/// The screen set determined by the gate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Loading indicator, no navigation
    Loading,
    /// Sign-in / sign-up flow
    AuthFlow,
    /// Main application (task list + leaderboard)
    Main,
}

/// Observes the identity provider and determines the active screen.
#[derive(Debug)]
pub struct SessionGate {
    state: GateState,
}

impl Default for SessionGate {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionGate {
    /// Create a gate in the `Initializing` state.
    pub fn new() -> Self {
        Self {
            state: GateState::Initializing,
        }
    }

    /// Apply an identity signal from the provider.
    ///
    /// The first signal permanently exits `Initializing`; there is no
    /// transition back.
    pub fn on_session_signal(&mut self, user_id: Option<UserId>) {
        let next = match user_id {
            Some(uid) => GateState::Authenticated(uid),
            None => GateState::Unauthenticated,
        };
        if self.state != next {
            log::debug!("[GATE] {:?} -> {:?}", self.state, next);
        }
        self.state = next;
    }

    /// Current gate state.
    pub fn state(&self) -> &GateState {
        &self.state
    }

    /// True until the first identity signal arrives.
    pub fn is_initializing(&self) -> bool {
        matches!(self.state, GateState::Initializing)
    }

    /// The signed-in user, when authenticated.
    pub fn user_id(&self) -> Option<&UserId> {
        match &self.state {
            GateState::Authenticated(uid) => Some(uid),
            _ => None,
        }
    }

    /// The screen set for the current state.
    pub fn active_screen(&self) -> Screen {
        match self.state {
            GateState::Initializing => Screen::Loading,
            GateState::Unauthenticated => Screen::AuthFlow,
            GateState::Authenticated(_) => Screen::Main,
        }
    }

    /// Create a gate wired to a provider's session signals.
    ///
    /// The gate stays attached until the returned [`SessionWatch`] is
    /// dropped; keep both alive together.
    pub fn attached<P: IdentityProvider>(provider: &P) -> (Arc<Mutex<SessionGate>>, SessionWatch) {
        let gate = Arc::new(Mutex::new(SessionGate::new()));
        let sink = gate.clone();
        let watch = provider.subscribe_session(Arc::new(move |uid| {
            if let Ok(mut gate) = sink.lock() {
                gate.on_session_signal(uid.cloned());
            }
        }));
        (gate, watch)
    }
}
