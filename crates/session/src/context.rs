//! Process-wide session state

use pawfeed_http::types::Identity;
use std::sync::Arc;
use tokio::sync::watch;

/// Everything views know about the current session
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    pub identity: Option<Identity>,
    pub is_shelter: bool,
    pub is_loading: bool,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            identity: None,
            is_shelter: false,
            is_loading: true, // Until the mount probe has answered
        }
    }
}

/// Session state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    SignedIn(Identity),
    SignedOut,
    /// Classification of `profile_id`; dropped unless it is still the current profile
    ShelterResolved { profile_id: u64, is_shelter: bool },
    Loaded,
}

impl SessionSnapshot {
    /// Apply `action`; returns whether anything changed
    fn reduce(&mut self, action: SessionAction) -> bool {
        let before = self.clone();
        match action {
            SessionAction::SignedIn(identity) => {
                let previous_profile = self.identity.as_ref().and_then(|current| current.profile_id);
                if identity.profile_id.is_none() || identity.profile_id != previous_profile {
                    self.is_shelter = false;
                }
                self.identity = Some(identity);
            }
            SessionAction::SignedOut => {
                self.identity = None;
                self.is_shelter = false;
            }
            SessionAction::ShelterResolved {
                profile_id,
                is_shelter,
            } => {
                let current_profile = self.identity.as_ref().and_then(|current| current.profile_id);
                if current_profile == Some(profile_id) {
                    self.is_shelter = is_shelter;
                }
            }
            SessionAction::Loaded => self.is_loading = false,
        }
        *self != before
    }
}

/// Single-writer store for the current identity
///
/// Every mutation goes through [`dispatch`](Self::dispatch) or
/// [`update`](Self::update) and is visible to all readers and subscribers as
/// soon as the call returns.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<watch::Sender<SessionSnapshot>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self {
            state: Arc::new(state),
        }
    }

    pub fn current(&self) -> Option<Identity> {
        self.state.borrow().identity.clone()
    }

    pub fn is_shelter(&self) -> bool {
        self.state.borrow().is_shelter
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Receiver notified on every effective change
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn dispatch(&self, action: SessionAction) {
        self.state.send_if_modified(|snapshot| snapshot.reduce(action));
    }

    /// Replace the identity
    pub fn set(&self, identity: Option<Identity>) {
        self.update(|_| identity);
    }

    /// Compute the next identity from the previous one
    ///
    /// Returns the previous identity so callers can tell whether a session was
    /// actually ended.
    pub fn update<F>(&self, f: F) -> Option<Identity>
    where
        F: FnOnce(Option<&Identity>) -> Option<Identity>,
    {
        let mut previous = None;
        self.state.send_if_modified(|snapshot| {
            previous = snapshot.identity.clone();
            let action = match f(previous.as_ref()) {
                Some(identity) => SessionAction::SignedIn(identity),
                None => SessionAction::SignedOut,
            };
            snapshot.reduce(action)
        });
        previous
    }
}
