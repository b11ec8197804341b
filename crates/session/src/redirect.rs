//! Mount-time redirect policy for views with an auth expectation

use crate::navigation::{Navigator, Route};
use pawfeed_http::{ApiRequest, RequestChannel, SideChannel};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

/// What a view expects about the session when it mounts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthIntent {
    ExpectAuthenticated,
    ExpectUnauthenticated,
}

/// Where to send the user given the intent and whether a refresh succeeded
///
/// The user is sent home when the probe outcome matches the intent: a signed-in
/// user on a view declaring `ExpectAuthenticated`, or a signed-out user on a
/// view declaring `ExpectUnauthenticated`.
pub fn redirect_target(intent: AuthIntent, refresh_succeeded: bool) -> Option<Route> {
    match (intent, refresh_succeeded) {
        (AuthIntent::ExpectAuthenticated, true) | (AuthIntent::ExpectUnauthenticated, false) => {
            Some(Route::Home)
        }
        _ => None,
    }
}

/// Probes the session once and navigates according to [`redirect_target`]
#[derive(Clone)]
pub struct RedirectPolicy {
    side: SideChannel,
    navigator: Arc<dyn Navigator>,
    refresh_path: String,
}

impl RedirectPolicy {
    pub fn new(
        side: SideChannel,
        navigator: Arc<dyn Navigator>,
        refresh_path: impl Into<String>,
    ) -> Self {
        Self {
            side,
            navigator,
            refresh_path: refresh_path.into(),
        }
    }

    pub async fn reconcile(&self, intent: AuthIntent) {
        let refreshed = match self.side.send(ApiRequest::post(&self.refresh_path)).await {
            Ok(_) => true,
            Err(err) => {
                debug!(error = %err, "redirect probe failed");
                false
            }
        };
        if let Some(route) = redirect_target(intent, refreshed) {
            self.navigator.navigate(route);
        }
    }

    /// Run [`reconcile`](Self::reconcile) without waiting for it
    pub fn spawn_reconcile(&self, intent: AuthIntent) -> JoinHandle<()> {
        let policy = self.clone();
        tokio::spawn(async move { policy.reconcile(intent).await })
    }
}
