//! Keeps the access token alive across ordinary requests
//!
//! [`ProactiveRefresh`] refreshes before dispatch when the token is stale.
//! [`ReactiveRefresh`] refreshes once after a 401 and replays the original
//! request. Both call the refresh endpoint on the side channel, so neither can
//! trigger itself.

use crate::context::SessionStore;
use crate::freshness::TokenFreshness;
use crate::navigation::{Navigator, Route};
use async_trait::async_trait;
use chrono::Utc;
use pawfeed_http::{
    ApiRequest, ApiResponse, ClientError, RequestChannel, RequestHook, ResponseHook, SideChannel,
    Transport,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Performs the refresh call and applies its outcome to the session
#[derive(Clone)]
pub struct SessionRefresher {
    side: SideChannel,
    freshness: TokenFreshness,
    store: SessionStore,
    navigator: Arc<dyn Navigator>,
    refresh_path: String,
}

impl SessionRefresher {
    pub fn new(
        side: SideChannel,
        freshness: TokenFreshness,
        store: SessionStore,
        navigator: Arc<dyn Navigator>,
        refresh_path: impl Into<String>,
    ) -> Self {
        Self {
            side,
            freshness,
            store,
            navigator,
            refresh_path: refresh_path.into(),
        }
    }

    /// One refresh attempt; on failure the session is ended
    pub async fn refresh(&self) -> Result<(), ClientError> {
        match self.side.send(ApiRequest::post(&self.refresh_path)).await {
            Ok(_) => {
                self.freshness.record_refresh(Utc::now());
                debug!("session refreshed");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "session refresh failed");
                self.expire_session();
                Err(err)
            }
        }
    }

    /// Clear identity and refresh timestamp
    ///
    /// The user is only told and redirected if there was a session to end.
    pub fn expire_session(&self) {
        let previous = self.store.update(|_| None);
        if previous.is_some() {
            info!("You are logged out.");
            self.navigator.navigate(Route::SignIn);
        }
        self.freshness.clear();
    }

    pub fn freshness(&self) -> &TokenFreshness {
        &self.freshness
    }
}

/// Request hook: refresh first when the token is stale, then always proceed
pub struct ProactiveRefresh {
    refresher: SessionRefresher,
}

impl ProactiveRefresh {
    pub fn new(refresher: SessionRefresher) -> Self {
        Self { refresher }
    }
}

#[async_trait]
impl RequestHook for ProactiveRefresh {
    fn name(&self) -> &'static str {
        "proactive-refresh"
    }

    async fn before_send(&self, request: &mut ApiRequest) {
        if !self.refresher.freshness().should_refresh() {
            return;
        }
        debug!(path = request.path(), "token stale, refreshing before dispatch");
        if self.refresher.refresh().await.is_err() {
            // The request still goes out; a 401 is handled by the response hook
            debug!(path = request.path(), "dispatching after failed refresh");
        }
    }
}

/// Response hook: on 401 refresh once and replay the original request once
pub struct ReactiveRefresh {
    refresher: SessionRefresher,
}

impl ReactiveRefresh {
    pub fn new(refresher: SessionRefresher) -> Self {
        Self { refresher }
    }
}

#[async_trait]
impl ResponseHook for ReactiveRefresh {
    fn name(&self) -> &'static str {
        "reactive-refresh"
    }

    async fn after_response(
        &self,
        request: &ApiRequest,
        outcome: Result<ApiResponse, ClientError>,
        transport: &dyn Transport,
    ) -> Result<ApiResponse, ClientError> {
        let err = match outcome {
            Err(err) if err.is_auth_expired() => err,
            other => return other,
        };

        debug!(method = %request.method(), path = request.path(), "unauthorized, refreshing session");
        if self.refresher.refresh().await.is_err() {
            return Err(err);
        }

        // Straight to the transport: a second 401 is final
        debug!(method = %request.method(), path = request.path(), "replaying request");
        transport.dispatch(request).await
    }
}
