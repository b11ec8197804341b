//! Session provider: wires the channels, hooks and state together

use crate::config::SessionConfig;
use crate::context::{SessionAction, SessionSnapshot, SessionStore};
use crate::freshness::TokenFreshness;
use crate::navigation::{LogNavigator, Navigator};
use crate::redirect::{AuthIntent, RedirectPolicy};
use crate::refresh::{ProactiveRefresh, ReactiveRefresh, SessionRefresher};
use crate::storage::{KeyValueStore, MemoryStore};
use pawfeed_http::types::{Identity, Profile};
use pawfeed_http::{
    ApiChannel, ClientError, HookPipeline, HttpTransport, RequestChannel, SideChannel, Transport,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Entry point for the rest of the application
///
/// Holds the two request channels, the session store and everything the
/// refresh hooks share. Cloning is cheap; clones share all state.
#[derive(Clone)]
pub struct SessionProvider {
    config: Arc<SessionConfig>,
    side: SideChannel,
    api: ApiChannel,
    store: SessionStore,
    refresher: SessionRefresher,
    redirect: RedirectPolicy,
}

impl SessionProvider {
    pub fn builder() -> SessionProviderBuilder {
        SessionProviderBuilder::default()
    }

    /// Probe the identity endpoint and populate the session
    ///
    /// A failed probe means nobody is signed in; it is not reported as an error.
    /// Mounting again replaces whatever the previous probe found.
    pub async fn mount(&self) {
        match self
            .side
            .get_json::<Identity>(&self.config.endpoints.identity)
            .await
        {
            Ok(identity) => {
                info!(username = %identity.username, "session restored");
                self.store.dispatch(SessionAction::SignedIn(identity.clone()));
                self.classify(&identity).await;
            }
            Err(err) => {
                debug!(error = %err, "no active session");
                self.store.dispatch(SessionAction::SignedOut);
            }
        }
        self.store.dispatch(SessionAction::Loaded);
    }

    pub fn current_user(&self) -> Option<Identity> {
        self.store.current()
    }

    pub fn is_shelter_user(&self) -> bool {
        self.store.is_shelter()
    }

    pub fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.store.subscribe()
    }

    /// Replace the identity and re-derive the shelter flag
    pub async fn set_current_user(&self, identity: Option<Identity>) {
        self.update_current_user(|_| identity).await;
    }

    /// Updater form of [`set_current_user`](Self::set_current_user)
    pub async fn update_current_user<F>(&self, f: F)
    where
        F: FnOnce(Option<&Identity>) -> Option<Identity>,
    {
        self.store.update(f);
        if let Some(identity) = self.store.current() {
            self.classify_or_warn(&identity).await;
        }
    }

    /// Navigate according to the view's auth expectation
    pub async fn use_redirect(&self, intent: AuthIntent) {
        self.redirect.reconcile(intent).await;
    }

    pub fn side_channel(&self) -> &SideChannel {
        &self.side
    }

    pub fn api_channel(&self) -> &ApiChannel {
        &self.api
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn freshness(&self) -> &TokenFreshness {
        self.refresher.freshness()
    }

    pub fn refresher(&self) -> &SessionRefresher {
        &self.refresher
    }

    pub fn redirect_policy(&self) -> &RedirectPolicy {
        &self.redirect
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    async fn fetch_profile(&self, profile_id: u64) -> Result<Profile, ClientError> {
        self.api
            .get_json(&self.config.endpoints.profile(profile_id))
            .await
    }

    /// Classify the linked profile for the mount probe; failures are swallowed
    async fn classify(&self, identity: &Identity) {
        let Some(profile_id) = identity.profile_id else {
            return;
        };
        match self.fetch_profile(profile_id).await {
            Ok(profile) => self.resolve_shelter(profile_id, &profile),
            Err(err) => debug!(profile_id, error = %err, "profile lookup failed on mount"),
        }
    }

    async fn classify_or_warn(&self, identity: &Identity) {
        let Some(profile_id) = identity.profile_id else {
            return;
        };
        match self.fetch_profile(profile_id).await {
            Ok(profile) => self.resolve_shelter(profile_id, &profile),
            Err(err) => warn!(profile_id, "{}", err.user_message()),
        }
    }

    /// Applied only while `profile_id` is still the signed-in profile
    fn resolve_shelter(&self, profile_id: u64, profile: &Profile) {
        self.store.dispatch(SessionAction::ShelterResolved {
            profile_id,
            is_shelter: profile.is_shelter(),
        });
    }
}

/// Builder for [`SessionProvider`]
#[derive(Default)]
pub struct SessionProviderBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    config: SessionConfig,
    storage: Option<Arc<dyn KeyValueStore>>,
    navigator: Option<Arc<dyn Navigator>>,
    transport: Option<Arc<dyn Transport>>,
}

impl SessionProviderBuilder {
    /// Set the API base URL
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    #[must_use]
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Where the refresh timestamp is persisted (default: in memory)
    #[must_use]
    pub fn storage(mut self, storage: Arc<dyn KeyValueStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Who handles redirects (default: [`LogNavigator`])
    #[must_use]
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Use a prebuilt transport instead of building one from the base URL
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the provider
    pub fn build(self) -> Result<SessionProvider, ClientError> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => {
                let base_url = self
                    .base_url
                    .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;
                let mut builder = HttpTransport::builder().base_url(base_url);
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                if let Some(user_agent) = self.user_agent {
                    builder = builder.user_agent(user_agent);
                }
                builder.build_shared()?
            }
        };

        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let navigator = self.navigator.unwrap_or_else(|| Arc::new(LogNavigator));
        let config = Arc::new(self.config);

        let side = SideChannel::new(transport.clone());
        let store = SessionStore::new();
        let freshness = TokenFreshness::new(storage, &config);
        let refresher = SessionRefresher::new(
            side.clone(),
            freshness,
            store.clone(),
            navigator.clone(),
            config.endpoints.refresh.clone(),
        );

        let hooks = HookPipeline::new()
            .with_request_hook(Arc::new(ProactiveRefresh::new(refresher.clone())))
            .with_response_hook(Arc::new(ReactiveRefresh::new(refresher.clone())));
        let api = ApiChannel::new(transport, hooks);
        let redirect = RedirectPolicy::new(side.clone(), navigator, config.endpoints.refresh.clone());

        Ok(SessionProvider {
            config,
            side,
            api,
            store,
            refresher,
            redirect,
        })
    }
}
