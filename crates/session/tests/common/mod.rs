//! Shared helpers for session integration tests

#![allow(dead_code)]

use chrono::Utc;
use pawfeed_http::types::Identity;
use pawfeed_session::{KeyValueStore, MemoryStore, Navigator, Route, SessionProvider};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate, Times};

pub const REFRESH: &str = "/session/token/refresh/";
pub const IDENTITY: &str = "/session/identity/";

/// Navigator that remembers every route it was asked for
#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}

pub struct Harness {
    pub provider: SessionProvider,
    pub navigator: Arc<RecordingNavigator>,
    pub storage: Arc<MemoryStore>,
}

pub fn harness(server: &MockServer) -> Harness {
    harness_with_storage(server, Arc::new(MemoryStore::new()))
}

pub fn harness_with_storage(server: &MockServer, storage: Arc<MemoryStore>) -> Harness {
    let navigator = Arc::new(RecordingNavigator::default());
    let provider = SessionProvider::builder()
        .base_url(server.uri())
        .storage(storage.clone())
        .navigator(navigator.clone())
        .build()
        .unwrap();
    Harness {
        provider,
        navigator,
        storage,
    }
}

pub fn provider_with_store(server: &MockServer, storage: Arc<dyn KeyValueStore>) -> SessionProvider {
    SessionProvider::builder()
        .base_url(server.uri())
        .storage(storage)
        .navigator(Arc::new(RecordingNavigator::default()))
        .build()
        .unwrap()
}

/// Pretend a refresh just happened so the request hook stays quiet
pub fn mark_fresh(provider: &SessionProvider) {
    provider.freshness().record_refresh(Utc::now());
}

pub fn rex() -> Identity {
    Identity::new(5, "rex").with_profile_id(9)
}

/// Refresh endpoint answering `status`, expected exactly `times` times
pub async fn mount_refresh(server: &MockServer, status: u16, times: impl Into<Times>) {
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({})))
        .expect(times)
        .mount(server)
        .await;
}

/// Number of requests the server saw for `request_path`
pub async fn hits(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == request_path)
        .count()
}
