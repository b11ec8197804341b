//! Ordered request/response hooks for the ordinary channel

use super::error::ClientError;
use super::request::{ApiRequest, ApiResponse};
use super::transport::Transport;
use async_trait::async_trait;
use std::sync::Arc;

/// Runs before a request is dispatched
///
/// Hooks may adjust the request but cannot stop it from being sent.
#[async_trait]
pub trait RequestHook: Send + Sync {
    fn name(&self) -> &'static str;

    async fn before_send(&self, request: &mut ApiRequest);
}

/// Runs on the outcome of a dispatched request
///
/// The hook receives the request as it was sent and the transport it was sent
/// on, so it can dispatch the same request again. Whatever it returns is what
/// the caller sees.
#[async_trait]
pub trait ResponseHook: Send + Sync {
    fn name(&self) -> &'static str;

    async fn after_response(
        &self,
        request: &ApiRequest,
        outcome: Result<ApiResponse, ClientError>,
        transport: &dyn Transport,
    ) -> Result<ApiResponse, ClientError>;
}

/// Request hooks run in insertion order, then response hooks in insertion order
#[derive(Clone, Default)]
pub struct HookPipeline {
    request_hooks: Vec<Arc<dyn RequestHook>>,
    response_hooks: Vec<Arc<dyn ResponseHook>>,
}

impl HookPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_request_hook(mut self, hook: Arc<dyn RequestHook>) -> Self {
        self.request_hooks.push(hook);
        self
    }

    #[must_use]
    pub fn with_response_hook(mut self, hook: Arc<dyn ResponseHook>) -> Self {
        self.response_hooks.push(hook);
        self
    }

    /// Names of the attached hooks, request hooks first
    pub fn names(&self) -> Vec<&'static str> {
        self.request_hooks
            .iter()
            .map(|hook| hook.name())
            .chain(self.response_hooks.iter().map(|hook| hook.name()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.request_hooks.is_empty() && self.response_hooks.is_empty()
    }

    pub(crate) async fn before_send(&self, request: &mut ApiRequest) {
        for hook in &self.request_hooks {
            hook.before_send(request).await;
        }
    }

    pub(crate) async fn after_response(
        &self,
        request: &ApiRequest,
        mut outcome: Result<ApiResponse, ClientError>,
        transport: &dyn Transport,
    ) -> Result<ApiResponse, ClientError> {
        for hook in &self.response_hooks {
            outcome = hook.after_response(request, outcome, transport).await;
        }
        outcome
    }
}
