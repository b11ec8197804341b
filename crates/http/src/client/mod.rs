//! Pawfeed HTTP client
//!
//! [`SideChannel`] sends requests straight to the transport. [`ApiChannel`]
//! wraps the same transport in a [`HookPipeline`]. Calls that must never
//! trigger the session hooks (the refresh call itself, the identity probe)
//! go through the side channel; everything else goes through the ordinary one.

pub mod error;
pub mod hooks;
pub mod request;
pub mod transport;

use async_trait::async_trait;
use error::ClientError;
use hooks::HookPipeline;
use request::{ApiRequest, ApiResponse, RequestOptions};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use transport::Transport;

/// Verb helpers shared by both channels
///
/// The `*_with` variants layer [`RequestOptions`] onto the request.
#[async_trait]
pub trait RequestChannel: Send + Sync {
    /// Send a fully built request
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError>;

    async fn get(&self, path: &str) -> Result<ApiResponse, ClientError> {
        self.get_with(path, RequestOptions::default()).await
    }

    /// GET with per-call headers and query parameters
    async fn get_with(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, ClientError> {
        self.send(ApiRequest::get(path).with_options(options)).await
    }

    async fn post<B>(&self, path: &str, body: &B) -> Result<ApiResponse, ClientError>
    where
        B: Serialize + Sync + ?Sized,
    {
        self.post_with(path, body, RequestOptions::default()).await
    }

    async fn post_with<B>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<ApiResponse, ClientError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let request = ApiRequest::post(path).with_json(body)?.with_options(options);
        self.send(request).await
    }

    async fn put<B>(&self, path: &str, body: &B) -> Result<ApiResponse, ClientError>
    where
        B: Serialize + Sync + ?Sized,
    {
        self.put_with(path, body, RequestOptions::default()).await
    }

    async fn put_with<B>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<ApiResponse, ClientError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let request = ApiRequest::put(path).with_json(body)?.with_options(options);
        self.send(request).await
    }

    async fn delete(&self, path: &str) -> Result<ApiResponse, ClientError> {
        self.delete_with(path, RequestOptions::default()).await
    }

    async fn delete_with(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, ClientError> {
        self.send(ApiRequest::delete(path).with_options(options)).await
    }

    /// GET `path` and deserialize the JSON body
    async fn get_json<T>(&self, path: &str) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        self.get(path).await?.json()
    }
}

/// Channel that bypasses every hook
#[derive(Clone)]
pub struct SideChannel {
    transport: Arc<dyn Transport>,
}

impl SideChannel {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }
}

#[async_trait]
impl RequestChannel for SideChannel {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        self.transport.dispatch(&request).await
    }
}

/// Channel for ordinary authenticated calls, with hooks attached
#[derive(Clone)]
pub struct ApiChannel {
    transport: Arc<dyn Transport>,
    hooks: HookPipeline,
}

impl ApiChannel {
    pub fn new(transport: Arc<dyn Transport>, hooks: HookPipeline) -> Self {
        Self { transport, hooks }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    pub fn hooks(&self) -> &HookPipeline {
        &self.hooks
    }

    /// A side channel over the same transport
    pub fn to_side_channel(&self) -> SideChannel {
        SideChannel::new(self.transport.clone())
    }
}

#[async_trait]
impl RequestChannel for ApiChannel {
    async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, ClientError> {
        self.hooks.before_send(&mut request).await;
        let outcome = self.transport.dispatch(&request).await;
        self.hooks
            .after_response(&request, outcome, self.transport.as_ref())
            .await
    }
}
