//! Shared HTTP transport

use super::error::ClientError;
use super::request::{ApiRequest, ApiResponse};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Dispatches a request exactly once, with no hooks involved
#[async_trait]
pub trait Transport: Send + Sync {
    /// Base URL every request path is appended to
    fn base_url(&self) -> &str;

    /// Send the request; non-success statuses come back as [`ClientError`]
    async fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError>;
}

/// reqwest-backed transport with a cookie store shared by every channel built on it
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a new transport with default configuration
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new transport builder
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        let mut builder = self
            .client
            .request(request.method().clone(), self.url_for(request.path()))
            .headers(request.headers().clone());
        if !request.query().is_empty() {
            builder = builder.query(request.query());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        debug!(method = %request.method(), path = request.path(), "dispatching request");
        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        debug!(method = %request.method(), path = request.path(), status = status.as_u16(), "response received");

        ApiResponse::new(status, headers, body).into_result()
    }
}

/// Builder for [`HttpTransport`]
#[derive(Default)]
pub struct HttpTransportBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl HttpTransportBuilder {
    /// Set the base URL
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

    /// Build the transport
    pub fn build(self) -> Result<HttpTransport, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        let mut client_builder = ClientBuilder::new().cookie_store(true);

        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        client_builder = client_builder.user_agent(
            self.user_agent
                .unwrap_or_else(|| concat!("pawfeed-client/", env!("CARGO_PKG_VERSION")).into()),
        );

        let client = client_builder.build()?;

        Ok(HttpTransport { client, base_url })
    }

    /// Build the transport behind an `Arc`, ready to be shared by both channels
    pub fn build_shared(self) -> Result<Arc<HttpTransport>, ClientError> {
        self.build().map(Arc::new)
    }
}
