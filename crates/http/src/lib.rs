//! Pawfeed HTTP plumbing
//!
//! This crate provides the two request channels used by the Pawfeed client:
//! a side channel that talks to the API directly, and an ordinary channel that
//! runs every request through an ordered pipeline of request/response hooks.
//! Both channels share one transport, so they agree on the base URL and on the
//! cookie jar carrying the session credential.

pub mod client;
pub mod types;

pub use client::error::{ClientError, ErrorBody};
pub use client::hooks::{HookPipeline, RequestHook, ResponseHook};
pub use client::request::{ApiRequest, ApiResponse, RequestOptions};
pub use client::transport::{HttpTransport, HttpTransportBuilder, Transport};
pub use client::{ApiChannel, RequestChannel, SideChannel};

// Re-export commonly used types
pub use reqwest::{Method, StatusCode, header};
