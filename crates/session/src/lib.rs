//! Pawfeed session layer
//!
//! Keeps the short-lived access token alive across every ordinary request,
//! tracks who is signed in, and ends the session when a refresh is no longer
//! possible. Build a [`SessionProvider`], call [`SessionProvider::mount`] once,
//! then issue requests on [`SessionProvider::api_channel`].

pub mod config;
pub mod context;
pub mod error;
pub mod freshness;
pub mod navigation;
pub mod provider;
pub mod redirect;
pub mod refresh;
pub mod services;
pub mod storage;

pub use config::{EndpointConfig, SessionConfig};
pub use context::{SessionAction, SessionSnapshot, SessionStore};
pub use error::StorageError;
pub use freshness::TokenFreshness;
pub use navigation::{LogNavigator, Navigator, Route};
pub use provider::{SessionProvider, SessionProviderBuilder};
pub use redirect::{AuthIntent, RedirectPolicy, redirect_target};
pub use refresh::{ProactiveRefresh, ReactiveRefresh, SessionRefresher};
pub use services::AccountService;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
