//! Session configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Access token lifetime granted by the API
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 300;

/// How long before expiry the token is already treated as stale
pub const DEFAULT_REFRESH_MARGIN_SECS: u64 = 30;

/// Storage key for the refresh timestamp
pub const REFRESH_TIMESTAMP_KEY: &str = "refresh_token_timestamp";

/// Session middleware settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_token_lifetime_secs")]
    pub token_lifetime_secs: u64,
    #[serde(default = "default_refresh_margin_secs")]
    pub refresh_margin_secs: u64,
    #[serde(default = "default_timestamp_key")]
    pub timestamp_key: String,
    #[serde(default)]
    pub endpoints: EndpointConfig,
}

/// API paths the session layer talks to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub identity: String,
    pub refresh: String,
    pub login: String,
    pub logout: String,
    pub registration: String,
    pub profiles: String,
}

fn default_token_lifetime_secs() -> u64 {
    DEFAULT_TOKEN_LIFETIME_SECS
}

fn default_refresh_margin_secs() -> u64 {
    DEFAULT_REFRESH_MARGIN_SECS
}

fn default_timestamp_key() -> String {
    REFRESH_TIMESTAMP_KEY.to_string()
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            identity: "/session/identity/".to_string(),
            refresh: "/session/token/refresh/".to_string(),
            login: "/session/login/".to_string(),
            logout: "/session/logout/".to_string(),
            registration: "/session/registration/".to_string(),
            profiles: "/profiles/".to_string(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_lifetime_secs: default_token_lifetime_secs(),
            refresh_margin_secs: default_refresh_margin_secs(),
            timestamp_key: default_timestamp_key(),
            endpoints: EndpointConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn token_lifetime(&self) -> Duration {
        Duration::from_secs(self.token_lifetime_secs)
    }

    pub fn refresh_margin(&self) -> Duration {
        Duration::from_secs(self.refresh_margin_secs)
    }

    /// Age after which the token should be refreshed before use
    pub fn stale_after(&self) -> Duration {
        self.token_lifetime().saturating_sub(self.refresh_margin())
    }
}

impl EndpointConfig {
    /// Detail path for profile `id`
    pub fn profile(&self, id: u64) -> String {
        format!("{}/{id}/", self.profiles.trim_end_matches('/'))
    }
}
