//! CLI configuration

use config::{Config, ConfigError, Environment, File};
use pawfeed_session::SessionConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file picked up from the working directory when no `--config` is given
const DEFAULT_CONFIG_FILE: &str = "pawfeed.toml";

/// Settings for talking to the Pawfeed API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds (0 = no timeout)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub session: SessionConfig,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: None,
            data_dir: None,
            session: SessionConfig::default(),
        }
    }
}

impl CliConfig {
    /// Load defaults, then the config file, then `PAWFEED__*` environment variables
    ///
    /// An explicit `path` must exist; the default `pawfeed.toml` is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        builder = match path {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix("PAWFEED")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Resolve the data directory: flag, then config, then `PAWFEED_STATE_DIR`, then the system data dir
pub fn resolve_data_dir(flag: Option<PathBuf>, config: &CliConfig) -> PathBuf {
    flag.or_else(|| config.data_dir.clone()).unwrap_or_else(|| {
        if let Ok(state_dir) = std::env::var("PAWFEED_STATE_DIR") {
            PathBuf::from(state_dir)
        } else {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("pawfeed")
        }
    })
}
