//! Pawfeed CLI - session-aware client for the Pawfeed API

mod commands;
mod config;
mod logging;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::Commands;
use crate::config::CliConfig;
use pawfeed_session::{FileStore, SessionProvider};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{Level, error, info};

#[derive(Parser)]
#[command(name = "pawfeed")]
#[command(about = "Session-aware client for the Pawfeed API")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "info")]
    log_level: LogLevel,

    /// Data directory for the session state and logs
    #[arg(short = 'd', long, global = true)]
    data_dir: Option<PathBuf>,

    /// Configuration file (defaults to ./pawfeed.toml when present)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// API base URL, overriding the configuration
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Request timeout in seconds (0 = no timeout), overriding the configuration
    #[arg(short = 't', long, global = true)]
    timeout: Option<u64>,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }

    let data_dir = crate::config::resolve_data_dir(cli.data_dir, &config);
    logging::init_logging(cli.log_level.into(), &data_dir, cli.no_file_log)?;

    info!(base_url = %config.base_url, "Starting Pawfeed CLI");

    let provider = build_provider(&config, &data_dir)?;

    match cli.command.execute(provider).await {
        Ok(()) => {
            info!("Command completed successfully");
        }
        Err(e) => {
            error!("Command failed: {e:#}");
            std::process::exit(1);
        }
    }

    Ok(())
}

fn build_provider(config: &CliConfig, data_dir: &Path) -> Result<SessionProvider> {
    let mut builder = SessionProvider::builder()
        .base_url(config.base_url.clone())
        .config(config.session.clone())
        .storage(Arc::new(FileStore::new(data_dir.join("session.json"))));
    if let Some(timeout) = config.timeout() {
        builder = builder.timeout(timeout);
    }
    if let Some(user_agent) = &config.user_agent {
        builder = builder.user_agent(user_agent.clone());
    }
    Ok(builder.build()?)
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}
