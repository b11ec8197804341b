//! CLI commands

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pawfeed_http::RequestChannel;
use pawfeed_session::{AccountService, AuthIntent, SessionProvider};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Subcommand)]
pub enum Commands {
    /// Show who the current session belongs to
    Whoami,

    /// GET an API path through the refreshing channel and print the body
    Get {
        /// Path relative to the base URL, e.g. /posts/
        path: String,
    },

    /// Sign in with a username and password
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "PAWFEED_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Probe the session the way a guarded view does on mount
    Redirect {
        #[arg(long, value_enum)]
        expect: Intent,
    },

    /// Interactive session that keeps one cookie jar across commands
    Shell,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Intent {
    /// View for signed-in users
    Authenticated,
    /// View for signed-out users (sign-in, sign-up)
    Unauthenticated,
}

impl From<Intent> for AuthIntent {
    fn from(intent: Intent) -> Self {
        match intent {
            Intent::Authenticated => AuthIntent::ExpectAuthenticated,
            Intent::Unauthenticated => AuthIntent::ExpectUnauthenticated,
        }
    }
}

impl Commands {
    pub async fn execute(self, provider: SessionProvider) -> Result<()> {
        match self {
            Commands::Whoami => {
                provider.mount().await;
                print_identity(&provider)
            }
            Commands::Get { path } => get(&provider, &path).await,
            Commands::Login { username, password } => {
                login(&provider, &username, &password).await
            }
            Commands::Redirect { expect } => {
                provider.use_redirect(expect.into()).await;
                Ok(())
            }
            Commands::Shell => run_shell(provider).await,
        }
    }
}

/// One line typed into the shell
#[derive(Parser)]
#[command(no_binary_name = true, disable_help_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand)]
enum ShellCommand {
    /// Re-probe the identity endpoint and show the result
    Mount,
    /// Show the current session without a network call
    Whoami,
    Get {
        path: String,
    },
    Login {
        username: String,
        password: String,
    },
    Logout,
    Redirect {
        #[arg(value_enum)]
        expect: Intent,
    },
    /// Run one refresh now
    Refresh,
    Quit,
}

async fn run_shell(provider: SessionProvider) -> Result<()> {
    provider.mount().await;
    print_identity(&provider)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parsed = match ShellLine::try_parse_from(line.split_whitespace()) {
            Ok(parsed) => parsed,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        let outcome = match parsed.command {
            ShellCommand::Quit => break,
            ShellCommand::Mount => {
                provider.mount().await;
                print_identity(&provider)
            }
            ShellCommand::Whoami => print_identity(&provider),
            ShellCommand::Get { path } => get(&provider, &path).await,
            ShellCommand::Login { username, password } => {
                login(&provider, &username, &password).await
            }
            ShellCommand::Logout => AccountService::new(provider.clone())
                .sign_out()
                .await
                .context("sign-out request failed, local session cleared anyway"),
            ShellCommand::Redirect { expect } => {
                provider.use_redirect(expect.into()).await;
                Ok(())
            }
            ShellCommand::Refresh => provider
                .refresher()
                .refresh()
                .await
                .context("refresh failed"),
        };

        if let Err(err) = outcome {
            warn!("{err:#}");
        }
    }

    info!("Shell closed");
    Ok(())
}

async fn get(provider: &SessionProvider, path: &str) -> Result<()> {
    let response = provider
        .api_channel()
        .get(path)
        .await
        .map_err(|err| anyhow::anyhow!(err.user_message()))
        .with_context(|| format!("GET {path} failed"))?;

    match response.json::<serde_json::Value>() {
        Ok(body) => println!("{}", serde_json::to_string_pretty(&body)?),
        Err(_) => println!("{}", response.text()),
    }
    Ok(())
}

async fn login(provider: &SessionProvider, username: &str, password: &str) -> Result<()> {
    AccountService::new(provider.clone())
        .sign_in(username, password)
        .await
        .map_err(|err| anyhow::anyhow!(err.user_message()))
        .context("sign-in failed")?;
    print_identity(provider)
}

fn print_identity(provider: &SessionProvider) -> Result<()> {
    match provider.current_user() {
        Some(identity) => {
            println!("{}", serde_json::to_string_pretty(&identity)?);
            if provider.is_shelter_user() {
                println!("(shelter account)");
            }
        }
        None => println!("Not signed in"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<ShellCommand, clap::Error> {
        ShellLine::try_parse_from(line.split_whitespace()).map(|parsed| parsed.command)
    }

    #[test]
    fn test_shell_parses_commands() {
        assert!(matches!(parse("whoami"), Ok(ShellCommand::Whoami)));
        assert!(matches!(
            parse("get /posts/"),
            Ok(ShellCommand::Get { path }) if path == "/posts/"
        ));
        assert!(matches!(
            parse("login rex hunter22"),
            Ok(ShellCommand::Login { username, password }) if username == "rex" && password == "hunter22"
        ));
        assert!(matches!(
            parse("redirect unauthenticated"),
            Ok(ShellCommand::Redirect {
                expect: Intent::Unauthenticated
            })
        ));
    }

    #[test]
    fn test_shell_rejects_unknown_commands() {
        assert!(parse("adopt 7").is_err());
        assert!(parse("get").is_err());
    }

    #[test]
    fn test_intent_mapping() {
        assert_eq!(
            AuthIntent::from(Intent::Authenticated),
            AuthIntent::ExpectAuthenticated
        );
        assert_eq!(
            AuthIntent::from(Intent::Unauthenticated),
            AuthIntent::ExpectUnauthenticated
        );
    }
}
