//! Vendordesk CLI - vendor and service contract tracking

mod commands;
mod config;
mod logging;
mod render;
mod session;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::Commands;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Level, error, info};
use vendordesk_client::ClientError;

#[derive(Parser)]
#[command(name = "vendordesk")]
#[command(about = "Track vendors, service contracts and upcoming payments")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Configuration file (defaults to <data dir>/vendordesk.toml when present)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, including the /api prefix (overrides VENDORDESK_BASE_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Data directory for credentials, configuration and logs
    #[arg(short = 'd', long, global = true)]
    data_dir: Option<PathBuf>,

    /// Request timeout in seconds (0 = no timeout)
    #[arg(short = 't', long, global = true)]
    timeout: Option<u64>,

    /// Emit raw JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = config::resolve_data_dir(cli.data_dir);
    logging::init_logging(cli.log_level.into(), &data_dir, cli.no_file_log)?;

    let client_config = config::load_client_config(cli.config.as_deref(), &data_dir)
        .and_then(|loaded| config::apply_overrides(loaded, cli.api_url, cli.timeout));
    let client_config = match client_config {
        Ok(client_config) => client_config,
        Err(e) => {
            error!("Invalid configuration: {e:#}");
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    };
    info!(base_url = %client_config.base_url, "Starting vendordesk");

    let client = session::build_client(&client_config, &data_dir)?;
    let command = cli.command.execute(&client, cli.json);

    let outcome = if client_config.timeout_secs == 0 {
        command.await
    } else {
        // Covers the replay and refresh round trips as a whole
        let budget = Duration::from_secs(client_config.timeout_secs.saturating_mul(3));
        match tokio::time::timeout(budget, command).await {
            Ok(outcome) => outcome,
            Err(_) => {
                error!("Command timed out after {} seconds", budget.as_secs());
                std::process::exit(1);
            }
        }
    };

    match outcome {
        Ok(()) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Command failed: {e:#}");
            eprintln!("error: {}", user_message(&e));
            std::process::exit(1);
        }
    }
}

/// Backend detail for API errors, the full chain otherwise
fn user_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ClientError>() {
        Some(client_err) => client_err.detail(),
        None => format!("{err:#}"),
    }
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

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_api_url_has_no_separate_env_name() {
        let command = Cli::command();
        let api_url = command
            .get_arguments()
            .find(|arg| arg.get_id() == "api_url")
            .unwrap();
        assert!(api_url.get_env().is_none());
    }

    #[test]
    fn test_global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "vendordesk",
            "reminders",
            "--api-url",
            "https://vendors.example.com/api",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("https://vendors.example.com/api"));
        assert!(cli.json);
    }
}
