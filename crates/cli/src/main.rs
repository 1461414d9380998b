//! Atelier admin CLI

mod commands;
mod config;
mod logging;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing::{Level, error};

use atelier_client::{ApiClient, SessionSink};
use atelier_core::credentials::FileCredentialStore;
use commands::Commands;

#[derive(Parser)]
#[command(name = "atelier")]
#[command(about = "Admin console for the atelier production backend")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// API base URL (overrides the configured one)
    #[arg(short = 'u', long, global = true)]
    base_url: Option<String>,

    /// Data directory for credentials and configuration
    #[arg(short = 'd', long, global = true)]
    data_dir: Option<std::path::PathBuf>,

    /// Request timeout in seconds
    #[arg(short = 't', long, global = true, default_value = "30")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

/// Terminal rendition of the "redirect to login" collaborator: when a refresh
/// fails mid-command the user is told how to start a new session.
struct CliSessionSink;

impl SessionSink for CliSessionSink {
    fn session_expired(&self) {
        eprintln!("Session expired; stored credentials were cleared. Run `atelier login <email>`.");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_logging(cli.log_level.into())?;

    let data_dir = config::data_dir(cli.data_dir)?;
    let cli_config = config::load_config(&data_dir)?;
    let base_url = cli
        .base_url
        .clone()
        .unwrap_or_else(|| cli_config.base_url.clone());

    let client = ApiClient::builder()
        .base_url(base_url)
        .credential_store(Arc::new(FileCredentialStore::new(&data_dir)))
        .session_sink(Arc::new(CliSessionSink))
        .timeout(Duration::from_secs(cli.timeout))
        .build()?;

    if let Err(e) = cli.command.execute(&client, &cli_config, &data_dir).await {
        error!("command failed: {e}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }

    Ok(())
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
