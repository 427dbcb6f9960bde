//! CLI Command Handlers
//!
//! Implementation of all CLI commands for the listing sentinel.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::meteora::{MeteoraClient, MeteoraConfig};
use crate::adapters::telegram::{LogNotifier, TelegramNotifier};
use crate::application::LiquidityMonitor;
use crate::config::{load_config, Config};
use crate::domain::aggregate;
use crate::ports::{Notifier, PoolSource};

const DEFAULT_CONFIG: &str = "config/monitor.toml";

/// Listing Sentinel - new token liquidity watcher for Meteora DLMM pools
#[derive(Parser, Debug)]
#[command(
    name = "listing-sentinel",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "New token liquidity watcher for Meteora DLMM pools",
    long_about = "Listing Sentinel polls the Meteora pair listing, tracks every newly listed \
                  token for a bounded number of cycles and alerts once its best observed \
                  liquidity and 24h volume both clear the configured thresholds."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging (per-token status each cycle)
    #[arg(long, global = true, conflicts_with = "quiet")]
    pub debug: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the monitoring loop
    Run(RunCmd),

    /// Fetch the listing once and print the top tokens
    Scan(ScanCmd),

    /// Send a test message through the configured alert channel
    Ping(PingCmd),
}

/// Start monitoring loop
#[derive(Parser, Debug)]
pub struct RunCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

/// One-shot listing scan
#[derive(Parser, Debug)]
pub struct ScanCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Number of tokens to print
    #[arg(short, long, value_name = "N", default_value = "20")]
    pub top: usize,
}

/// Alert channel check
#[derive(Parser, Debug)]
pub struct PingCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Message to send
    #[arg(short, long, default_value = "listing-sentinel test alert")]
    pub message: String,
}

/// Execute the parsed command
pub async fn execute(app: CliApp) -> Result<()> {
    match app.command {
        Command::Run(cmd) => run_command(cmd).await,
        Command::Scan(cmd) => scan_command(cmd).await,
        Command::Ping(cmd) => ping_command(cmd).await,
    }
}

async fn run_command(cmd: RunCmd) -> Result<()> {
    tracing::info!("Starting listing sentinel...");

    let config = load_or_default(&cmd.config)?;
    let source = build_source(&config)?;
    let notifier = build_notifier(&config)?;

    let mut monitor = LiquidityMonitor::from_config(&config, source, notifier)
        .context("Failed to create monitor")?;

    // Setup Ctrl+C handler
    let handle = monitor.handle();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received");
        handle.stop();
    });

    monitor.run().await?;
    tracing::info!("Listing sentinel stopped");
    Ok(())
}

async fn scan_command(cmd: ScanCmd) -> Result<()> {
    let config = load_or_default(&cmd.config)?;
    let source = build_source(&config)?;

    let records = source
        .fetch_pools()
        .await
        .context("Failed to fetch pool listing")?;
    let snapshot = aggregate(&records);

    println!(
        "{} pools, {} tokens ({} malformed fields)",
        snapshot.pool_count,
        snapshot.token_count(),
        snapshot.malformed_fields
    );
    println!(
        "{:<46} {:>16} {:>16} {:>6} {:>14}",
        "MINT", "LIQUIDITY", "VOLUME 24H", "POOLS", "PRICE"
    );

    for token in snapshot.top_by_liquidity(cmd.top) {
        let marker = if token.liquidity >= config.monitor.min_liquidity
            && token.volume >= config.monitor.min_volume
        {
            "*"
        } else {
            ""
        };
        println!(
            "{:<46} {:>16.2} {:>16.2} {:>6} {:>14.8}{}",
            token.mint,
            token.liquidity,
            token.volume,
            token.pool_count(),
            token.latest_price,
            marker
        );
    }

    Ok(())
}

async fn ping_command(cmd: PingCmd) -> Result<()> {
    let config = load_or_default(&cmd.config)?;
    let notifier = build_notifier(&config)?;

    notifier
        .notify(&cmd.message)
        .await
        .with_context(|| format!("Test message via {} failed", notifier.name()))?;

    println!("Test message delivered via {}", notifier.name());
    Ok(())
}

/// Load the config file, falling back to built-in defaults when it is absent
fn load_or_default(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::warn!(
            "Config file {} not found - using built-in defaults",
            path.display()
        );
        let config = Config::default();
        config.validate().context("Invalid default configuration")?;
        return Ok(config);
    }

    load_config(path).with_context(|| format!("Failed to load configuration from {}", path.display()))
}

fn build_source(config: &Config) -> Result<Arc<dyn PoolSource>> {
    let client = MeteoraClient::with_config(MeteoraConfig::from(config))
        .context("Failed to create Meteora client")?;
    tracing::debug!("Pool listing endpoint: {}", client.pairs_url());
    Ok(Arc::new(client))
}

fn build_notifier(config: &Config) -> Result<Arc<dyn Notifier>> {
    match config.telegram.resolve() {
        Some(telegram) => {
            let notifier = TelegramNotifier::new(telegram)
                .context("Failed to create Telegram notifier")?;
            tracing::info!("Telegram alerts enabled for chat {}", notifier.chat_id());
            Ok(Arc::new(notifier))
        }
        None => {
            if config.telegram.enabled {
                tracing::warn!(
                    "TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID not set - alerts will only be logged"
                );
            }
            Ok(Arc::new(LogNotifier))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_app_parse_run() {
        let args = vec!["listing-sentinel", "run", "--config", "custom.toml"];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Run(cmd) => {
                assert_eq!(cmd.config, PathBuf::from("custom.toml"));
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_default_config_path() {
        let args = vec!["listing-sentinel", "run"];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Run(cmd) => {
                assert_eq!(cmd.config, PathBuf::from("config/monitor.toml"));
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_app_parse_scan() {
        let args = vec!["listing-sentinel", "scan"];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Scan(cmd) => {
                assert_eq!(cmd.top, 20);
                assert_eq!(cmd.config, PathBuf::from("config/monitor.toml"));
            }
            _ => panic!("Expected Scan command"),
        }
    }

    #[test]
    fn test_cli_app_parse_scan_with_top() {
        let args = vec!["listing-sentinel", "scan", "--top", "5", "-c", "alt.toml"];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Scan(cmd) => {
                assert_eq!(cmd.top, 5);
                assert_eq!(cmd.config, PathBuf::from("alt.toml"));
            }
            _ => panic!("Expected Scan command"),
        }
    }

    #[test]
    fn test_cli_app_parse_ping() {
        let args = vec!["listing-sentinel", "ping", "--message", "hello"];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Ping(cmd) => assert_eq!(cmd.message, "hello"),
            _ => panic!("Expected Ping command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let args = vec!["listing-sentinel", "--debug", "scan"];
        let app = CliApp::try_parse_from(args).unwrap();
        assert!(app.debug);
        assert!(!app.quiet);

        let args = vec!["listing-sentinel", "run", "-q"];
        let app = CliApp::try_parse_from(args).unwrap();
        assert!(app.quiet);
    }

    #[test]
    fn test_debug_and_quiet_conflict() {
        let args = vec!["listing-sentinel", "--debug", "--quiet", "run"];
        assert!(CliApp::try_parse_from(args).is_err());
    }

    #[test]
    fn test_missing_subcommand_is_rejected() {
        let args = vec!["listing-sentinel"];
        assert!(CliApp::try_parse_from(args).is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.monitor.max_loops, 5);
    }

    #[test]
    fn test_load_or_default_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.toml");
        std::fs::write(&path, "[monitor]\nmin_volume = 1.0\n").unwrap();

        let config = load_or_default(&path).unwrap();
        assert_eq!(config.monitor.min_volume, 1.0);
    }

    #[test]
    fn test_load_or_default_reports_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.toml");
        std::fs::write(&path, "[monitor]\nmax_loops = 0\n").unwrap();

        assert!(load_or_default(&path).is_err());
    }

    #[test]
    fn test_build_notifier_falls_back_when_disabled() {
        let mut config = Config::default();
        config.telegram.enabled = false;

        let notifier = build_notifier(&config).unwrap();
        assert_eq!(notifier.name(), "log");
    }
}
