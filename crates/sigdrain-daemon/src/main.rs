//! sigdrain Daemon
//!
//! Long-running reference service whose shutdown is driven by the
//! sigdrain coordinator.

mod daemon;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use sigdrain_core::{build_logger, ShutdownConfig};

pub use daemon::Daemon;

#[derive(Parser, Debug)]
#[command(name = "sigdrain-daemon")]
#[command(about = "Service process that drains on SIGINT/SIGTERM")]
#[command(version)]
struct Cli {
    /// YAML configuration file (default: ~/.sigdrain/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (text, json)
    #[arg(long)]
    log_format: Option<String>,

    /// Time allowed for shutdown after the first signal; 0 waits for a second signal
    #[arg(long)]
    grace_period_ms: Option<u64>,

    /// Time the service spends draining once shutdown starts
    #[arg(long, default_value_t = 30_000)]
    drain_ms: u64,

    /// Interval between worker heartbeats
    #[arg(long, default_value_t = 500)]
    heartbeat_ms: u64,
}

impl Cli {
    fn shutdown_config(&self) -> Result<ShutdownConfig> {
        // No logger is installed yet: a bad config file fails startup.
        let mut config = match &self.config {
            Some(path) => ShutdownConfig::load_from(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => ShutdownConfig::try_load().with_context(|| {
                format!(
                    "Failed to load config from {}",
                    ShutdownConfig::default_path().display()
                )
            })?,
        };

        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.log_format = format.clone();
        }
        if let Some(ms) = self.grace_period_ms {
            config.grace_period = Duration::from_millis(ms);
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.shutdown_config()?;

    // Initialize logging
    let dispatch = build_logger(&config.log_level, &config.log_format)
        .context("Failed to build logger")?;
    tracing::dispatcher::set_global_default(dispatch)
        .context("Failed to install logger")?;

    tracing::info!("Starting sigdrain daemon v{}", env!("CARGO_PKG_VERSION"));

    let daemon = Daemon::new(
        config,
        Duration::from_millis(cli.drain_ms),
        Duration::from_millis(cli.heartbeat_ms),
    );

    // Run async runtime
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(daemon.run())
}
