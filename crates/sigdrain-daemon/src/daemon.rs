//! Daemon lifecycle management.

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use sigdrain_core::{setup_signal_handler, ShutdownConfig, ShutdownToken};

/// Line printed on stdout once the signal handler is installed
pub const READY_LINE: &str = "ready";

/// The main daemon process
pub struct Daemon {
    config: ShutdownConfig,
    drain: Duration,
    heartbeat: Duration,
}

impl Daemon {
    pub fn new(config: ShutdownConfig, drain: Duration, heartbeat: Duration) -> Self {
        Self {
            config,
            drain,
            heartbeat,
        }
    }

    /// Run until shutdown completes or the coordinator forces exit
    pub async fn run(&self) -> Result<()> {
        let shutdown =
            setup_signal_handler(&self.config).context("Failed to set up signal handler")?;

        tracing::info!(
            grace_period = ?self.config.grace_period,
            drain = ?self.drain,
            "Daemon starting"
        );

        {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", READY_LINE)?;
            stdout.flush()?;
        }

        let worker = tokio::spawn(heartbeat_loop(shutdown.clone(), self.heartbeat));

        shutdown.cancelled().await;
        tracing::info!("Shutdown requested, draining");

        worker.await.context("Heartbeat worker panicked")?;
        self.drain().await;

        tracing::info!("Shutdown complete");
        Ok(())
    }

    /// Stand-in for flushing state and closing connections
    async fn drain(&self) {
        tokio::time::sleep(self.drain).await;
        tracing::info!(elapsed = ?self.drain, "Drain finished");
    }
}

async fn heartbeat_loop(shutdown: ShutdownToken, every: Duration) {
    let mut ticks: u64 = 0;
    let mut interval = tokio::time::interval(every.max(Duration::from_millis(1)));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                ticks += 1;
                tracing::debug!(ticks, "Heartbeat");
            }
            _ = shutdown.cancelled() => {
                tracing::debug!(ticks, "Heartbeat worker stopping");
                break;
            }
        }
    }
}
