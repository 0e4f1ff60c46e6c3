//! One-shot installation of the shutdown signal handler.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;
use tracing::instrument::WithSubscriber;

use crate::config::ShutdownConfig;
use crate::error::SetupError;
use crate::logging::build_logger;
use crate::signals::{signal_channel, spawn_relay, OsSignals};
use crate::token::ShutdownToken;
use crate::watcher::Watcher;

/// Exit status used when shutdown is forced
pub const EXIT_STATUS: i32 = 1;

static GLOBAL: ShutdownCoordinator = ShutdownCoordinator::new();

/// Installs the SIGINT/SIGTERM handler at most once.
///
/// The application's composition root owns one coordinator (usually
/// [`ShutdownCoordinator::global`]) and calls [`setup`](Self::setup) during
/// startup. The first signal cancels the returned token. After that the
/// process is terminated with [`EXIT_STATUS`] as soon as either the grace
/// period elapses or a second signal arrives; with a zero grace period only a
/// second signal terminates it.
///
/// Setup spawns two tasks that live until process exit: a relay that
/// forwards OS signals into a two-slot channel, and the watcher that
/// cancels the token and forces the exit.
///
/// The forced exit calls [`std::process::exit`]: destructors and any
/// shutdown work still in progress elsewhere do not run. If the
/// application returns from `main` first, the exit never happens.
#[derive(Debug)]
pub struct ShutdownCoordinator {
    activated: AtomicBool,
}

impl ShutdownCoordinator {
    pub const fn new() -> Self {
        Self {
            activated: AtomicBool::new(false),
        }
    }

    /// The process-wide coordinator
    pub fn global() -> &'static ShutdownCoordinator {
        &GLOBAL
    }

    /// Claim this coordinator. Returns `true` for exactly one caller.
    pub fn try_activate(&self) -> bool {
        self.activated
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_activated(&self) -> bool {
        self.activated.load(Ordering::Acquire)
    }

    /// Register for SIGINT and SIGTERM and start the watcher task.
    ///
    /// Must be called from within a Tokio runtime. The activation claim is
    /// kept even if a later step fails, so a failed setup cannot be retried.
    pub fn setup(&self, config: &ShutdownConfig) -> Result<ShutdownToken, SetupError> {
        if !self.try_activate() {
            return Err(SetupError::AlreadyInitialized);
        }

        let logger = build_logger(&config.log_level, &config.log_format)?;

        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| SetupError::NoRuntime)?;
        let os_signals = OsSignals::register().map_err(SetupError::SignalRegistration)?;

        let cancel = CancellationToken::new();
        let (tx, rx) = signal_channel();
        let mut watcher = Watcher::new(rx, cancel.clone(), config.grace_period);

        spawn_relay(os_signals, tx, logger.clone());
        runtime.spawn(
            async move {
                let escalation = watcher.run().await;
                tracing::debug!(?escalation, status = EXIT_STATUS, "Forcing process exit");
                std::process::exit(EXIT_STATUS);
            }
            .with_subscriber(logger.clone()),
        );

        tracing::dispatcher::with_default(&logger, || {
            tracing::debug!(
                grace_period = ?config.grace_period,
                "Shutdown signal handler installed"
            );
        });

        Ok(ShutdownToken::new(cancel))
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Set up the process-wide coordinator. See [`ShutdownCoordinator::setup`].
pub fn setup_signal_handler(config: &ShutdownConfig) -> Result<ShutdownToken, SetupError> {
    ShutdownCoordinator::global().setup(config)
}
