//! Termination signals and the channel they are delivered through.

use std::fmt;
use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::instrument::WithSubscriber;
use tracing::Dispatch;

/// Capacity of the signal channel. Two slots keep a tight burst of
/// signals from being coalesced before the watcher reads them.
pub const SIGNAL_BUFFER: usize = 2;

/// A request from the OS to stop the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationSignal {
    /// SIGINT (Ctrl+C)
    Interrupt,
    /// SIGTERM
    Terminate,
}

impl TerminationSignal {
    pub fn name(self) -> &'static str {
        match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
        }
    }
}

impl fmt::Display for TerminationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Create the bounded channel between signal delivery and the watcher
pub fn signal_channel() -> (
    mpsc::Sender<TerminationSignal>,
    mpsc::Receiver<TerminationSignal>,
) {
    mpsc::channel(SIGNAL_BUFFER)
}

/// Anything that yields termination signals until it is exhausted
pub trait SignalSource: Send + 'static {
    /// Wait for the next signal. `None` means no more will arrive.
    fn recv(&mut self) -> impl Future<Output = Option<TerminationSignal>> + Send;
}

impl SignalSource for mpsc::Receiver<TerminationSignal> {
    fn recv(&mut self) -> impl Future<Output = Option<TerminationSignal>> + Send {
        mpsc::Receiver::recv(self)
    }
}

/// OS-level registrations for SIGINT and SIGTERM
#[cfg(unix)]
pub struct OsSignals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl OsSignals {
    /// Register both handlers. Must run inside a Tokio runtime.
    ///
    /// Deliveries are recorded from this point on, even before the
    /// first call to [`OsSignals::recv`].
    pub fn register() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

}

/// `None` once the signal driver is gone.
#[cfg(unix)]
impl SignalSource for OsSignals {
    fn recv(&mut self) -> impl Future<Output = Option<TerminationSignal>> + Send {
        async move {
            tokio::select! {
                Some(()) = self.interrupt.recv() => Some(TerminationSignal::Interrupt),
                Some(()) = self.terminate.recv() => Some(TerminationSignal::Terminate),
                else => None,
            }
        }
    }
}

/// On non-Unix platforms only Ctrl+C is observable
#[cfg(not(unix))]
pub struct OsSignals {
    _private: (),
}

#[cfg(not(unix))]
impl OsSignals {
    pub fn register() -> std::io::Result<Self> {
        Ok(Self { _private: () })
    }
}

#[cfg(not(unix))]
impl SignalSource for OsSignals {
    fn recv(&mut self) -> impl Future<Output = Option<TerminationSignal>> + Send {
        async {
            tokio::signal::ctrl_c()
                .await
                .ok()
                .map(|()| TerminationSignal::Interrupt)
        }
    }
}

/// Forward deliveries into the signal channel without blocking, logging
/// through `logger`.
///
/// When both slots are taken the extra signal is dropped; the watcher
/// only ever needs two. The relay ends when the source is exhausted or the
/// watcher is gone.
pub fn spawn_relay<S: SignalSource>(
    mut source: S,
    tx: mpsc::Sender<TerminationSignal>,
    logger: Dispatch,
) -> JoinHandle<()> {
    tokio::spawn(
        async move {
            while let Some(signal) = source.recv().await {
                match tx.try_send(signal) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(signal)) => {
                        tracing::debug!(%signal, "Signal channel full, dropping signal");
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => break,
                }
            }
        }
        .with_subscriber(logger),
    )
}
