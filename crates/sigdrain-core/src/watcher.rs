//! The watcher: waits for termination signals and escalates.
//!
//! ```text
//! Armed --first signal--> Cancelling --token cancelled--> GracePeriod
//!       --timer or second signal--> Terminating
//! ```
//!
//! [`Watcher::run`] stops at `Terminating` and reports why; the caller
//! is the one that exits the process.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::signals::TerminationSignal;

/// Where the watcher is in its shutdown sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    /// Waiting for the first signal
    Armed,
    /// First signal received, cancelling the token
    Cancelling,
    /// Token cancelled, waiting for the timer or a second signal
    GracePeriod,
    /// Nothing left to wait for; the process should exit
    Terminating,
}

/// Why the watcher decided to terminate the process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escalation {
    GracePeriodElapsed,
    SecondSignal(TerminationSignal),
}

pub struct Watcher {
    signals: mpsc::Receiver<TerminationSignal>,
    cancel: CancellationToken,
    grace_period: Duration,
    state: WatcherState,
}

impl Watcher {
    pub fn new(
        signals: mpsc::Receiver<TerminationSignal>,
        cancel: CancellationToken,
        grace_period: Duration,
    ) -> Self {
        Self {
            signals,
            cancel,
            grace_period,
            state: WatcherState::Armed,
        }
    }

    pub fn state(&self) -> WatcherState {
        self.state
    }

    /// Drive the state machine until termination is due.
    ///
    /// Never returns if no signal arrives, or if the grace period is zero and
    /// only one signal arrives.
    pub async fn run(&mut self) -> Escalation {
        let signal = self.next_signal().await;

        self.transition(WatcherState::Cancelling);
        tracing::info!(
            grace_period = ?self.grace_period,
            signal = %signal,
            "Signal received, shutting down"
        );
        self.cancel.cancel();

        self.transition(WatcherState::GracePeriod);
        let grace_period = self.grace_period;
        let escalation = if grace_period.is_zero() {
            Escalation::SecondSignal(self.next_signal().await)
        } else {
            tokio::select! {
                _ = tokio::time::sleep(grace_period) => Escalation::GracePeriodElapsed,
                signal = self.next_signal() => Escalation::SecondSignal(signal),
            }
        };

        match escalation {
            Escalation::GracePeriodElapsed => tracing::info!(
                grace_period = ?grace_period,
                "Graceful termination period has passed, exiting immediately"
            ),
            Escalation::SecondSignal(signal) => tracing::info!(
                signal = %signal,
                "Signal received during graceful shutdown, exiting immediately"
            ),
        }

        self.transition(WatcherState::Terminating);
        escalation
    }

    /// Next signal from the channel. If every sender is gone no signal can
    /// ever arrive, so this waits forever.
    async fn next_signal(&mut self) -> TerminationSignal {
        match self.signals.recv().await {
            Some(signal) => signal,
            None => std::future::pending().await,
        }
    }

    fn transition(&mut self, next: WatcherState) {
        tracing::debug!(from = ?self.state, to = ?next, "Shutdown watcher state change");
        self.state = next;
    }
}
