//! sigdrain Core Components
//!
//! Turns the first SIGINT/SIGTERM delivered to the process into a
//! cancellation token the application can observe, and forces the process
//! to exit with status 1 once the configured grace period runs out or a
//! second signal arrives.

mod config;
mod coordinator;
mod error;
pub mod logging;
pub mod signals;
#[cfg(test)]
mod test_support;
mod token;
mod watcher;

pub use config::ShutdownConfig;
pub use coordinator::{setup_signal_handler, ShutdownCoordinator, EXIT_STATUS};
pub use error::SetupError;
pub use logging::{build_logger, LogFormat, LogLevel, LoggerError};
pub use signals::{SignalSource, TerminationSignal};
pub use token::ShutdownToken;
pub use watcher::{Escalation, Watcher, WatcherState};
