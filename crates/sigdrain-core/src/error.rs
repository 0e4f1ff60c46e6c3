//! Setup error types for sigdrain.

use thiserror::Error;

use crate::logging::LoggerError;

/// Errors that can occur while setting up the shutdown coordinator
#[derive(Debug, Error)]
pub enum SetupError {
    /// The coordinator has already been activated in this process
    #[error("signal handler can only be set up once")]
    AlreadyInitialized,

    /// Logger could not be built from the configured level/format
    #[error(transparent)]
    Logger(#[from] LoggerError),

    /// Setup was called outside of a Tokio runtime
    #[error("signal handler must be set up from within a Tokio runtime")]
    NoRuntime,

    /// The OS refused to register a termination signal handler
    #[error("Failed to register signal handler: {0}")]
    SignalRegistration(#[source] std::io::Error),
}
