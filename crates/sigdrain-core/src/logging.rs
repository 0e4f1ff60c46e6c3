//! Logger construction from a textual level and format.
//!
//! The coordinator builds its own [`Dispatch`] so the watcher task logs with
//! the configured settings regardless of what the application installs
//! globally.

use std::io::IsTerminal;
use std::str::FromStr;

use thiserror::Error;
use tracing::Dispatch;
use tracing_subscriber::filter::LevelFilter;

/// Errors returned when a logger cannot be built
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoggerError {
    #[error("invalid log level {0:?} (expected trace, debug, info, warn or error)")]
    InvalidLevel(String),

    #[error("invalid log format {0:?} (expected text or json)")]
    InvalidFormat(String),
}

/// Minimum level a logger emits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(LoggerError::InvalidLevel(s.to_string())),
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "console" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(LoggerError::InvalidFormat(s.to_string())),
        }
    }
}

/// Build a stderr logger from textual level and format settings
pub fn build_logger(level: &str, format: &str) -> Result<Dispatch, LoggerError> {
    let level: LogLevel = level.parse()?;
    let format: LogFormat = format.parse()?;

    let builder = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::from(level))
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);

    let dispatch = match format {
        LogFormat::Text => Dispatch::new(builder.finish()),
        LogFormat::Json => Dispatch::new(builder.json().finish()),
    };

    Ok(dispatch)
}
