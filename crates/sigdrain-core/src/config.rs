//! Configuration for the shutdown coordinator.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Shutdown configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShutdownConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// How long to wait after the first signal before forcing exit.
    /// Zero disables the timer: only a second signal forces exit.
    #[serde(default, rename = "grace_period_ms", with = "duration_ms")]
    pub grace_period: Duration,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".sigdrain")
        .join("config.yaml")
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            grace_period: Duration::ZERO,
        }
    }
}

impl ShutdownConfig {
    /// Location of the configuration file: `~/.sigdrain/config.yaml`
    pub fn default_path() -> PathBuf {
        default_config_path()
    }

    /// Load configuration from the default location, falling back to defaults
    pub fn load() -> Self {
        match Self::try_load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config file: {}", e);
                Self::default()
            }
        }
    }

    /// Load configuration from the default location.
    ///
    /// A missing file yields the defaults; an unreadable or malformed one is
    /// an error.
    pub fn try_load() -> Result<Self, std::io::Error> {
        Self::load_or_default(&default_config_path())
    }

    fn load_or_default(path: &Path) -> Result<Self, std::io::Error> {
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }
}

/// Durations are stored as whole milliseconds on disk.
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ShutdownConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, "text");
        assert!(config.grace_period.is_zero());
    }

    #[test]
    fn test_config_serialization() {
        let config = ShutdownConfig::default().with_grace_period(Duration::from_millis(2500));
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"grace_period_ms\":2500"));
        let parsed: ShutdownConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_load_from_partial_yaml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "log_format: json\ngrace_period_ms: 10000\n").unwrap();

        let config = ShutdownConfig::load_from(&path).unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, "json");
        assert_eq!(config.grace_period, Duration::from_secs(10));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("absent.yaml");

        let config = ShutdownConfig::load_or_default(&path).unwrap();
        assert_eq!(config, ShutdownConfig::default());
    }

    #[test]
    fn test_malformed_file_is_not_replaced_by_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "grace_period_ms: soon\n").unwrap();

        let err = ShutdownConfig::load_or_default(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_load_from_invalid_yaml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "grace_period_ms: soon\n").unwrap();

        let err = ShutdownConfig::load_from(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
