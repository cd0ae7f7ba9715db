//! Synchronization settings loaded from an optional JSON file.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

/// Default location on disk where the settings are looked up.
const DEFAULT_CONFIG_PATH: &str = "config/sync.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "MATCH_SYNC_CONFIG_PATH";

const DEFAULT_POLL_INTERVAL_MS: u64 = 4_000;
const DEFAULT_TARGET_MATCH_COUNT: usize = 20;
const DEFAULT_REFRESH_COOLDOWN_MS: u64 = 60_000;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Tuning knobs of the match history synchronization controller.
pub struct SyncConfig {
    /// Delay between two poll ticks while the history is incomplete.
    pub poll_interval: Duration,
    /// Number of matches after which polling stops.
    pub target_match_count: usize,
    /// Minimum delay between two accepted manual refreshes.
    pub refresh_cooldown: Duration,
    /// Transport timeout for a single backend request.
    pub request_timeout: Duration,
}

impl SyncConfig {
    /// Load the settings from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(config) => {
                    info!(
                        path = %path.display(),
                        poll_interval_ms = config.poll_interval.as_millis() as u64,
                        target = config.target_match_count,
                        "loaded sync settings from config"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "invalid sync config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse and validate a JSON document. Missing keys take their default value.
    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let raw = serde_json::from_str::<RawConfig>(contents)?;
        raw.validate()?;
        Ok(raw.into())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

/// Reasons a config document is rejected.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The document is not valid JSON for the settings shape.
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value is out of its allowed range.
    #[error("invalid config: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

#[derive(Debug, Deserialize, Validate)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[validate(range(min = 1))]
    poll_interval_ms: u64,
    #[validate(range(min = 1))]
    target_match_count: usize,
    #[validate(range(min = 1))]
    refresh_cooldown_ms: u64,
    #[validate(range(min = 1))]
    request_timeout_ms: u64,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            target_match_count: DEFAULT_TARGET_MATCH_COUNT,
            refresh_cooldown_ms: DEFAULT_REFRESH_COOLDOWN_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl From<RawConfig> for SyncConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(value.poll_interval_ms),
            target_match_count: value.target_match_count,
            refresh_cooldown: Duration::from_millis(value.refresh_cooldown_ms),
            request_timeout: Duration::from_millis(value.request_timeout_ms),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let config = SyncConfig::default();
        assert_eq!(config.poll_interval, Duration::from_millis(4_000));
        assert_eq!(config.target_match_count, 20);
        assert_eq!(config.refresh_cooldown, Duration::from_secs(60));
    }

    #[test]
    fn partial_documents_keep_defaults() {
        let config = SyncConfig::from_json(r#"{"target_match_count": 10}"#).unwrap();
        assert_eq!(config.target_match_count, 10);
        assert_eq!(config.poll_interval, Duration::from_millis(4_000));
    }

    #[test]
    fn zero_values_are_rejected() {
        let err = SyncConfig::from_json(r#"{"poll_interval_ms": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_documents_are_rejected() {
        let err = SyncConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
