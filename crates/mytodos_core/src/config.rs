//! Runtime configuration.
//!
//! # Responsibility
//! - Collect store, logging, loop, and feedback settings in one place.
//! - Read overrides from `MYTODOS_*` environment variables.
//!
//! # Invariants
//! - A config returned by `from_lookup` has a supported log level, an
//!   absolute log directory, and a non-zero tick interval.

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_DB_PATH: &str = "MYTODOS_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "MYTODOS_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "MYTODOS_LOG_DIR";
pub const ENV_TICK_MS: &str = "MYTODOS_TICK_MS";
pub const ENV_NOTIFICATION_TITLE: &str = "MYTODOS_NOTIFICATION_TITLE";

const DEFAULT_DB_FILE_NAME: &str = "mytodos.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "mytodos-logs";
const DEFAULT_TICK_MS: u64 = 1_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value, reason } => {
                write!(f, "invalid {key}=`{value}`: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

/// File logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// One of `trace|debug|info|warn|error`.
    pub level: String,
    /// Absolute directory for rolling log files.
    pub log_dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            log_dir: std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME),
        }
    }
}

/// User-facing message texts and popup durations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackConfig {
    pub notification_title: String,
    pub duplicate_warning: Duration,
    pub deadline_updated: Duration,
    pub reminder_fallback: Duration,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            notification_title: "Task Deadline".to_string(),
            duplicate_warning: Duration::from_millis(5_000),
            deadline_updated: Duration::from_millis(3_000),
            reminder_fallback: Duration::from_millis(6_000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoConfig {
    pub db_path: PathBuf,
    pub logging: LoggingConfig,
    /// Longest the event loop waits before checking reminders again.
    pub tick_interval: Duration,
    pub feedback: FeedbackConfig,
}

impl Default for TodoConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            logging: LoggingConfig::default(),
            tick_interval: Duration::from_millis(DEFAULT_TICK_MS),
            feedback: FeedbackConfig::default(),
        }
    }
}

impl TodoConfig {
    /// Builds configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from any key lookup, starting from defaults.
    ///
    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = get(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }

        if let Some(level) = get(ENV_LOG_LEVEL) {
            let normalized = normalize_level(&level).map_err(|err| ConfigError::InvalidValue {
                key: ENV_LOG_LEVEL,
                value: level.clone(),
                reason: err.to_string(),
            })?;
            config.logging.level = normalized.to_string();
        }

        if let Some(dir) = get(ENV_LOG_DIR) {
            if !Path::new(&dir).is_absolute() {
                return Err(ConfigError::InvalidValue {
                    key: ENV_LOG_DIR,
                    value: dir,
                    reason: "must be an absolute path".to_string(),
                });
            }
            config.logging.log_dir = PathBuf::from(dir);
        }

        if let Some(raw) = get(ENV_TICK_MS) {
            let millis = raw
                .parse::<u64>()
                .ok()
                .filter(|millis| *millis > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: ENV_TICK_MS,
                    value: raw.clone(),
                    reason: "expected a positive number of milliseconds".to_string(),
                })?;
            config.tick_interval = Duration::from_millis(millis);
        }

        if let Some(title) = get(ENV_NOTIFICATION_TITLE) {
            config.feedback.notification_title = title;
        }

        Ok(config)
    }
}
