//! Planner runtime configuration.
//!
//! # Responsibility
//! - Collect storage location and week/rollover policy in one value.
//! - Apply `DAYPLAN_*` environment overrides on top of defaults.
//!
//! # Invariants
//! - Blank override values fall back to defaults.
//! - Unrecognized override values are rejected, never guessed.

use crate::service::week_roller::{RolloverScope, WeekAnchor, DEFAULT_TICK_INTERVAL};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "DAYPLAN_DB_PATH";
pub const ENV_WEEK_ANCHOR: &str = "DAYPLAN_WEEK_ANCHOR";
pub const ENV_ROLLOVER_SCOPE: &str = "DAYPLAN_ROLLOVER_SCOPE";
pub const ENV_TICK_SECS: &str = "DAYPLAN_TICK_SECS";

const DEFAULT_DB_FILE_NAME: &str = "dayplan.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue {
                key,
                value,
                expected,
            } => write!(f, "invalid {key} `{value}`; expected {expected}"),
        }
    }
}

impl Error for ConfigError {}

/// Planner settings shared by FFI and CLI hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerConfig {
    pub db_path: PathBuf,
    pub week_anchor: WeekAnchor,
    pub rollover_scope: RolloverScope,
    pub tick_interval: Duration,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            week_anchor: WeekAnchor::default(),
            rollover_scope: RolloverScope::default(),
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

impl PlannerConfig {
    /// Defaults overridden by process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by values from `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(value) = read(ENV_WEEK_ANCHOR) {
            config.week_anchor = parse_week_anchor(&value)?;
        }
        if let Some(value) = read(ENV_ROLLOVER_SCOPE) {
            config.rollover_scope = parse_rollover_scope(&value)?;
        }
        if let Some(value) = read(ENV_TICK_SECS) {
            config.tick_interval = parse_tick_secs(&value)?;
        }

        Ok(config)
    }
}

fn parse_week_anchor(value: &str) -> Result<WeekAnchor, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "today" => Ok(WeekAnchor::Today),
        "monday" => Ok(WeekAnchor::Monday),
        _ => Err(ConfigError::InvalidValue {
            key: ENV_WEEK_ANCHOR,
            value: value.to_string(),
            expected: "today|monday",
        }),
    }
}

fn parse_rollover_scope(value: &str) -> Result<RolloverScope, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "previous_day" => Ok(RolloverScope::PreviousDay),
        "all_stale" => Ok(RolloverScope::AllStaleDays),
        _ => Err(ConfigError::InvalidValue {
            key: ENV_ROLLOVER_SCOPE,
            value: value.to_string(),
            expected: "previous_day|all_stale",
        }),
    }
}

fn parse_tick_secs(value: &str) -> Result<Duration, ConfigError> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidValue {
            key: ENV_TICK_SECS,
            value: value.to_string(),
            expected: "a positive number of seconds",
        }),
    }
}
