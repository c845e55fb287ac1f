//! Environment-driven configuration.
//!
//! # Responsibility
//! - Resolve logging, routing and paging settings from `LAUNCHDECK_*`
//!   environment variables.
//!
//! # Invariants
//! - Blank variables are treated as unset.
//! - Paths used for logging must be absolute.

use crate::logging::{default_log_level, normalize_level};
use crate::router::{PageRequest, Router, DEFAULT_API_BASE};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_LOG_LEVEL: &str = "LAUNCHDECK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "LAUNCHDECK_LOG_DIR";
pub const ENV_API_BASE: &str = "LAUNCHDECK_API_BASE";
pub const ENV_FIXTURE_DIR: &str = "LAUNCHDECK_FIXTURE_DIR";
pub const ENV_PAGE_LIMIT: &str = "LAUNCHDECK_PAGE_LIMIT";
pub const ENV_PAGE_OFFSET: &str = "LAUNCHDECK_PAGE_OFFSET";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLogLevel(String),
    InvalidNumber { key: &'static str, value: String },
    RelativePath { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
            Self::InvalidNumber { key, value } => {
                write!(f, "{key} must be a non-negative integer, got `{value}`")
            }
            Self::RelativePath { key, value } => {
                write!(f, "{key} must be an absolute path, got `{value}`")
            }
        }
    }
}

impl Error for ConfigError {}

/// Resolved core settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub log_level: &'static str,
    /// File logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    pub api_base: String,
    pub fixture_dir: Option<PathBuf>,
    pub page: PageRequest,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_dir: None,
            api_base: DEFAULT_API_BASE.to_string(),
            fixture_dir: None,
            page: PageRequest::default(),
        }
    }
}

impl CoreConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();

        if let Some(level) = read(ENV_LOG_LEVEL) {
            config = config.with_log_level(&level)?;
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            config = config.with_log_dir(dir)?;
        }
        if let Some(base) = read(ENV_API_BASE) {
            config.api_base = base;
        }
        config.fixture_dir = read(ENV_FIXTURE_DIR).map(PathBuf::from);
        config.page = PageRequest::new(
            parse_u32(ENV_PAGE_LIMIT, read(ENV_PAGE_LIMIT))?,
            parse_u32(ENV_PAGE_OFFSET, read(ENV_PAGE_OFFSET))?,
        );

        Ok(config)
    }

    /// Overrides the log level after validating it.
    pub fn with_log_level(mut self, level: &str) -> Result<Self, ConfigError> {
        self.log_level = normalize_level(level).map_err(ConfigError::InvalidLogLevel)?;
        Ok(self)
    }

    /// Overrides the log directory; it must be absolute.
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let dir = dir.into();
        if !dir.is_absolute() {
            return Err(ConfigError::RelativePath {
                key: ENV_LOG_DIR,
                value: dir.display().to_string(),
            });
        }
        self.log_dir = Some(dir);
        Ok(self)
    }

    /// Router targeting the configured API base.
    pub fn router(&self) -> Router {
        Router::new(self.api_base.as_str())
    }
}

fn parse_u32(key: &'static str, value: Option<String>) -> Result<Option<u32>, ConfigError> {
    value
        .map(|raw| {
            raw.parse::<u32>()
                .map_err(|_| ConfigError::InvalidNumber { key, value: raw })
        })
        .transpose()
}
