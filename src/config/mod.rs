//! Runtime configuration for the cleaner.
//!
//! All settings come from environment variables so the binary can be dropped
//! into a cron job or a container without a config file. Command-line flags
//! are folded in by the entry point through the same lookup path, so every
//! value goes through one set of parsers.
//!
//! # Example
//!
//! ```ignore
//! use epgstation_cleaner::config::CleanerConfig;
//!
//! let config = CleanerConfig::from_env()?;
//! println!("retaining recordings for {:?}", config.retain_duration);
//! ```

pub mod duration;

use std::env::{self, VarError};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

pub use duration::{format_duration, parse_retain_duration};

/// Environment variable holding the EPGStation base URL.
pub const BASE_URL_ENV_VAR: &str = "EPGSTATION_BASE_URL";

/// Environment variable holding the retention threshold.
pub const RETAIN_DURATION_ENV_VAR: &str = "RETAIN_DURATION";

/// Legacy environment variable holding the retention threshold in hours.
pub const RETAIN_HOURS_ENV_VAR: &str = "RETAIN_HOURS";

/// Environment variable enabling dry-run mode.
pub const DRY_RUN_ENV_VAR: &str = "IS_DRY_RUN";

/// Environment variable selecting the log level.
pub const LOG_LEVEL_ENV_VAR: &str = "LOG_LEVEL";

/// Environment variable selecting the log output format.
pub const LOG_FORMAT_ENV_VAR: &str = "LOG_FORMAT";

/// Environment variable toggling TLS certificate verification.
pub const ACCEPT_INVALID_CERTS_ENV_VAR: &str = "ACCEPT_INVALID_CERTS";

/// Environment variable holding an optional per-request timeout.
pub const REQUEST_TIMEOUT_ENV_VAR: &str = "REQUEST_TIMEOUT";

/// Default EPGStation base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8888";

/// Default retention threshold (two weeks).
pub const DEFAULT_RETAIN_DURATION: Duration = Duration::from_secs(336 * 60 * 60);

/// Errors raised while loading configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The retention or timeout value could not be parsed.
    #[error("invalid duration {value:?}: {reason}")]
    InvalidDuration { value: String, reason: String },

    /// A boolean flag held something other than a recognised boolean.
    #[error("invalid boolean for {name}: {value:?}")]
    InvalidBool { name: String, value: String },

    /// Unknown log level.
    #[error("invalid log level {0:?} (expected ERROR, WARN, INFO or DEBUG)")]
    InvalidLogLevel(String),

    /// Unknown log format.
    #[error("invalid log format {0:?} (expected json, compact or pretty)")]
    InvalidLogFormat(String),

    /// An environment variable held bytes that are not valid UTF-8.
    #[error("{name} contains invalid UTF-8")]
    NotUnicode { name: String },

    /// The base URL is not an absolute http(s) URL.
    #[error("invalid base URL {value:?}: {reason}")]
    InvalidBaseUrl { value: String, reason: String },
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    /// Filter directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ERROR" => Ok(LogLevel::Error),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "INFO" => Ok(LogLevel::Info),
            "DEBUG" => Ok(LogLevel::Debug),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_filter().to_ascii_uppercase())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Single-line human readable output.
    Compact,
    /// Multi-line human readable output.
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "compact" | "text" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(ConfigError::InvalidLogFormat(s.to_string())),
        }
    }
}

/// Configuration for a single cleaner run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanerConfig {
    /// Base URL of the EPGStation server, without a trailing slash.
    pub base_url: String,

    /// Minimum age a recording must exceed before its TS files are removed.
    /// Default: 336 hours (14 days)
    pub retain_duration: Duration,

    /// Log intended deletions instead of performing them.
    pub dry_run: bool,

    /// Log verbosity.
    pub log_level: LogLevel,

    /// Log output format.
    pub log_format: LogFormat,

    /// Skip TLS certificate verification when talking to EPGStation.
    /// Default: true, since EPGStation is usually served with a self-signed
    /// certificate on the local network.
    pub accept_invalid_certs: bool,

    /// Per-request timeout. `None` keeps the HTTP client's default.
    pub request_timeout: Option<Duration>,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            retain_duration: DEFAULT_RETAIN_DURATION,
            dry_run: false,
            log_level: LogLevel::default(),
            log_format: LogFormat::default(),
            accept_invalid_certs: true,
            request_timeout: None,
        }
    }
}

impl CleanerConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build config from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::try_from_lookup(read_env)
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::try_from_lookup(|key| Ok(lookup(key)))
    }

    /// Build config from a key lookup that can itself fail.
    pub fn try_from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> ConfigResult<Option<String>>,
    {
        let get = |key: &str| -> ConfigResult<Option<String>> {
            Ok(lookup(key)?.filter(|value| !value.trim().is_empty()))
        };
        let mut config = Self::default();

        if let Some(url) = get(BASE_URL_ENV_VAR)? {
            config.base_url = normalize_base_url(&url)?;
        }

        if let Some(value) = get(RETAIN_DURATION_ENV_VAR)? {
            config.retain_duration = parse_retain_duration(&value)?;
        } else if let Some(value) = get(RETAIN_HOURS_ENV_VAR)? {
            config.retain_duration = parse_hours(&value)?;
        }

        if let Some(value) = get(DRY_RUN_ENV_VAR)? {
            config.dry_run = parse_bool(DRY_RUN_ENV_VAR, &value)?;
        }

        if let Some(value) = get(LOG_LEVEL_ENV_VAR)? {
            config.log_level = value.parse()?;
        }

        if let Some(value) = get(LOG_FORMAT_ENV_VAR)? {
            config.log_format = value.parse()?;
        }

        if let Some(value) = get(ACCEPT_INVALID_CERTS_ENV_VAR)? {
            config.accept_invalid_certs = parse_bool(ACCEPT_INVALID_CERTS_ENV_VAR, &value)?;
        }

        if let Some(value) = get(REQUEST_TIMEOUT_ENV_VAR)? {
            config.request_timeout = Some(parse_retain_duration(&value)?);
        }

        Ok(config)
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the retention threshold.
    pub fn with_retain_duration(mut self, duration: Duration) -> Self {
        self.retain_duration = duration;
        self
    }

    /// Enable or disable dry-run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Set the log format.
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }

    /// Set whether invalid TLS certificates are accepted.
    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

/// Read one environment variable, rejecting values that are not UTF-8.
pub fn read_env(key: &str) -> ConfigResult<Option<String>> {
    match env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode {
            name: key.to_string(),
        }),
    }
}

fn normalize_base_url(value: &str) -> ConfigResult<String> {
    let trimmed = value.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| ConfigError::InvalidBaseUrl {
        value: value.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(ConfigError::InvalidBaseUrl {
            value: value.to_string(),
            reason: format!("unsupported scheme {other:?}"),
        }),
    }
}

fn parse_hours(value: &str) -> ConfigResult<Duration> {
    let hours: u64 = value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidDuration {
            value: value.to_string(),
            reason: "expected a whole number of hours".to_string(),
        })?;

    hours
        .checked_mul(3600)
        .map(Duration::from_secs)
        .ok_or_else(|| ConfigError::InvalidDuration {
            value: value.to_string(),
            reason: "out of range".to_string(),
        })
}

/// Parse a boolean the way `IS_DRY_RUN=1` or `IS_DRY_RUN=True` are commonly written.
pub fn parse_bool(name: &str, value: &str) -> ConfigResult<bool> {
    match value.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" | "yes" | "on" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}
