//! Configuration management for shared-state-store.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cli::Args;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend selection.
    pub backend: BackendSection,
    /// Performance logging.
    pub perf: PerfSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Backend configuration section.
///
/// A `redis_url` selects the networked backend; without one every store is
/// local to the process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSection {
    /// Connection target, e.g. `redis://127.0.0.1:6379/0`.
    pub redis_url: Option<String>,
}

/// Performance logging section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PerfSection {
    /// Report read/parse/write durations and payload sizes.
    pub enabled: bool,
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace) or a filter directive.
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("REDIS_URL") {
            if !url.is_empty() {
                self.backend.redis_url = Some(url);
            }
        }

        if crate::state::perf_log_enabled() {
            self.perf.enabled = true;
        }

        if let Ok(level) = std::env::var("SHARED_STATE_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(ref url) = args.redis_url {
            self.backend.redis_url = Some(url.clone());
        }

        if args.perf_log {
            self.perf.enabled = true;
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(ref path) = args.config {
            config = Config::from_file(path)?;
        }

        config.apply_env();
        config.apply_args(args);
        config.validate()?;

        Ok(config)
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref url) = self.backend.redis_url {
            crate::state::validate_url(url).map_err(|_| ConfigError::InvalidUrl(url.clone()))?;
        }
        Ok(())
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// Invalid backend url.
    InvalidUrl(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::InvalidUrl(url) => write!(f, "invalid redis url: {}", url),
        }
    }
}

impl std::error::Error for ConfigError {}
