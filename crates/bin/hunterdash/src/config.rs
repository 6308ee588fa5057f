//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `hunterdash.toml` in the working directory (or the path in
//! `HUNTERDASH_CONFIG`). Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use std::time::Duration;

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use hunterdash_adapter_http_reqwest::Config as HttpConfig;
use hunterdash_app::dashboard::{DashboardConfig, FailureMode};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend connection settings.
    pub backend: BackendConfig,
    /// Dashboard view settings.
    pub dashboard: DashboardSettings,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Where the job-hunter API lives and how to talk to it.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Backend origin, e.g. `http://localhost:8080`.
    pub base_url: String,
    /// Bearer token for the admin API.
    pub access_token: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// Dashboard behaviour.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    /// `silent` hides loading and errors, `surface` shows them.
    pub failure_mode: FailureMode,
    /// Count-up animation length in milliseconds.
    pub animation_ms: u64,
    /// Number of animation frames drawn in the terminal.
    pub frames: u32,
    /// How long to wait for both fetches before printing the last known totals.
    pub settle_timeout_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `hunterdash.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, if an
    /// override does not parse, or if the resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let path = lookup("HUNTERDASH_CONFIG").unwrap_or_else(|| "hunterdash.toml".to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    /// Apply overrides read through `lookup` (the process environment in
    /// [`Config::load`]). `RUST_LOG` wins over `HUNTERDASH_LOG`.
    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = lookup("HUNTERDASH_BACKEND_URL") {
            self.backend.base_url = val;
        }
        if let Some(val) = lookup("HUNTERDASH_ACCESS_TOKEN") {
            self.backend.access_token = Some(val).filter(|token| !token.is_empty());
        }
        if let Some(val) = lookup("HUNTERDASH_TIMEOUT_SECS") {
            self.backend.timeout_secs = val.trim().parse().map_err(|_| {
                ConfigError::Validation(format!(
                    "HUNTERDASH_TIMEOUT_SECS: `{val}` is not a number"
                ))
            })?;
        }
        if let Some(val) = lookup("HUNTERDASH_FAILURE_MODE") {
            self.dashboard.failure_mode = val.parse().map_err(|err| {
                ConfigError::Validation(format!("HUNTERDASH_FAILURE_MODE: {err}"))
            })?;
        }
        if let Some(val) = lookup("HUNTERDASH_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.base_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "backend.base_url must not be empty".to_string(),
            ));
        }
        if self.backend.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "backend.timeout_secs must be non-zero".to_string(),
            ));
        }
        if self.dashboard.settle_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "dashboard.settle_timeout_secs must be non-zero".to_string(),
            ));
        }
        if let Err(err) = EnvFilter::try_new(&self.logging.filter) {
            return Err(ConfigError::Validation(format!(
                "logging.filter `{}`: {err}",
                self.logging.filter
            )));
        }
        Ok(())
    }

    /// Settings for the HTTP adapter.
    #[must_use]
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig {
            base_url: self.backend.base_url.clone(),
            access_token: self.backend.access_token.clone(),
            timeout: Duration::from_secs(self.backend.timeout_secs),
        }
    }

    /// Settings for the dashboard view.
    #[must_use]
    pub fn dashboard_config(&self) -> DashboardConfig {
        DashboardConfig {
            failure_mode: self.dashboard.failure_mode,
            animation: Duration::from_millis(self.dashboard.animation_ms),
        }
    }

    /// Upper bound on waiting for the mount fetches.
    #[must_use]
    pub fn settle_timeout(&self) -> Duration {
        Duration::from_secs(self.dashboard.settle_timeout_secs)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            access_token: None,
            timeout_secs: 10,
        }
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            failure_mode: FailureMode::Silent,
            animation_ms: 2_000,
            frames: 20,
            settle_timeout_secs: 15,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "hunterdash=info,hunterdash_app=info,hunterdash_adapter_http_reqwest=info"
                .to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
