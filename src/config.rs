//! Service configuration loading and validation.
//!
//! Configuration is loaded from a TOML file (every section optional) and
//! then overridden from environment variables, so a bare deployment can run
//! from `.env` alone.

use serde::Deserialize;
use std::path::Path;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{ConfigError, Result};

/// Longest accepted idempotency window: one year.
const MAX_IDEMPOTENCY_TTL_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub idempotency: IdempotencyConfig,
}

/// HTTP listener and routing settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path segment after `/api/`.
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Free-form deployment label, logged at startup.
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Allowed CORS origins; `*` allows any.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    /// Load the demo sports and events at startup.
    #[serde(default = "default_true")]
    pub seed: bool,
    /// How long in-flight requests may drain after a shutdown signal.
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".into()
}

const fn default_port() -> u16 {
    3000
}

fn default_api_version() -> String {
    "v1".into()
}

fn default_environment() -> String {
    "development".into()
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

const fn default_true() -> bool {
    true
}

const fn default_shutdown_grace_secs() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_version: default_api_version(),
            environment: default_environment(),
            cors_origins: default_cors_origins(),
            seed: true,
            shutdown_grace_secs: default_shutdown_grace_secs(),
        }
    }
}

impl ServerConfig {
    /// `host:port` for the listener.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `json` or anything else for human-readable output.
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Initialize the tracing subscriber. `RUST_LOG` wins over `level`.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

/// Idempotent-write settings.
#[derive(Debug, Clone, Deserialize)]
pub struct IdempotencyConfig {
    /// How long a recorded outcome is replayed, in seconds.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Interval between sweeps of expired records, in seconds.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Reject keys that are not hyphenated UUIDs.
    #[serde(default)]
    pub require_uuid_keys: bool,
}

const fn default_ttl_secs() -> u64 {
    3600
}

const fn default_sweep_interval_secs() -> u64 {
    60
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            require_uuid_keys: false,
        }
    }
}

impl IdempotencyConfig {
    /// The replay window as a `chrono` duration.
    #[must_use]
    pub fn ttl(&self) -> chrono::Duration {
        // validate() caps ttl_secs well inside i64 range.
        chrono::Duration::seconds(self.ttl_secs.min(MAX_IDEMPOTENCY_TTL_SECS) as i64)
    }

    /// The sweep interval.
    #[must_use]
    pub const fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Config {
    /// Load from a TOML file, apply environment overrides and validate.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let mut config = Self::parse(&content)?;
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file means defaults.
    #[allow(clippy::result_large_err)]
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            return Self::load(path);
        }
        let mut config = Self::default();
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML without touching the environment.
    #[allow(clippy::result_large_err)]
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content).map_err(ConfigError::Parse)?)
    }

    /// Apply `PORT`, `HOST`, `API_VERSION`, `LOG_LEVEL`, `LOG_FORMAT` and
    /// `IDEMPOTENCY_EXPIRATION` (seconds) from `var`.
    #[allow(clippy::result_large_err)]
    pub fn apply_overrides<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = var("PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                field: "PORT",
                reason: format!("'{port}' is not a port number"),
            })?;
        }
        if let Some(host) = var("HOST") {
            self.server.host = host;
        }
        if let Some(version) = var("API_VERSION") {
            self.server.api_version = version;
        }
        if let Some(level) = var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Some(ttl) = var("IDEMPOTENCY_EXPIRATION") {
            self.idempotency.ttl_secs = ttl.parse().map_err(|_| ConfigError::InvalidValue {
                field: "IDEMPOTENCY_EXPIRATION",
                reason: format!("'{ttl}' is not a number of seconds"),
            })?;
        }
        Ok(())
    }

    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            return Err(ConfigError::MissingField { field: "host" }.into());
        }
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "port",
                reason: "must be non-zero".into(),
            }
            .into());
        }
        if self.server.api_version.is_empty() {
            return Err(ConfigError::MissingField {
                field: "api_version",
            }
            .into());
        }
        if self.idempotency.ttl_secs == 0 || self.idempotency.ttl_secs > MAX_IDEMPOTENCY_TTL_SECS {
            return Err(ConfigError::InvalidValue {
                field: "ttl_secs",
                reason: format!("must be between 1 and {MAX_IDEMPOTENCY_TTL_SECS}"),
            }
            .into());
        }
        if self.idempotency.sweep_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sweep_interval_secs",
                reason: "must be non-zero".into(),
            }
            .into());
        }
        Ok(())
    }

    /// Initialize logging from the `[logging]` section.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
