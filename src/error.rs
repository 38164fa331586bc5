use thiserror::Error;

use crate::domain::{EventId, MarketId};

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("market not found: {0}")]
    MarketNotFound(MarketId),

    #[error("event not found: {0}")]
    EventNotFound(EventId),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connections did not drain within {grace_secs}s of shutdown")]
    ShutdownTimeout { grace_secs: u64 },
}

impl Error {
    /// True for the "referenced entity is absent" family.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::MarketNotFound(_) | Self::EventNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
