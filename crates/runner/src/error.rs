//! Error types for the runner crate

use std::path::PathBuf;
use thiserror::Error;

/// Configuration could not be loaded or is inconsistent
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid environment override {name}={value}")]
    Env { name: &'static str, value: String },

    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Harness start-up failures
///
/// Only start-up can fail; once agents run, failures are absorbed and logged.
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("No tickers configured and the service reported none")]
    NoTickers,

    #[error("Ticker discovery failed: {0}")]
    Discovery(String),
}
