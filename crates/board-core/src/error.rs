//! Core error types.

use thiserror::Error;

/// Errors raised while loading or validating board configuration.
#[derive(Error, Debug)]
pub enum BoardError {
    /// Failed to read a configuration file.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// TOML configuration could not be parsed.
    #[error("Invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON configuration could not be parsed.
    #[error("Invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration value is out of range.
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
