//! Error types.
//!
//! The decision layer is total and never fails; only loading configuration
//! from outside the process can.

use thiserror::Error;

/// Result type alias using [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid JSON for [`crate::config::SimConfig`].
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A parameter is out of its valid range.
    #[error("Invalid config parameter '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}
