//! Error types for configuration loading.

use thiserror::Error;

/// Errors that can occur while reading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An environment variable has an unusable value.
    #[error("invalid value for {name}: {message}")]
    InvalidValue {
        /// Name of the variable.
        name: String,
        /// What was wrong with it.
        message: String,
    },

    /// Failed to create a directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
