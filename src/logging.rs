//! Tracing subscriber bootstrap.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter `{directive}`: {message}")]
    InvalidFilter { directive: String, message: String },

    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialized,
}

impl LoggingError {
    #[must_use]
    pub fn invalid_filter(directive: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::InvalidFilter {
            directive: directive.into(),
            message: error.to_string(),
        }
    }
}

/// Builds the filter for `directive`, e.g. `info` or `chat_client=debug,warn`.
pub fn filter(directive: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(directive).map_err(|error| LoggingError::invalid_filter(directive, error))
}

/// Installs a formatted subscriber on stderr. Stdout is left for transcript output.
pub fn init(directive: &str) -> Result<(), LoggingError> {
    tracing_subscriber::fmt()
        .with_env_filter(filter(directive)?)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)
}
