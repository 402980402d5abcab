//! Library error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Fatal errors returned by the simulator.
///
/// Physical limit violations are never errors: they are clamped and surfaced
/// as [`crate::sim::advisory::Advisory`] values instead.
#[derive(Debug, Error)]
pub enum Error {
    /// An argument was rejected before any simulation step ran.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Scenario configuration is malformed or inconsistent.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An input series file could not be read or parsed.
    #[error("failed to read series from \"{}\": {message}", path.display())]
    Series { path: PathBuf, message: String },
}

impl Error {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
