//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while reading or validating deployment configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required field [{0}]")]
    MissingField(&'static str),

    #[error("source bundle not found: {}", .0.display())]
    BundleNotFound(PathBuf),

    #[error("source bundle path has no usable file name: {}", .0.display())]
    InvalidBundlePath(PathBuf),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
