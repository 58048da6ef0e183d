//! Error types
//!
//! Malformed markup is never an error; these cover the file and config
//! boundaries only.

use std::path::PathBuf;
use thiserror::Error;

/// A component file or fragment could not be read.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The file could not be opened or read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid UTF-8.
    #[error("{path} is not valid UTF-8")]
    Encoding { path: PathBuf },

    /// No fragment is registered under this path.
    #[error("no template available for {path}")]
    Missing { path: PathBuf },
}

impl ReadError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ReadError::Io { path, .. } | ReadError::Encoding { path } | ReadError::Missing { path } => path,
        }
    }
}

/// Classifier configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
