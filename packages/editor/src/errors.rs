//! Error types for the editor

use std::path::PathBuf;
use thiserror::Error;
use vantage_layout::CompatError;

/// Failures at the storage boundary. The editor logs these and keeps going.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Could not decode stored page: {0}")]
    Decode(#[from] CompatError),

    #[error("Invalid page id: {0:?}")]
    InvalidPageId(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    Read {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    Parse {
        config_path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Editor task has shut down")]
    Closed,
}
