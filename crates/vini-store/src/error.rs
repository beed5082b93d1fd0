//! Error types for flat store operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while accessing a flat store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to read the backing file
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Path of the backing file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the backing file
    #[error("Failed to write {path}: {source}")]
    Write {
        /// Path of the backing file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Section or key name cannot be stored
    #[error("Invalid section or key name: {0}")]
    InvalidName(String),
}
