//! Error types for settings operations

use thiserror::Error;
use vini_store::StoreError;

/// Errors that can occur while reading or modifying settings
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The key resolves to an empty section or an empty flat key
    #[error("Invalid settings key: {0:?}")]
    InvalidKey(String),

    /// A group, section or rename target name is not usable
    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    /// An array scope is already open on the calling thread
    #[error("Array scope already active: {0}")]
    ArrayInProgress(String),

    /// The underlying flat store failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Resolving the settings location failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
