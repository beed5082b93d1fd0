//! Error types for value encryption

use thiserror::Error;

/// Errors that can occur while opening a sealed value
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Ciphertext length is not a positive multiple of the block size
    #[error("Invalid ciphertext length: expected a multiple of {block}, got {actual}")]
    InvalidLength {
        /// Cipher block size in bytes
        block: usize,
        /// Actual ciphertext length in bytes
        actual: usize,
    },

    /// Trailing padding bytes are inconsistent
    #[error("Invalid padding")]
    InvalidPadding,

    /// Stored text is not valid base64
    #[error("Base64 decode failed: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Decrypted bytes are not valid UTF-8
    #[error("Decrypted value is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
