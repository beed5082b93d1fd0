//! Value encryption for vini settings stores
//!
//! This crate provides the codec applied to values as they cross the value
//! store boundary when a settings handle is opened with encryption enabled.
//!
//! # Components
//!
//! - **Key derivation**: MD5 digest of a passphrase yields the 128-bit key
//! - **Padding**: PKCS#7 up to the cipher block size
//! - **Encryption**: AES-128 in CBC mode with a zero IV
//! - **Text form**: standard base64 (`=` padded) so ciphertext fits in an INI value
//!
//! # Example
//!
//! ```
//! use vini_crypto::ValueCipher;
//!
//! let cipher = ValueCipher::default();
//! let stored = cipher.seal("hunter2");
//! assert_ne!(stored, "hunter2");
//! assert_eq!(cipher.open(&stored).unwrap(), "hunter2");
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod key;
pub mod value_cipher;

pub use error::CryptoError;
pub use key::{CipherKey, DEFAULT_PASSPHRASE, KEY_SIZE};
pub use value_cipher::{BLOCK_SIZE, ValueCipher};

/// Result type for crypto operations.
pub type Result<T> = std::result::Result<T, CryptoError>;
