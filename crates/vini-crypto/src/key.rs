//! Symmetric key derivation

use md5::{Digest, Md5};
use std::fmt;

/// Size of the AES-128 key in bytes
pub const KEY_SIZE: usize = 16;

/// Built-in passphrase used when a handle does not configure its own
pub const DEFAULT_PASSPHRASE: [u8; 16] = [
    0xab, 0xbc, 0xcd, 0xde, 0xac, 0xf0, 0xff, 0xbd, 0x20, 0x1d, 0x7d, 0x6b, 0x9d, 0x3d, 0x4d, 0xb0,
];

/// 128-bit key used by [`crate::ValueCipher`]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CipherKey([u8; KEY_SIZE]);

impl CipherKey {
    /// Create a key from raw bytes
    pub const fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Derive a key by computing the MD5 digest of a passphrase
    pub fn derive(passphrase: &[u8]) -> Self {
        let mut hasher = Md5::new();
        hasher.update(passphrase);
        let result = hasher.finalize();
        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(&result);
        Self(bytes)
    }

    /// Get raw bytes
    pub const fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl Default for CipherKey {
    fn default() -> Self {
        Self::derive(&DEFAULT_PASSPHRASE)
    }
}

// Key material stays out of logs.
impl fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CipherKey(..)")
    }
}
