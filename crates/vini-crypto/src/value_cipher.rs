//! AES-128-CBC value sealing
//!
//! A sealed value is `base64(AES-128-CBC(pkcs7(utf8(text))))` with an
//! all-zero IV, so equal plaintexts seal to equal text.
//!
//! PKCS#7 always pads: an input that is already block aligned gains one whole
//! block, and every pad byte carries the pad length.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};

use crate::error::CryptoError;
use crate::key::CipherKey;

/// AES block size in bytes
pub const BLOCK_SIZE: usize = 16;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

const IV: [u8; BLOCK_SIZE] = [0u8; BLOCK_SIZE];

/// Encrypts and encodes values for storage
#[derive(Debug, Clone, Default)]
pub struct ValueCipher {
    key: CipherKey,
}

impl ValueCipher {
    /// Create a cipher with an explicit key
    pub const fn new(key: CipherKey) -> Self {
        Self { key }
    }

    /// Create a cipher whose key is derived from `passphrase`
    pub fn from_passphrase(passphrase: &[u8]) -> Self {
        Self::new(CipherKey::derive(passphrase))
    }

    /// Pad and encrypt raw bytes
    pub fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        let key = *self.key.as_bytes();
        Aes128CbcEnc::new(&key.into(), &IV.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext)
    }

    /// Decrypt and unpad raw bytes
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(CryptoError::InvalidLength {
                block: BLOCK_SIZE,
                actual: ciphertext.len(),
            });
        }

        let key = *self.key.as_bytes();
        Aes128CbcDec::new(&key.into(), &IV.into())
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| CryptoError::InvalidPadding)
    }

    /// Encrypt a value and encode it as printable text
    pub fn seal(&self, text: &str) -> String {
        STANDARD.encode(self.encrypt(text.as_bytes()))
    }

    /// Reverse [`ValueCipher::seal`]
    pub fn open(&self, stored: &str) -> Result<String, CryptoError> {
        let bytes = STANDARD.decode(stored.trim())?;
        let plain = self.decrypt(&bytes)?;
        Ok(String::from_utf8(plain)?)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use cipher::block_padding::NoPadding;
    use proptest::prelude::*;

    #[test]
    fn test_seal_open_round_trip() {
        let cipher = ValueCipher::default();
        let sealed = cipher.seal("hunter2");
        assert_ne!(sealed, "hunter2");
        assert_eq!(sealed.len() % 4, 0);
        assert_eq!(cipher.open(&sealed).expect("sealed value should open"), "hunter2");
    }

    #[test]
    fn test_ciphertext_is_block_aligned() {
        let cipher = ValueCipher::default();
        assert_eq!(cipher.encrypt(b"").len(), 16);
        assert_eq!(cipher.encrypt(&[0u8; 15]).len(), 16);
        assert_eq!(cipher.encrypt(&[0u8; 16]).len(), 32);
    }

    #[test]
    fn test_pkcs7_pad_bytes() {
        let cipher = ValueCipher::default();
        let key = *cipher.key.as_bytes();
        let sealed = cipher.encrypt(b"hunter2");
        let raw = Aes128CbcDec::new(&key.into(), &IV.into())
            .decrypt_padded_vec_mut::<NoPadding>(&sealed)
            .unwrap();
        assert_eq!(&raw[..7], b"hunter2");
        assert!(raw[7..].iter().all(|&b| b == 9));
    }

    #[test]
    fn test_decrypt_rejects_bad_padding() {
        let cipher = ValueCipher::default();
        let key = *cipher.key.as_bytes();
        let mut block = [0u8; BLOCK_SIZE];
        block[15] = 17;
        let forged = Aes128CbcEnc::new(&key.into(), &IV.into())
            .encrypt_padded_vec_mut::<NoPadding>(&block);
        assert!(matches!(
            cipher.decrypt(&forged),
            Err(CryptoError::InvalidPadding)
        ));
    }

    #[test]
    fn test_sealing_is_deterministic() {
        let cipher = ValueCipher::default();
        assert_eq!(cipher.seal("same"), cipher.seal("same"));
    }

    #[test]
    fn test_different_keys_produce_different_output() {
        let a = ValueCipher::from_passphrase(b"alpha");
        let b = ValueCipher::from_passphrase(b"beta");
        let sealed = a.seal("payload");
        assert_ne!(sealed, b.seal("payload"));
        assert!(b.open(&sealed).is_err() || b.open(&sealed).unwrap() != "payload");
    }

    #[test]
    fn test_open_rejects_plain_text() {
        let cipher = ValueCipher::default();
        assert!(matches!(
            cipher.open("not base64!"),
            Err(CryptoError::Base64(_))
        ));
        // Valid base64 but not a whole block
        assert!(matches!(
            cipher.open("aGVsbG8="),
            Err(CryptoError::InvalidLength { .. })
        ));
        assert!(cipher.open("").is_err());
    }

    proptest! {
        #[test]
        fn decrypt_inverts_encrypt(data in prop::collection::vec(any::<u8>(), 0..256)) {
            let cipher = ValueCipher::default();
            let sealed = cipher.encrypt(&data);
            prop_assert_eq!(cipher.decrypt(&sealed).unwrap(), data);
        }

        #[test]
        fn open_inverts_seal(text in "\\PC{0,64}") {
            let cipher = ValueCipher::from_passphrase(b"proptest");
            prop_assert_eq!(cipher.open(&cipher.seal(&text)).unwrap(), text);
        }
    }
}
