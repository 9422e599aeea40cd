//! Symmetric encryption for values carrying the `Encrypted` marker.
//!
//! The codec treats the cipher as an opaque byte transform. With the
//! `crypto` feature (on by default) [`AesGcmCipher`] is available; it uses
//! AES-256-GCM with a random 96-bit nonce per message and lays the payload
//! out as `[nonce(12)][ciphertext][tag(16)]`.

use std::fmt;

/// Error raised by a [`Cipher`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CipherError {
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKey { expected: usize, actual: usize },

    #[error("key is not valid base64: {0}")]
    KeyEncoding(String),

    #[error("payload too short ({actual} bytes), expected at least {minimum}")]
    Truncated { actual: usize, minimum: usize },

    #[error("encryption failed")]
    Encrypt,

    /// Wrong key or tampered payload.
    #[error("authentication failed")]
    Authentication,
}

/// Reversible byte transform used by the value codec.
pub trait Cipher: fmt::Debug + Send + Sync {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError>;

    fn decrypt(&self, payload: &[u8]) -> Result<Vec<u8>, CipherError>;
}

#[cfg(feature = "crypto")]
pub use aes::AesGcmCipher;

#[cfg(feature = "crypto")]
mod aes {
    use std::fmt;

    use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
    use aes_gcm::{Aes256Gcm, Nonce};
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use zeroize::Zeroizing;

    use super::{Cipher, CipherError};

    const KEY_LEN: usize = 32;
    const NONCE_LEN: usize = 12;
    const TAG_LEN: usize = 16;

    /// AES-256-GCM cipher.
    ///
    /// The key schedule lives inside `aes-gcm`; key bytes handed to the
    /// constructors are never stored, and base64-decoded keys are zeroized.
    #[derive(Clone)]
    pub struct AesGcmCipher {
        inner: Aes256Gcm,
    }

    impl AesGcmCipher {
        /// Creates a cipher from a 32-byte key.
        pub fn new(key: &[u8]) -> Result<Self, CipherError> {
            let inner = Aes256Gcm::new_from_slice(key).map_err(|_| CipherError::InvalidKey {
                expected: KEY_LEN,
                actual: key.len(),
            })?;
            Ok(Self { inner })
        }

        /// Creates a cipher from a base64-encoded (standard alphabet) key.
        pub fn from_base64(key: &str) -> Result<Self, CipherError> {
            let bytes = Zeroizing::new(
                STANDARD
                    .decode(key.trim())
                    .map_err(|err| CipherError::KeyEncoding(err.to_string()))?,
            );
            Self::new(&bytes)
        }
    }

    impl fmt::Debug for AesGcmCipher {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("AesGcmCipher").finish_non_exhaustive()
        }
    }

    impl Cipher for AesGcmCipher {
        fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
            let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
            let sealed = self
                .inner
                .encrypt(&nonce, plaintext)
                .map_err(|_| CipherError::Encrypt)?;

            let mut payload = Vec::with_capacity(NONCE_LEN + sealed.len());
            payload.extend_from_slice(nonce.as_slice());
            payload.extend_from_slice(&sealed);
            Ok(payload)
        }

        fn decrypt(&self, payload: &[u8]) -> Result<Vec<u8>, CipherError> {
            if payload.len() < NONCE_LEN + TAG_LEN {
                return Err(CipherError::Truncated {
                    actual: payload.len(),
                    minimum: NONCE_LEN + TAG_LEN,
                });
            }
            let (nonce, sealed) = payload.split_at(NONCE_LEN);
            self.inner
                .decrypt(Nonce::from_slice(nonce), sealed)
                .map_err(|_| CipherError::Authentication)
        }
    }

}
