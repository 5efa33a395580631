//! Cryptographic layer for lsbhide.
//!
//! - PBKDF2-HMAC-SHA256 key stretching with a random 16-byte salt
//! - ChaCha20-Poly1305 authenticated encryption
//!
//! [`seal`] and [`open`] combine both into the embedded payload format:
//! `salt (16) || base64(nonce (12) || ciphertext || tag (16))`.

pub mod cipher;
pub mod kdf;

pub use cipher::{decrypt, encrypt, encrypt_with_rng, token_len, NONCE_SIZE, TAG_SIZE};
pub use kdf::{derive_key, derive_key_with_rng, DerivedKey, Salt, KEY_SIZE, PBKDF2_ITERATIONS, SALT_SIZE};

use rand::{CryptoRng, RngCore};
use thiserror::Error;

/// Errors that can occur during encryption or decryption.
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Authentication tag mismatch")]
    AuthenticationFailed,

    #[error("Invalid ciphertext: too short")]
    CiphertextTooShort,

    #[error("Payload shorter than the 16-byte salt: {0} bytes")]
    MissingSalt(usize),
}

/// Length of the payload [`seal`] produces for `plaintext_len` bytes.
pub fn payload_len(plaintext_len: usize) -> usize {
    SALT_SIZE + token_len(plaintext_len)
}

/// Encrypts `plaintext` with a key stretched from `secret` and returns
/// `salt || ciphertext`, drawing salt and nonce from `rng`.
pub fn seal<R: RngCore + CryptoRng>(
    plaintext: &[u8],
    secret: &str,
    rng: &mut R,
) -> Result<Vec<u8>, CryptoError> {
    let (key, salt) = derive_key_with_rng(secret, rng);
    let ciphertext = encrypt_with_rng(plaintext, &key, rng)?;

    let mut payload = Vec::with_capacity(SALT_SIZE + ciphertext.len());
    payload.extend_from_slice(&salt);
    payload.extend_from_slice(&ciphertext);
    Ok(payload)
}

/// Reverses [`seal`]: splits off the salt, re-derives the key and decrypts.
pub fn open(payload: &[u8], secret: &str) -> Result<Vec<u8>, CryptoError> {
    if payload.len() < SALT_SIZE {
        return Err(CryptoError::MissingSalt(payload.len()));
    }

    let (salt_bytes, ciphertext) = payload.split_at(SALT_SIZE);
    let mut salt = [0u8; SALT_SIZE];
    salt.copy_from_slice(salt_bytes);

    let (key, _) = derive_key(secret, Some(salt));
    decrypt(ciphertext, &key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn test_seal_open_roundtrip() {
        let payload = seal(b"hello", "pw123", &mut OsRng).unwrap();
        assert_eq!(payload.len(), payload_len(5));
        assert_eq!(payload_len(5), 60);

        let plaintext = open(&payload, "pw123").unwrap();
        assert_eq!(plaintext, b"hello");
    }

    #[test]
    fn test_open_wrong_secret() {
        let payload = seal(b"hello", "pw123", &mut OsRng).unwrap();
        assert!(matches!(
            open(&payload, "wrong"),
            Err(CryptoError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_open_missing_salt() {
        assert!(matches!(open(&[1, 2, 3], "pw"), Err(CryptoError::MissingSalt(3))));
    }
}
