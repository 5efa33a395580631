//! Authenticated encryption of the hidden payload.
//!
//! ChaCha20-Poly1305 with a random 96-bit nonce. The output is a
//! self-verifying text token: base64 of nonce (12 bytes) || ciphertext ||
//! tag (16 bytes). Keeping the token in the base64 alphabet means its last
//! byte can never be `0xAA`, which would otherwise run into the end
//! delimiter.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use super::kdf::DerivedKey;
use super::CryptoError;

/// Nonce size for ChaCha20Poly1305.
pub const NONCE_SIZE: usize = 12;

/// Poly1305 authentication tag size.
pub const TAG_SIZE: usize = 16;

/// Length of the token [`encrypt`] produces for a plaintext of `len` bytes.
pub fn token_len(len: usize) -> usize {
    (NONCE_SIZE + len + TAG_SIZE).div_ceil(3) * 4
}

/// Encrypts `plaintext` under `key` with a nonce from the OS RNG.
pub fn encrypt(plaintext: &[u8], key: &DerivedKey) -> Result<Vec<u8>, CryptoError> {
    encrypt_with_rng(plaintext, key, &mut OsRng)
}

/// Encrypts `plaintext` under `key` with a nonce drawn from `rng`.
pub fn encrypt_with_rng<R: RngCore + CryptoRng>(
    plaintext: &[u8],
    key: &DerivedKey,
    rng: &mut R,
) -> Result<Vec<u8>, CryptoError> {
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let cipher = ChaCha20Poly1305::new_from_slice(key.as_bytes())
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    sealed.extend_from_slice(&nonce_bytes);
    sealed.extend_from_slice(&ciphertext);

    Ok(BASE64.encode(sealed).into_bytes())
}

/// Decrypts a token produced by [`encrypt`].
///
/// Fails with [`CryptoError::AuthenticationFailed`] if the tag does not
/// verify, which is what a wrong password looks like. A token that is not
/// valid base64 has been tampered with and fails the same way.
pub fn decrypt(token: &[u8], key: &DerivedKey) -> Result<Vec<u8>, CryptoError> {
    let sealed = BASE64
        .decode(token)
        .map_err(|_| CryptoError::AuthenticationFailed)?;

    if sealed.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::CiphertextTooShort);
    }

    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_SIZE);

    let cipher = ChaCha20Poly1305::new_from_slice(key.as_bytes())
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| CryptoError::AuthenticationFailed)
}
