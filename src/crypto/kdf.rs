//! Password-based key derivation.
//!
//! PBKDF2-HMAC-SHA256 with a fixed iteration count stretches the user's
//! password and a per-encode random salt into a 256-bit key.

use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Salt length in bytes. The salt travels in-band as the payload prefix.
pub const SALT_SIZE: usize = 16;

/// Derived key length in bytes.
pub const KEY_SIZE: usize = 32;

/// PBKDF2 iteration count.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Random salt prepended to every ciphertext.
pub type Salt = [u8; SALT_SIZE];

/// Symmetric key derived from a password. Wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    bytes: [u8; KEY_SIZE],
}

impl DerivedKey {
    /// Returns the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey(..)")
    }
}

/// Derives a key from `secret`.
///
/// When `salt` is `None` a fresh salt is drawn from the OS RNG. The salt
/// actually used is returned so the caller can store it next to the
/// ciphertext.
pub fn derive_key(secret: &str, salt: Option<Salt>) -> (DerivedKey, Salt) {
    match salt {
        Some(salt) => (stretch(secret, &salt), salt),
        None => derive_key_with_rng(secret, &mut OsRng),
    }
}

/// Derives a key using a fresh salt drawn from `rng`.
pub fn derive_key_with_rng<R: RngCore + CryptoRng>(secret: &str, rng: &mut R) -> (DerivedKey, Salt) {
    let mut salt = [0u8; SALT_SIZE];
    rng.fill_bytes(&mut salt);
    (stretch(secret, &salt), salt)
}

fn stretch(secret: &str, salt: &Salt) -> DerivedKey {
    let mut bytes = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(secret.as_bytes(), salt, PBKDF2_ITERATIONS, &mut bytes);
    DerivedKey { bytes }
}
