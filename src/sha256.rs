//! A [Hasher] implementation backed by SHA-256.
//!
//! This is the default digest for signing and verification; any other
//! 256-bit hash (SM3 in particular) can be substituted through the [Hasher]
//! trait without touching the signature core.

use crate::{Hasher, DIGEST_LENGTH};
use sha2::{Digest as _, Sha256 as ISha256};

/// SHA-256 hasher.
#[derive(Clone)]
pub struct Sha256 {
    hasher: ISha256,
}

impl Default for Sha256 {
    fn default() -> Self {
        <Self as Hasher>::new()
    }
}

impl Hasher for Sha256 {
    fn new() -> Self {
        Self {
            hasher: ISha256::new(),
        }
    }

    fn update(&mut self, message: &[u8]) {
        self.hasher.update(message);
    }

    fn finalize(&mut self) -> [u8; DIGEST_LENGTH] {
        self.hasher.finalize_reset().into()
    }

    fn reset(&mut self) {
        self.hasher = ISha256::new();
    }
}

/// Hashes the given bytes in one shot.
pub fn hash(message: &[u8]) -> [u8; DIGEST_LENGTH] {
    let mut hasher = Sha256::new();
    hasher.update(message);
    hasher.finalize()
}
