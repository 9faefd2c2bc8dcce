//! Generate keys, sign arbitrary messages, and verify signatures over the
//! SM2 elliptic curve.
//!
//! The crate implements the signature primitive from GB/T 32918 over the
//! standard `sm2p256v1` parameters: prime-field arithmetic, the affine group
//! law, double-and-add scalar multiplication, key generation, and the
//! sign/verify protocol with its rejection-sampling retry loop. The message
//! digest is pluggable through the [Hasher] trait ([sha256::Sha256] is
//! provided); any 256-bit cryptographic hash satisfies the contract.
//!
//! Scalar multiplication is not constant-time. The crate targets functional
//! correctness, not side-channel resistance.
//!
//! # Example
//! ```rust
//! use rand::rngs::OsRng;
//! use sm2::{sm2p256v1, Sha256};
//!
//! // Generate a new key pair
//! let curve = sm2p256v1();
//! let (private, public) = sm2::keypair(curve, &mut OsRng);
//!
//! // Create a message to sign
//! let namespace = Some(&b"demo"[..]);
//! let msg = b"hello, world!";
//!
//! // Sign the message
//! let signature = sm2::sign::<Sha256, _>(curve, &mut OsRng, &private, namespace, msg)
//!     .expect("signing should succeed");
//!
//! // Verify the signature
//! assert!(sm2::verify::<Sha256>(curve, &public, namespace, msg, &signature));
//! ```

use thiserror::Error;

pub mod curve;
pub mod field;
pub mod scheme;
pub mod sha256;
pub mod utils;

pub use curve::{sm2p256v1, Curve, Point};
pub use scheme::{keypair, keypair_from_seed, sign, verify, PrivateKey, PublicKey, Signature};
pub use sha256::Sha256;

/// Number of bytes in a digest produced by a [Hasher].
pub const DIGEST_LENGTH: usize = 32;

/// Errors that can occur when working with SM2 primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A modular inverse was requested for an element that has none
    /// (`gcd(a, m) != 1`).
    #[error("no modular inverse")]
    InvalidInverse,
    /// The signing retry loop hit its attempt bound without producing an
    /// acceptable `(r, s)` pair.
    #[error("exhausted signing attempts")]
    AttemptsExhausted,
}

/// A 256-bit hash function consumed by signing and verification.
///
/// The signature core never depends on a specific algorithm: the digest is
/// interpreted as a big-endian integer and reduced modulo the group order.
/// SM3 or any other 256-bit cryptographic hash can be plugged in here.
///
/// Implementations must be `Clone` because hashers are often part of structs
/// that are cloned; callers should not rely on cloned state and can `reset`
/// after cloning.
pub trait Hasher: Clone + Send + Sync + 'static {
    /// Create a new hasher.
    fn new() -> Self;

    /// Append message to previously recorded data.
    fn update(&mut self, message: &[u8]);

    /// Hash all recorded data and reset the hasher to the initial state.
    fn finalize(&mut self) -> [u8; DIGEST_LENGTH];

    /// Reset the hasher without generating a hash.
    fn reset(&mut self);
}
