//! SM2 key pairs, signing, and verification.
//!
//! Keys and signatures are explicit values: generation returns a
//! `(PrivateKey, PublicKey)` pair that the caller owns and passes back into
//! [sign] and [verify]. Nothing is stored in shared state, so any number of
//! signers and verifiers over the same [Curve] can run concurrently.
//!
//! Both operations are generic over the message digest (any 256-bit
//! [Hasher]) and take an optional namespace that is bound into the digest,
//! so a signature produced for one context cannot be replayed in another.

use crate::{curve::Point, field, utils::union_unique, Curve, Error, Hasher};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::{rngs::StdRng, CryptoRng, Rng, SeedableRng};
use std::fmt;

/// Serialized length of a private key in bytes.
pub const PRIVATE_KEY_LENGTH: usize = 32;
/// Serialized length of a public key in bytes (`x || y`).
pub const PUBLIC_KEY_LENGTH: usize = 64;
/// Serialized length of a signature in bytes (`r || s`).
pub const SIGNATURE_LENGTH: usize = 64;

/// Upper bound on rejection-sampling attempts in [sign].
///
/// Each rejection requires `r = 0`, `r + k = n`, or `s = 0`, so with honest
/// entropy the bound is unreachable; it exists to turn a degenerate random
/// source into an explicit error instead of a hang.
pub const MAX_SIGN_ATTEMPTS: usize = 64;

/// A private scalar `d` in `[1, n-1]`.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    d: BigUint,
}

impl PrivateKey {
    /// Wraps a raw scalar, enforcing `1 <= d <= n-1`.
    pub fn from_scalar(curve: &Curve, d: BigUint) -> Option<Self> {
        if d.is_zero() || &d >= curve.n() {
            return None;
        }
        Some(Self { d })
    }

    /// Decodes a 32-byte big-endian scalar.
    pub fn from_bytes(curve: &Curve, bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; PRIVATE_KEY_LENGTH] = bytes.try_into().ok()?;
        Self::from_scalar(curve, BigUint::from_bytes_be(&bytes))
    }

    /// Encodes the scalar as 32 big-endian bytes.
    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_LENGTH] {
        to_fixed_be(&self.d)
    }

    /// Derives the public key `d * G`.
    ///
    /// `curve` must be the parameter set the key belongs to.
    pub fn public_key(&self, curve: &Curve) -> PublicKey {
        match curve.mul(&self.d, curve.generator()) {
            Ok(Point::Affine { x, y }) => PublicKey { x, y },
            // d in [1, n-1] and a base point of order n keep d*G off the
            // identity and every slope denominator invertible.
            Ok(Point::Infinity) | Err(_) => unreachable!("base point multiple is affine"),
        }
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey([REDACTED])")
    }
}

/// A public point `Q = d * G`.
///
/// Constructors enforce curve membership and reject the point at infinity,
/// so a `PublicKey` always names a usable verification point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    x: BigUint,
    y: BigUint,
}

impl PublicKey {
    /// Wraps a point, enforcing curve membership and rejecting the identity.
    pub fn from_point(curve: &Curve, q: Point) -> Option<Self> {
        if !curve.contains(&q) {
            return None;
        }
        match q {
            Point::Affine { x, y } => Some(Self { x, y }),
            Point::Infinity => None,
        }
    }

    /// Decodes a 64-byte uncompressed `x || y` encoding.
    pub fn from_bytes(curve: &Curve, bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; PUBLIC_KEY_LENGTH] = bytes.try_into().ok()?;
        let (x, y) = bytes.split_at(PUBLIC_KEY_LENGTH / 2);
        Self::from_point(
            curve,
            Point::Affine {
                x: BigUint::from_bytes_be(x),
                y: BigUint::from_bytes_be(y),
            },
        )
    }

    /// Encodes the point as `x || y`, each coordinate 32 big-endian bytes.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        let mut out = [0u8; PUBLIC_KEY_LENGTH];
        out[..PUBLIC_KEY_LENGTH / 2].copy_from_slice(&to_fixed_be::<{ PUBLIC_KEY_LENGTH / 2 }>(
            &self.x,
        ));
        out[PUBLIC_KEY_LENGTH / 2..].copy_from_slice(&to_fixed_be::<{ PUBLIC_KEY_LENGTH / 2 }>(
            &self.y,
        ));
        out
    }

    /// The verification point.
    pub fn point(&self) -> Point {
        Point::Affine {
            x: self.x.clone(),
            y: self.y.clone(),
        }
    }
}

/// A signature pair `(r, s)`.
///
/// Construction performs no range checks: well-formedness
/// (`1 <= r,s <= n-1`) is enforced by [verify], which reports out-of-range
/// components as an invalid signature rather than an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    r: BigUint,
    s: BigUint,
}

impl Signature {
    pub fn new(r: BigUint, s: BigUint) -> Self {
        Self { r, s }
    }

    pub fn r(&self) -> &BigUint {
        &self.r
    }

    pub fn s(&self) -> &BigUint {
        &self.s
    }

    /// Decodes a 64-byte `r || s` encoding.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; SIGNATURE_LENGTH] = bytes.try_into().ok()?;
        let (r, s) = bytes.split_at(SIGNATURE_LENGTH / 2);
        Some(Self {
            r: BigUint::from_bytes_be(r),
            s: BigUint::from_bytes_be(s),
        })
    }

    /// Encodes the pair as `r || s`, each component 32 big-endian bytes.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..SIGNATURE_LENGTH / 2]
            .copy_from_slice(&to_fixed_be::<{ SIGNATURE_LENGTH / 2 }>(&self.r));
        out[SIGNATURE_LENGTH / 2..]
            .copy_from_slice(&to_fixed_be::<{ SIGNATURE_LENGTH / 2 }>(&self.s));
        out
    }
}

/// Generates a key pair: a private scalar drawn uniformly from `[1, n-1]`
/// and its public point `d * G`.
///
/// The random source must be cryptographically secure; the `CryptoRng` bound
/// enforces this at the type level.
pub fn keypair<R: Rng + CryptoRng>(curve: &Curve, rng: &mut R) -> (PrivateKey, PublicKey) {
    let private = PrivateKey {
        d: curve.random_scalar(rng),
    };
    let public = private.public_key(curve);
    (private, public)
}

/// Generates a key pair from a seed.
///
/// # Warning
///
/// This function is insecure and should only be used for examples and
/// testing.
pub fn keypair_from_seed(curve: &Curve, seed: u64) -> (PrivateKey, PublicKey) {
    let mut rng = StdRng::seed_from_u64(seed);
    keypair(curve, &mut rng)
}

/// Reduces the digest of the payload into `[1, n-1]`: big-endian
/// interpretation mod `n`, with a zero result coerced to one.
fn message_scalar<H: Hasher>(curve: &Curve, namespace: Option<&[u8]>, message: &[u8]) -> BigUint {
    let mut hasher = H::new();
    match namespace {
        Some(namespace) => hasher.update(&union_unique(namespace, message)),
        None => hasher.update(message),
    }
    let e = BigUint::from_bytes_be(&hasher.finalize()) % curve.n();
    if e.is_zero() {
        BigUint::one()
    } else {
        e
    }
}

/// Signs a message (optionally bound to a namespace) with `private`.
///
/// Each attempt draws a fresh nonce `k` from `rng` and rejects candidates
/// with `r = 0`, `r + k = n`, or `s = 0`; rejected draws are retried
/// transparently. Fails with [Error::AttemptsExhausted] once
/// [MAX_SIGN_ATTEMPTS] candidates have been rejected, and with
/// [Error::InvalidInverse] when `1 + d` is not invertible (`d = n-1`, the
/// one in-range scalar that cannot sign).
pub fn sign<H: Hasher, R: Rng + CryptoRng>(
    curve: &Curve,
    rng: &mut R,
    private: &PrivateKey,
    namespace: Option<&[u8]>,
    message: &[u8],
) -> Result<Signature, Error> {
    let n = curve.n();
    let e = message_scalar::<H>(curve, namespace, message);
    // (1 + d)^-1 does not depend on the nonce.
    let inv = field::mod_inverse(&((BigUint::one() + &private.d) % n), n)?;
    for _ in 0..MAX_SIGN_ATTEMPTS {
        let k = curve.random_scalar(rng);
        let x1 = match curve.mul(&k, curve.generator())? {
            Point::Affine { x, .. } => x,
            // k in [1, n-1] never lands on the identity.
            Point::Infinity => continue,
        };
        let r = (&e + x1) % n;
        if r.is_zero() || &r + &k == *n {
            continue;
        }
        // s = (1 + d)^-1 * (k - r*d) mod n
        let rd = field::mul_mod(&r, &private.d, n);
        let s = field::mul_mod(&inv, &field::sub_mod(&k, &rd, n), n);
        if s.is_zero() {
            continue;
        }
        return Ok(Signature { r, s });
    }
    Err(Error::AttemptsExhausted)
}

/// Verifies a signature over a message (optionally bound to a namespace)
/// against `public`.
///
/// An invalid signature is an expected outcome and is reported as `false`,
/// never as an error: out-of-range `r` or `s`, a vanishing `t = r + s`, and
/// a failed final comparison all return `false`. The namespace must match
/// the one provided during signing.
pub fn verify<H: Hasher>(
    curve: &Curve,
    public: &PublicKey,
    namespace: Option<&[u8]>,
    message: &[u8],
    signature: &Signature,
) -> bool {
    let n = curve.n();
    let Signature { r, s } = signature;
    if r.is_zero() || r >= n || s.is_zero() || s >= n {
        return false;
    }
    let e = message_scalar::<H>(curve, namespace, message);
    let t = (r + s) % n;
    if t.is_zero() {
        return false;
    }
    let sg = match curve.mul(s, curve.generator()) {
        Ok(point) => point,
        Err(_) => return false,
    };
    let q = public.point();
    let tq = match curve.mul(&t, &q) {
        Ok(point) => point,
        Err(_) => return false,
    };
    let x1 = match curve.add(&sg, &tq) {
        Ok(Point::Affine { x, .. }) => x,
        Ok(Point::Infinity) | Err(_) => return false,
    };
    (&e + &x1) % n == *r
}

/// Left-pads a big-endian encoding to `N` bytes. The value must fit.
fn to_fixed_be<const N: usize>(value: &BigUint) -> [u8; N] {
    let mut out = [0u8; N];
    let bytes = value.to_bytes_be();
    out[N - bytes.len()..].copy_from_slice(&bytes);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{sm2p256v1, Sha256};
    use rand::rngs::OsRng;

    #[test]
    fn test_sign_and_verify_with_unit_key() {
        // d = 1 makes Q = G.
        let curve = sm2p256v1();
        let private = PrivateKey::from_scalar(curve, BigUint::one()).unwrap();
        let public = private.public_key(curve);
        assert_eq!(&public.point(), curve.generator());

        let message = b"test";
        let signature = sign::<Sha256, _>(curve, &mut OsRng, &private, None, message).unwrap();
        assert!(verify::<Sha256>(curve, &public, None, message, &signature));

        // The same signature must not verify against 2*G.
        let two_g = curve.mul(&BigUint::from(2u8), curve.generator()).unwrap();
        let wrong_public = PublicKey::from_point(curve, two_g).unwrap();
        assert!(!verify::<Sha256>(
            curve,
            &wrong_public,
            None,
            message,
            &signature
        ));
    }

    #[test]
    fn test_sign_rejects_uninvertible_key() {
        // d = n-1 is in range but 1 + d = n has no inverse mod n.
        let curve = sm2p256v1();
        let d = curve.n() - BigUint::one();
        let private = PrivateKey::from_scalar(curve, d).unwrap();
        assert_eq!(
            sign::<Sha256, _>(curve, &mut OsRng, &private, None, b"test"),
            Err(Error::InvalidInverse)
        );
    }

    #[test]
    fn test_verify_rejects_out_of_range_components() {
        let curve = sm2p256v1();
        let (private, public) = keypair_from_seed(curve, 0);
        let message = b"test";
        let signature = sign::<Sha256, _>(curve, &mut OsRng, &private, None, message).unwrap();

        let cases = [
            Signature::new(BigUint::zero(), signature.s().clone()),
            Signature::new(signature.r().clone(), BigUint::zero()),
            Signature::new(curve.n().clone(), signature.s().clone()),
            Signature::new(signature.r().clone(), curve.n().clone()),
        ];
        for bad in cases {
            assert!(!verify::<Sha256>(curve, &public, None, message, &bad));
        }
    }

    #[test]
    fn test_verify_rejects_vanishing_sum() {
        // r = 1 and s = n-1 are both in range, but r + s = 0 mod n.
        let curve = sm2p256v1();
        let (_, public) = keypair_from_seed(curve, 0);
        let bad = Signature::new(BigUint::one(), curve.n() - BigUint::one());
        assert!(!verify::<Sha256>(curve, &public, None, b"test", &bad));
    }

    #[test]
    fn test_signature_components_in_range() {
        let curve = sm2p256v1();
        let (private, _) = keypair_from_seed(curve, 7);
        let signature = sign::<Sha256, _>(curve, &mut OsRng, &private, None, b"test").unwrap();
        assert!(!signature.r().is_zero());
        assert!(signature.r() < curve.n());
        assert!(!signature.s().is_zero());
        assert!(signature.s() < curve.n());
    }

    #[test]
    fn test_private_key_range_checks() {
        let curve = sm2p256v1();
        assert!(PrivateKey::from_scalar(curve, BigUint::zero()).is_none());
        assert!(PrivateKey::from_scalar(curve, curve.n().clone()).is_none());
        assert!(PrivateKey::from_scalar(curve, curve.n() + BigUint::one()).is_none());
        assert!(PrivateKey::from_scalar(curve, curve.n() - BigUint::one()).is_some());
    }

    #[test]
    fn test_private_key_codec() {
        let curve = sm2p256v1();
        let (private, _) = keypair_from_seed(curve, 3);
        let bytes = private.to_bytes();
        assert_eq!(PrivateKey::from_bytes(curve, &bytes).unwrap(), private);
        assert!(PrivateKey::from_bytes(curve, &bytes[..31]).is_none());
        assert!(PrivateKey::from_bytes(curve, &[0u8; PRIVATE_KEY_LENGTH]).is_none());
    }

    #[test]
    fn test_public_key_codec() {
        let curve = sm2p256v1();
        let (_, public) = keypair_from_seed(curve, 3);
        let bytes = public.to_bytes();
        assert_eq!(PublicKey::from_bytes(curve, &bytes).unwrap(), public);
        assert!(PublicKey::from_bytes(curve, &bytes[..PUBLIC_KEY_LENGTH - 1]).is_none());
        assert!(PublicKey::from_bytes(curve, &[0u8; 1024]).is_none());

        // A corrupted coordinate falls off the curve.
        let mut off = bytes;
        off[PUBLIC_KEY_LENGTH - 1] ^= 0x01;
        assert!(PublicKey::from_bytes(curve, &off).is_none());
    }

    #[test]
    fn test_public_key_rejects_invalid_points() {
        let curve = sm2p256v1();
        assert!(PublicKey::from_point(curve, Point::Infinity).is_none());
        let off = Point::Affine {
            x: BigUint::one(),
            y: BigUint::one(),
        };
        assert!(PublicKey::from_point(curve, off).is_none());
    }

    #[test]
    fn test_signature_codec() {
        let curve = sm2p256v1();
        let (private, _) = keypair_from_seed(curve, 3);
        let signature = sign::<Sha256, _>(curve, &mut OsRng, &private, None, b"test").unwrap();
        let bytes = signature.to_bytes();
        assert_eq!(Signature::from_bytes(&bytes).unwrap(), signature);
        assert!(Signature::from_bytes(&bytes[..SIGNATURE_LENGTH - 1]).is_none());
    }

    #[test]
    fn test_private_key_from_hex_vector() {
        let curve = sm2p256v1();
        let bytes = crate::utils::from_hex_formatted(
            "128B2FA8 BD433C6C 068C8D80 3DFF7979 2A519A55 171B1B65 0C23661D 15897263",
        )
        .unwrap();
        let private = PrivateKey::from_bytes(curve, &bytes).unwrap();
        assert_eq!(private.to_bytes().to_vec(), bytes);
        let public = private.public_key(curve);
        assert!(curve.contains(&public.point()));

        let message = b"message digest";
        let signature =
            sign::<Sha256, _>(curve, &mut OsRng, &private, None, message).unwrap();
        assert!(verify::<Sha256>(curve, &public, None, message, &signature));
    }

    #[test]
    fn test_private_key_debug_redacted() {
        let curve = sm2p256v1();
        let (private, _) = keypair_from_seed(curve, 0);
        assert_eq!(format!("{:?}", private), "PrivateKey([REDACTED])");
    }

    #[test]
    fn test_message_scalar_in_range() {
        let curve = sm2p256v1();
        for message in [&b""[..], &b"test"[..], &[0u8; 128][..]] {
            let e = message_scalar::<Sha256>(curve, None, message);
            assert!(!e.is_zero());
            assert!(&e < curve.n());
        }
    }
}
