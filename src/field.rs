//! Arithmetic over prime fields.
//!
//! All functions take the modulus explicitly and return canonical residues
//! in `[0, m-1]`. Operands do not need to be reduced beforehand.

use crate::Error;
use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};

/// `(a + b) mod m`.
pub fn add_mod(a: &BigUint, b: &BigUint, m: &BigUint) -> BigUint {
    (a + b) % m
}

/// `(a - b) mod m`.
pub fn sub_mod(a: &BigUint, b: &BigUint, m: &BigUint) -> BigUint {
    ((a % m) + m - (b % m)) % m
}

/// `(a * b) mod m`.
pub fn mul_mod(a: &BigUint, b: &BigUint, m: &BigUint) -> BigUint {
    (a * b) % m
}

/// Computes the multiplicative inverse of `a` modulo `m` with the extended
/// Euclidean algorithm.
///
/// Returns [Error::InvalidInverse] when no inverse exists, i.e. when
/// `gcd(a, m) != 1` (including `a = 0`) or `m < 2`. The result is the unique
/// value in `[0, m-1]` with `a * result = 1 (mod m)`.
pub fn mod_inverse(a: &BigUint, m: &BigUint) -> Result<BigUint, Error> {
    if *m < BigUint::from(2u8) {
        return Err(Error::InvalidInverse);
    }
    let modulus = BigInt::from(m.clone());
    let (mut old_r, mut r) = (BigInt::from(a % m), modulus.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
    while !r.is_zero() {
        let quotient = &old_r / &r;
        (old_r, r) = (r.clone(), &old_r - &quotient * &r);
        (old_s, s) = (s.clone(), &old_s - &quotient * &s);
    }
    // old_r is gcd(a, m); a unit requires gcd 1.
    if !old_r.is_one() {
        return Err(Error::InvalidInverse);
    }
    let inverse = old_s.mod_floor(&modulus);
    Ok(inverse
        .to_biguint()
        .expect("canonical residue is non-negative"))
}
