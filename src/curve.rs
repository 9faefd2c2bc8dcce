//! The elliptic-curve group and its domain parameters.
//!
//! Points live on a short Weierstrass curve `y^2 = x^3 + ax + b` over the
//! prime field `F_p` and form an abelian group under the chord-and-tangent
//! law, with the point at infinity as identity. Scalar multiplication is
//! plain double-and-add and is not constant-time; the crate targets
//! functional correctness, not side-channel resistance.

use crate::{field, Error};
use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::{CryptoRng, Rng};
use std::sync::OnceLock;

/// A point on the curve: an affine coordinate pair or the point at infinity
/// (the identity element of the group).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Point {
    Infinity,
    Affine { x: BigUint, y: BigUint },
}

impl Point {
    /// Returns true if this is the point at infinity.
    pub fn is_infinity(&self) -> bool {
        matches!(self, Point::Infinity)
    }
}

/// Domain parameters: the field prime `p`, curve coefficients `a` and `b`,
/// the base point `G`, and its order `n`.
///
/// A `Curve` is immutable after construction and is borrowed explicitly by
/// every arithmetic and protocol operation, so a single value can be shared
/// across any number of concurrent signers and verifiers.
#[derive(Clone, Debug)]
pub struct Curve {
    p: BigUint,
    a: BigUint,
    b: BigUint,
    n: BigUint,
    g: Point,
}

impl Curve {
    /// Assembles a parameter set. The caller is responsible for supplying a
    /// valid curve with a base point of prime order `n`.
    pub fn new(p: BigUint, a: BigUint, b: BigUint, n: BigUint, gx: BigUint, gy: BigUint) -> Self {
        Self {
            p,
            a,
            b,
            n,
            g: Point::Affine { x: gx, y: gy },
        }
    }

    /// The field prime.
    pub fn p(&self) -> &BigUint {
        &self.p
    }

    /// The coefficient `a` of the curve equation.
    pub fn a(&self) -> &BigUint {
        &self.a
    }

    /// The coefficient `b` of the curve equation.
    pub fn b(&self) -> &BigUint {
        &self.b
    }

    /// The order of the base point.
    pub fn n(&self) -> &BigUint {
        &self.n
    }

    /// The base point `G`.
    pub fn generator(&self) -> &Point {
        &self.g
    }

    /// Returns true if `point` satisfies the curve equation (the point at
    /// infinity always does).
    pub fn contains(&self, point: &Point) -> bool {
        match point {
            Point::Infinity => true,
            Point::Affine { x, y } => {
                if x >= &self.p || y >= &self.p {
                    return false;
                }
                let lhs = field::mul_mod(y, y, &self.p);
                let rhs = field::add_mod(&(x * x * x + &self.a * x), &self.b, &self.p);
                lhs == rhs
            }
        }
    }

    /// Adds two points.
    ///
    /// Fails with [Error::InvalidInverse] only when a slope denominator is
    /// not invertible, which cannot happen for points on a curve of odd
    /// prime order.
    pub fn add(&self, p1: &Point, p2: &Point) -> Result<Point, Error> {
        let (x1, y1) = match p1 {
            Point::Infinity => return Ok(p2.clone()),
            Point::Affine { x, y } => (x, y),
        };
        let (x2, y2) = match p2 {
            Point::Infinity => return Ok(p1.clone()),
            Point::Affine { x, y } => (x, y),
        };
        // A point plus its negation vanishes.
        if x1 == x2 && y1 != y2 {
            return Ok(Point::Infinity);
        }
        let lambda = if x1 == x2 {
            // Tangent slope: (3*x1^2 + a) / (2*y1). A point with y = 0 is
            // its own negation and has no tangent.
            let numerator = field::add_mod(&(BigUint::from(3u8) * x1 * x1), &self.a, &self.p);
            let denominator = field::mod_inverse(&(BigUint::from(2u8) * y1), &self.p)?;
            field::mul_mod(&numerator, &denominator, &self.p)
        } else {
            // Chord slope: (y2 - y1) / (x2 - x1).
            let numerator = field::sub_mod(y2, y1, &self.p);
            let denominator = field::mod_inverse(&field::sub_mod(x2, x1, &self.p), &self.p)?;
            field::mul_mod(&numerator, &denominator, &self.p)
        };
        let x3 = field::sub_mod(
            &field::mul_mod(&lambda, &lambda, &self.p),
            &field::add_mod(x1, x2, &self.p),
            &self.p,
        );
        let y3 = field::sub_mod(
            &field::mul_mod(&lambda, &field::sub_mod(x1, &x3, &self.p), &self.p),
            y1,
            &self.p,
        );
        Ok(Point::Affine { x: x3, y: y3 })
    }

    /// Computes `k * point` by binary double-and-add over the bits of `k`,
    /// least significant first. `mul(0, point)` is the point at infinity.
    pub fn mul(&self, k: &BigUint, point: &Point) -> Result<Point, Error> {
        let mut result = Point::Infinity;
        let mut addend = point.clone();
        let mut k = k.clone();
        while !k.is_zero() {
            if k.is_odd() {
                result = self.add(&result, &addend)?;
            }
            addend = self.add(&addend, &addend)?;
            k >>= 1;
        }
        Ok(result)
    }

    /// Draws a scalar uniformly from `[1, n-1]`.
    pub fn random_scalar<R: Rng + CryptoRng>(&self, rng: &mut R) -> BigUint {
        rng.gen_biguint_range(&BigUint::one(), &self.n)
    }
}

/// The standard SM2 domain parameters (curve `sm2p256v1`, GB/T 32918.5-2016).
pub fn sm2p256v1() -> &'static Curve {
    static SM2P256V1: OnceLock<Curve> = OnceLock::new();
    SM2P256V1.get_or_init(|| {
        Curve::new(
            uint("FFFFFFFEFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF00000000FFFFFFFFFFFFFFFF"),
            uint("FFFFFFFEFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF00000000FFFFFFFFFFFFFFFC"),
            uint("28E9FA9E9D9F5E344D5A9E4BCF6509A7F39789F515AB8F92DDBCBD414D940E93"),
            uint("FFFFFFFEFFFFFFFFFFFFFFFFFFFFFFFF7203DF6B21C6052B53BBF40939D54123"),
            uint("32C4AE2C1F1981195F9904466A39C9948FE30BBFF2660BE1715A4589334C74C7"),
            uint("BC3736A2F4F6779C59BDCEE36B692153D0A9877CC62A474002DF32E52139F0A0"),
        )
    })
}

fn uint(hex: &str) -> BigUint {
    BigUint::parse_bytes(hex.as_bytes(), 16).expect("well-formed hex constant")
}
