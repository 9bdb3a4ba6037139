//! Modular integer backings.
//!
//! Ring code is generic over [`ModularInteger`], a description of one modulus
//! together with the arithmetic on its residues. Two backings exist:
//!
//! - [`NativeModulus`]: residues are `u64`, products go through `u128`.
//!   Used for the ciphertext and plaintext rings.
//! - [`BigModulus`]: residues are [`BigUint`] of any size. Used for the
//!   auxiliary ring that holds tensor products before rescaling.
//!
//! Both expose the balanced ("signed") representative in `[-q/2, q/2]`,
//! which every rounding step in the schemes operates on.

use std::fmt;

use num_bigint::{BigInt, BigUint, RandBigInt, Sign};
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use rand::Rng;

use crate::error::{param_err, Result};

/// Arithmetic over `Z_q` for one fixed modulus `q`.
pub trait ModularInteger: Clone + fmt::Debug + Send + Sync + 'static {
    /// Canonical residue in `[0, q)`
    type Elem: Clone + fmt::Debug + PartialEq + Eq + Send + Sync;

    /// The modulus as an arbitrary-precision integer
    fn modulus(&self) -> BigUint;

    /// Bit length of the modulus
    fn bits(&self) -> u64;

    fn zero(&self) -> Self::Elem;

    fn one(&self) -> Self::Elem {
        self.from_u64(1)
    }

    /// Reduce an unsigned value into `Z_q`
    fn from_u64(&self, v: u64) -> Self::Elem;

    /// Reduce a signed value into `Z_q` (negative values map to `q - |v|`)
    fn from_i64(&self, v: i64) -> Self::Elem;

    fn from_biguint(&self, v: &BigUint) -> Self::Elem;

    fn from_bigint(&self, v: &BigInt) -> Self::Elem;

    /// Canonical representative as a big integer
    fn to_biguint(&self, a: &Self::Elem) -> BigUint;

    /// Balanced representative: `a` if `a <= q/2`, else `a - q`
    fn to_signed(&self, a: &Self::Elem) -> BigInt;

    fn add(&self, a: &Self::Elem, b: &Self::Elem) -> Self::Elem;

    fn sub(&self, a: &Self::Elem, b: &Self::Elem) -> Self::Elem;

    fn mul(&self, a: &Self::Elem, b: &Self::Elem) -> Self::Elem;

    fn neg(&self, a: &Self::Elem) -> Self::Elem;

    /// Uniform residue in `[0, q)`
    fn sample_uniform<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Elem;
}

/// Machine-word modulus, `2 <= q < 2^63`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NativeModulus {
    q: u64,
}

impl NativeModulus {
    /// Largest modulus accepted by the native backing (exclusive)
    pub const MAX: u64 = 1 << 63;

    pub fn new(q: u64) -> Result<Self> {
        if q < 2 || q >= Self::MAX {
            return Err(param_err!("native modulus {} must lie in [2, 2^63)", q));
        }
        Ok(Self { q })
    }

    /// The modulus value
    #[inline]
    pub fn value(&self) -> u64 {
        self.q
    }

    /// Balanced representative as a machine integer, in `[-q/2, q/2]`
    #[inline]
    pub fn to_signed_i64(&self, val: u64) -> i64 {
        if val <= self.q / 2 {
            val as i64
        } else {
            -((self.q - val) as i64)
        }
    }
}

impl ModularInteger for NativeModulus {
    type Elem = u64;

    fn modulus(&self) -> BigUint {
        BigUint::from(self.q)
    }

    fn bits(&self) -> u64 {
        u64::from(64 - self.q.leading_zeros())
    }

    #[inline]
    fn zero(&self) -> u64 {
        0
    }

    #[inline]
    fn from_u64(&self, v: u64) -> u64 {
        v % self.q
    }

    #[inline]
    fn from_i64(&self, v: i64) -> u64 {
        let r = v.unsigned_abs() % self.q;
        if v < 0 && r != 0 {
            self.q - r
        } else {
            r
        }
    }

    fn from_biguint(&self, v: &BigUint) -> u64 {
        (v % self.q).to_u64().unwrap_or(0)
    }

    fn from_bigint(&self, v: &BigInt) -> u64 {
        let r = self.from_biguint(v.magnitude());
        if v.sign() == Sign::Minus {
            self.neg(&r)
        } else {
            r
        }
    }

    fn to_biguint(&self, a: &u64) -> BigUint {
        BigUint::from(*a)
    }

    fn to_signed(&self, a: &u64) -> BigInt {
        BigInt::from(self.to_signed_i64(*a))
    }

    #[inline]
    fn add(&self, a: &u64, b: &u64) -> u64 {
        let sum = (*a as u128) + (*b as u128);
        (sum % (self.q as u128)) as u64
    }

    #[inline]
    fn sub(&self, a: &u64, b: &u64) -> u64 {
        if a >= b {
            a - b
        } else {
            self.q - (b - a)
        }
    }

    #[inline]
    fn mul(&self, a: &u64, b: &u64) -> u64 {
        let prod = (*a as u128) * (*b as u128);
        (prod % (self.q as u128)) as u64
    }

    #[inline]
    fn neg(&self, a: &u64) -> u64 {
        if *a == 0 {
            0
        } else {
            self.q - a
        }
    }

    fn sample_uniform<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        rng.gen_range(0..self.q)
    }
}

/// Arbitrary-precision modulus for the auxiliary multiplication ring.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BigModulus {
    q: BigUint,
    half: BigUint,
}

impl BigModulus {
    pub fn new(q: BigUint) -> Result<Self> {
        if q < BigUint::from(2u32) {
            return Err(param_err!("big modulus {} must be at least 2", q));
        }
        let half = &q >> 1;
        Ok(Self { q, half })
    }

    /// Parse a modulus written in decimal
    pub fn from_decimal(s: &str) -> Result<Self> {
        let q = s
            .trim()
            .parse::<BigUint>()
            .map_err(|e| param_err!("invalid big modulus {:?}: {}", s, e))?;
        Self::new(q)
    }

    /// The modulus value
    pub fn value(&self) -> &BigUint {
        &self.q
    }
}

impl ModularInteger for BigModulus {
    type Elem = BigUint;

    fn modulus(&self) -> BigUint {
        self.q.clone()
    }

    fn bits(&self) -> u64 {
        self.q.bits()
    }

    fn zero(&self) -> BigUint {
        BigUint::zero()
    }

    fn from_u64(&self, v: u64) -> BigUint {
        BigUint::from(v) % &self.q
    }

    fn from_i64(&self, v: i64) -> BigUint {
        self.from_bigint(&BigInt::from(v))
    }

    fn from_biguint(&self, v: &BigUint) -> BigUint {
        v % &self.q
    }

    fn from_bigint(&self, v: &BigInt) -> BigUint {
        let r = v.magnitude() % &self.q;
        if v.sign() == Sign::Minus {
            self.neg(&r)
        } else {
            r
        }
    }

    fn to_biguint(&self, a: &BigUint) -> BigUint {
        a.clone()
    }

    fn to_signed(&self, a: &BigUint) -> BigInt {
        if *a <= self.half {
            BigInt::from(a.clone())
        } else {
            -BigInt::from(&self.q - a)
        }
    }

    fn add(&self, a: &BigUint, b: &BigUint) -> BigUint {
        let sum = a + b;
        if sum >= self.q {
            sum - &self.q
        } else {
            sum
        }
    }

    fn sub(&self, a: &BigUint, b: &BigUint) -> BigUint {
        if a >= b {
            a - b
        } else {
            &self.q - (b - a)
        }
    }

    fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.q
    }

    fn neg(&self, a: &BigUint) -> BigUint {
        if a.is_zero() {
            BigUint::zero()
        } else {
            &self.q - a
        }
    }

    fn sample_uniform<R: Rng + ?Sized>(&self, rng: &mut R) -> BigUint {
        rng.gen_biguint_below(&self.q)
    }
}

/// Divide `num` by `den`, rounding half away from zero.
///
/// `den` must be non-zero.
pub fn div_round(num: &BigInt, den: &BigUint) -> BigInt {
    let twice = num.magnitude() << 1usize;
    let (quot, _) = (twice + den).div_rem(&(den << 1usize));
    if num.sign() == Sign::Minus {
        -BigInt::from(quot)
    } else {
        BigInt::from(quot)
    }
}

/// Modular exponentiation on big integers, `base^exp mod m`
pub fn pow_mod(base: &BigUint, exp: &BigUint, m: &BigUint) -> BigUint {
    if m.is_one() {
        return BigUint::zero();
    }
    base.modpow(exp, m)
}
