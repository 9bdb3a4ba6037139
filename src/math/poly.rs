//! Ring elements of R_q = Z_q[X]/(X^n + 1).
//!
//! A [`RingElement`] is an immutable polynomial tied to the [`Ring`] it lives
//! in. All arithmetic is negacyclic and returns a fresh element. Operators are
//! implemented on references, so `&a * &b` never consumes its operands.
//!
//! Besides ring arithmetic this module carries the coefficient-level
//! operations the schemes need when moving between moduli:
//!
//! - [`RingElement::switch_modulus`] lifts the balanced representative of
//!   every coefficient into another ring.
//! - [`RingElement::scale_round`] computes `round(num * x / den)` per
//!   coefficient, rounding half away from zero on the balanced value.
//!
//! Binary operators panic when the operands live in different rings.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use rlwe_he::math::{NativeModulus, Ring, RingElement};
//!
//! let ring = Arc::new(Ring::with_ntt(8, NativeModulus::new(16369).unwrap()).unwrap());
//! let x = RingElement::from_u64_coeffs(&ring, &[0, 1]).unwrap();
//! let x2 = &x * &x;
//! assert_eq!(x2.coeffs()[2], 1);
//! ```

use std::ops::{Add, Mul, Neg, Sub};
use std::sync::Arc;

use num_bigint::{BigInt, BigUint};

use super::modular::{div_round, ModularInteger};
use super::ring::Ring;
use crate::error::{shape_err, Result};

/// Polynomial with coefficients in `Z_q`, reduced modulo `X^n + 1`.
#[derive(Clone, Debug)]
pub struct RingElement<M: ModularInteger> {
    ring: Arc<Ring<M>>,
    coeffs: Vec<M::Elem>,
}

impl<M: ModularInteger> RingElement<M> {
    pub fn zero(ring: &Arc<Ring<M>>) -> Self {
        let zero = ring.modulus().zero();
        Self {
            ring: Arc::clone(ring),
            coeffs: vec![zero; ring.dimension()],
        }
    }

    /// Element with constant term `value` and all other coefficients zero
    pub fn constant(ring: &Arc<Ring<M>>, value: u64) -> Self {
        let mut coeffs = vec![ring.modulus().zero(); ring.dimension()];
        coeffs[0] = ring.modulus().from_u64(value);
        Self {
            ring: Arc::clone(ring),
            coeffs,
        }
    }

    /// Build from canonical residues.
    ///
    /// Shorter inputs are padded with zero coefficients; more than `n`
    /// coefficients is a shape mismatch.
    pub fn from_coeffs(ring: &Arc<Ring<M>>, mut coeffs: Vec<M::Elem>) -> Result<Self> {
        let n = ring.dimension();
        if coeffs.len() > n {
            return Err(shape_err!(
                "{} coefficients do not fit a ring of dimension {}",
                coeffs.len(),
                n
            ));
        }
        coeffs.resize(n, ring.modulus().zero());
        Ok(Self {
            ring: Arc::clone(ring),
            coeffs,
        })
    }

    /// Caller guarantees exactly `n` canonical residues
    pub(crate) fn from_raw(ring: &Arc<Ring<M>>, coeffs: Vec<M::Elem>) -> Self {
        debug_assert_eq!(coeffs.len(), ring.dimension());
        Self {
            ring: Arc::clone(ring),
            coeffs,
        }
    }

    /// Build from unsigned values, reducing each modulo q
    pub fn from_u64_coeffs(ring: &Arc<Ring<M>>, values: &[u64]) -> Result<Self> {
        let m = ring.modulus();
        Self::from_coeffs(ring, values.iter().map(|&v| m.from_u64(v)).collect())
    }

    /// Build from signed values, mapping negatives to `q - |v|`
    pub fn from_i64_coeffs(ring: &Arc<Ring<M>>, values: &[i64]) -> Result<Self> {
        let m = ring.modulus();
        Self::from_coeffs(ring, values.iter().map(|&v| m.from_i64(v)).collect())
    }

    pub fn ring(&self) -> &Arc<Ring<M>> {
        &self.ring
    }

    pub fn dimension(&self) -> usize {
        self.coeffs.len()
    }

    /// Coefficient-domain view
    pub fn coeffs(&self) -> &[M::Elem] {
        &self.coeffs
    }

    /// Balanced representatives of all coefficients
    pub fn signed_coeffs(&self) -> Vec<BigInt> {
        let m = self.ring.modulus();
        self.coeffs.iter().map(|c| m.to_signed(c)).collect()
    }

    pub fn is_zero(&self) -> bool {
        let zero = self.ring.modulus().zero();
        self.coeffs.iter().all(|c| *c == zero)
    }

    /// Largest absolute balanced coefficient
    pub fn linf_norm(&self) -> BigUint {
        self.signed_coeffs()
            .into_iter()
            .map(|c| c.magnitude().clone())
            .max()
            .unwrap_or_default()
    }

    pub fn scalar_mul(&self, scalar: &M::Elem) -> Self {
        let m = self.ring.modulus();
        self.map(|c| m.mul(c, scalar))
    }

    /// Lift every coefficient's balanced representative into `target`.
    ///
    /// This is the modulus switch used around the tensor product: going up
    /// into a larger ring preserves every coefficient exactly.
    ///
    /// # Panics
    ///
    /// Panics if the rings have different dimensions.
    pub fn switch_modulus<N: ModularInteger>(&self, target: &Arc<Ring<N>>) -> RingElement<N> {
        assert_eq!(
            self.dimension(),
            target.dimension(),
            "Rings must have the same dimension"
        );
        let src = self.ring.modulus();
        let dst = target.modulus();
        RingElement {
            ring: Arc::clone(target),
            coeffs: self
                .coeffs
                .iter()
                .map(|c| dst.from_bigint(&src.to_signed(c)))
                .collect(),
        }
    }

    /// Per coefficient `round(num * x / den)` on the balanced value `x`,
    /// rounding half away from zero, reduced into `target`.
    ///
    /// # Panics
    ///
    /// Panics if the rings have different dimensions.
    pub fn scale_round<N: ModularInteger>(
        &self,
        num: &BigUint,
        den: &BigUint,
        target: &Arc<Ring<N>>,
    ) -> RingElement<N> {
        assert_eq!(
            self.dimension(),
            target.dimension(),
            "Rings must have the same dimension"
        );
        let src = self.ring.modulus();
        let dst = target.modulus();
        let num = BigInt::from(num.clone());
        RingElement {
            ring: Arc::clone(target),
            coeffs: self
                .coeffs
                .iter()
                .map(|c| dst.from_bigint(&div_round(&(src.to_signed(c) * &num), den)))
                .collect(),
        }
    }

    fn map<F: Fn(&M::Elem) -> M::Elem>(&self, f: F) -> Self {
        Self {
            ring: Arc::clone(&self.ring),
            coeffs: self.coeffs.iter().map(f).collect(),
        }
    }

    fn zip_with<F: Fn(&M::Elem, &M::Elem) -> M::Elem>(&self, other: &Self, f: F) -> Self {
        assert_eq!(self.ring, other.ring, "Operands must share a ring");
        Self {
            ring: Arc::clone(&self.ring),
            coeffs: self
                .coeffs
                .iter()
                .zip(other.coeffs.iter())
                .map(|(a, b)| f(a, b))
                .collect(),
        }
    }

    fn mul_ring(&self, other: &Self) -> Self {
        assert_eq!(self.ring, other.ring, "Operands must share a ring");
        let coeffs = match self.ring.ntt() {
            Some(ntt) => {
                let mut a = self.coeffs.clone();
                let mut b = other.coeffs.clone();
                ntt.forward(&mut a);
                ntt.forward(&mut b);
                let mut prod = ntt.pointwise_mul(&a, &b);
                ntt.inverse(&mut prod);
                prod
            }
            None => negacyclic_schoolbook(self.ring.modulus(), &self.coeffs, &other.coeffs),
        };
        Self {
            ring: Arc::clone(&self.ring),
            coeffs,
        }
    }
}

fn negacyclic_schoolbook<M: ModularInteger>(m: &M, a: &[M::Elem], b: &[M::Elem]) -> Vec<M::Elem> {
    let n = a.len();
    let mut out = vec![m.zero(); n];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            let prod = m.mul(x, y);
            let k = i + j;
            if k < n {
                out[k] = m.add(&out[k], &prod);
            } else {
                out[k - n] = m.sub(&out[k - n], &prod);
            }
        }
    }
    out
}

impl<M: ModularInteger> PartialEq for RingElement<M> {
    fn eq(&self, other: &Self) -> bool {
        self.ring == other.ring && self.coeffs == other.coeffs
    }
}

impl<M: ModularInteger> Eq for RingElement<M> {}

impl<M: ModularInteger> Add for &RingElement<M> {
    type Output = RingElement<M>;

    fn add(self, rhs: Self) -> RingElement<M> {
        let m = self.ring.modulus();
        self.zip_with(rhs, |a, b| m.add(a, b))
    }
}

impl<M: ModularInteger> Sub for &RingElement<M> {
    type Output = RingElement<M>;

    fn sub(self, rhs: Self) -> RingElement<M> {
        let m = self.ring.modulus();
        self.zip_with(rhs, |a, b| m.sub(a, b))
    }
}

impl<M: ModularInteger> Neg for &RingElement<M> {
    type Output = RingElement<M>;

    fn neg(self) -> RingElement<M> {
        let m = self.ring.modulus();
        self.map(|a| m.neg(a))
    }
}

impl<M: ModularInteger> Mul for &RingElement<M> {
    type Output = RingElement<M>;

    fn mul(self, rhs: Self) -> RingElement<M> {
        self.mul_ring(rhs)
    }
}
