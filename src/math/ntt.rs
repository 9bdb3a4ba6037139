//! Number-Theoretic Transform (NTT) for negacyclic polynomial multiplication.
//!
//! For multiplication modulo X^n + 1 we use a primitive 2n-th root of unity
//! ψ with ψ^n = -1. The forward transform (Cooley-Tukey, decimation in time)
//! evaluates a polynomial at the odd powers of ψ in bit-reversed order, the
//! inverse (Gentleman-Sande, decimation in frequency) undoes it and scales by
//! n^(-1). A product then costs two forward transforms, one pointwise
//! multiplication and one inverse transform.
//!
//! The table is generic over the modulus backing, so the same code serves the
//! native ciphertext ring and the arbitrary-precision auxiliary ring.
//!
//! # Example
//!
//! ```
//! use rlwe_he::math::{NativeModulus, NttTable};
//!
//! let modulus = NativeModulus::new(16369).unwrap();
//! let table = NttTable::new(8, &modulus).unwrap();
//!
//! let mut coeffs: Vec<u64> = (0..8).collect();
//! table.forward(&mut coeffs);
//! table.inverse(&mut coeffs);
//! assert_eq!(coeffs, (0..8).collect::<Vec<u64>>());
//! ```

use num_bigint::BigUint;

use super::modular::{pow_mod, ModularInteger};
use super::prime::{is_prime, primitive_root_of_unity};
use crate::error::{param_err, Result};

/// Precomputed twiddle factors for one `(n, q)` pair.
#[derive(Clone, Debug)]
pub struct NttTable<M: ModularInteger> {
    /// Ring dimension (power of two)
    n: usize,
    modulus: M,
    /// Powers of ψ in bit-reversed order
    psi_powers: Vec<M::Elem>,
    /// Powers of ψ^(-1) in bit-reversed order
    psi_inv_powers: Vec<M::Elem>,
    /// n^(-1) mod q
    n_inv: M::Elem,
}

impl<M: ModularInteger> NttTable<M> {
    /// Build the table for dimension `n` over `modulus`.
    ///
    /// Fails if `n` is not a power of two, if the modulus is not prime, or if
    /// it admits no primitive 2n-th root of unity (`q ≢ 1 mod 2n`).
    pub fn new(n: usize, modulus: &M) -> Result<Self> {
        if n < 2 || !n.is_power_of_two() {
            return Err(param_err!("ring dimension {} must be a power of two >= 2", n));
        }
        let q = modulus.modulus();
        if !is_prime(&q) {
            return Err(param_err!("NTT modulus {} is not prime", q));
        }

        let psi = primitive_root_of_unity(2 * n as u64, &q)?;
        let q_minus_two = &q - 2u32;
        let psi_inv = pow_mod(&psi, &q_minus_two, &q);
        let n_inv = pow_mod(&BigUint::from(n), &q_minus_two, &q);

        let psi_powers = bit_reversed_powers(modulus, &modulus.from_biguint(&psi), n);
        let psi_inv_powers = bit_reversed_powers(modulus, &modulus.from_biguint(&psi_inv), n);

        Ok(Self {
            n,
            modulus: modulus.clone(),
            psi_powers,
            psi_inv_powers,
            n_inv: modulus.from_biguint(&n_inv),
        })
    }

    /// Ring dimension
    pub fn dimension(&self) -> usize {
        self.n
    }

    /// Forward transform in place.
    ///
    /// # Panics
    ///
    /// Panics if `coeffs.len() != n`.
    pub fn forward(&self, coeffs: &mut [M::Elem]) {
        assert_eq!(coeffs.len(), self.n, "Input length must match dimension");
        let m_q = &self.modulus;

        let mut t = self.n;
        let mut m = 1;
        while m < self.n {
            t >>= 1;
            for i in 0..m {
                let j1 = 2 * i * t;
                let w = &self.psi_powers[m + i];

                for j in j1..(j1 + t) {
                    let u = coeffs[j].clone();
                    let v = m_q.mul(&coeffs[j + t], w);
                    coeffs[j] = m_q.add(&u, &v);
                    coeffs[j + t] = m_q.sub(&u, &v);
                }
            }
            m <<= 1;
        }
    }

    /// Inverse transform in place, including the n^(-1) scaling.
    ///
    /// # Panics
    ///
    /// Panics if `coeffs.len() != n`.
    pub fn inverse(&self, coeffs: &mut [M::Elem]) {
        assert_eq!(coeffs.len(), self.n, "Input length must match dimension");
        let m_q = &self.modulus;

        let mut t = 1;
        let mut m = self.n;
        while m > 1 {
            m >>= 1;
            for i in 0..m {
                let j1 = i * 2 * t;
                let w = &self.psi_inv_powers[m + i];

                for j in j1..(j1 + t) {
                    let u = coeffs[j].clone();
                    let v = coeffs[j + t].clone();
                    coeffs[j] = m_q.add(&u, &v);
                    coeffs[j + t] = m_q.mul(&m_q.sub(&u, &v), w);
                }
            }
            t <<= 1;
        }

        for c in coeffs.iter_mut() {
            *c = m_q.mul(c, &self.n_inv);
        }
    }

    /// Pointwise product of two transformed vectors
    pub fn pointwise_mul(&self, a: &[M::Elem], b: &[M::Elem]) -> Vec<M::Elem> {
        assert_eq!(a.len(), self.n, "Input length must match dimension");
        assert_eq!(b.len(), self.n, "Input length must match dimension");
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| self.modulus.mul(x, y))
            .collect()
    }
}

fn bit_reversed_powers<M: ModularInteger>(modulus: &M, root: &M::Elem, n: usize) -> Vec<M::Elem> {
    let log_n = n.trailing_zeros();
    let mut powers = vec![modulus.zero(); n];
    let mut acc = modulus.one();
    for i in 0..n {
        powers[bit_reverse(i, log_n)] = acc.clone();
        acc = modulus.mul(&acc, root);
    }
    powers
}

#[inline]
fn bit_reverse(i: usize, bits: u32) -> usize {
    if bits == 0 {
        0
    } else {
        i.reverse_bits() >> (usize::BITS - bits)
    }
}
