//! Negacyclic polynomial rings Z_q[X]/(X^n + 1).

use std::fmt;

use super::modular::ModularInteger;
use super::ntt::NttTable;
use crate::error::{param_err, Result};

/// A negacyclic ring of dimension `n` over one modulus.
///
/// Rings built with [`Ring::with_ntt`] multiply in O(n log n). Rings built
/// with [`Ring::new`] have no transform (the plaintext ring, where `p` is
/// usually not an NTT prime) and fall back to schoolbook convolution.
pub struct Ring<M: ModularInteger> {
    n: usize,
    modulus: M,
    ntt: Option<NttTable<M>>,
}

impl<M: ModularInteger> Ring<M> {
    /// Ring without an NTT table
    pub fn new(n: usize, modulus: M) -> Result<Self> {
        if n < 2 || !n.is_power_of_two() {
            return Err(param_err!("ring dimension {} must be a power of two >= 2", n));
        }
        Ok(Self {
            n,
            modulus,
            ntt: None,
        })
    }

    /// Ring with NTT multiplication.
    ///
    /// Fails with a parameter error when the modulus admits no primitive
    /// 2n-th root of unity.
    pub fn with_ntt(n: usize, modulus: M) -> Result<Self> {
        let ntt = NttTable::new(n, &modulus)?;
        Ok(Self {
            n,
            modulus,
            ntt: Some(ntt),
        })
    }

    pub fn dimension(&self) -> usize {
        self.n
    }

    pub fn modulus(&self) -> &M {
        &self.modulus
    }

    pub fn ntt(&self) -> Option<&NttTable<M>> {
        self.ntt.as_ref()
    }
}

impl<M: ModularInteger> PartialEq for Ring<M> {
    fn eq(&self, other: &Self) -> bool {
        self.n == other.n && self.modulus.modulus() == other.modulus.modulus()
    }
}

impl<M: ModularInteger> Eq for Ring<M> {}

impl<M: ModularInteger> fmt::Debug for Ring<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ring")
            .field("n", &self.n)
            .field("q", &self.modulus.modulus())
            .field("ntt", &self.ntt.is_some())
            .finish()
    }
}
