//! Scheme parameters
//!
//! A [`SchemeParameters`] bundles the three rings every operation works in
//! (ciphertext ring `R_q`, plaintext ring `R_p`, auxiliary ring `R_Q` for the
//! tensor product), together with the error width and the relinearization
//! digit size. It is validated once, at construction, and shared by `Arc`
//! between keys and ciphertexts afterwards.

mod search;

use std::sync::Arc;

use num_bigint::BigUint;
use num_integer::Integer;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{param_err, shape_err, Result};
use crate::math::{BigModulus, DiscreteGaussian, ModularInteger, NativeModulus, Ring, RingElement};

pub use search::{GeneratedParameters, ParamsGenerator};

/// Plaintexts are elements of the plaintext ring `Z_p[X]/(X^n + 1)`
pub type Plaintext = RingElement<NativeModulus>;

/// Largest accepted relinearization window, in bits
pub const MAX_RELIN_WINDOW: u32 = 62;

/// Serializable description of a parameter set.
///
/// The auxiliary modulus usually exceeds 64 bits and is written as a decimal
/// string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamsConfig {
    /// Ring dimension n (power of two)
    pub ring_dim: usize,

    /// Ciphertext modulus q, an NTT-friendly prime: q ≡ 1 (mod 2n)
    pub ciphertext_modulus: u64,

    /// Auxiliary modulus Q for multiplication, NTT-friendly and Q > p·n·q²
    pub big_modulus: String,

    /// Plaintext modulus p, coprime to q
    pub plaintext_modulus: u64,

    /// Standard deviation of the error distribution
    pub error_std_dev: f64,

    /// Relinearization digit width r (decomposition base 2^r)
    pub relin_window: u32,
}

/// Immutable parameter bundle shared by keys and ciphertexts.
#[derive(Debug)]
pub struct SchemeParameters {
    ciphertext_ring: Arc<Ring<NativeModulus>>,
    big_ring: Arc<Ring<BigModulus>>,
    plaintext_ring: Arc<Ring<NativeModulus>>,
    relin_window: u32,
    error: DiscreteGaussian,
    /// Δ = ⌊q/p⌋
    delta: u64,
}

impl SchemeParameters {
    /// Validate and build a parameter set.
    ///
    /// Fails with [`HeError::Parameter`](crate::HeError::Parameter) when the
    /// dimension is not a power of two, either NTT modulus admits no
    /// primitive 2n-th root of unity, `p` and `q` share a factor, the
    /// auxiliary modulus is too small for a tensor product, or the window or
    /// error width is out of range.
    pub fn new(
        ring_dim: usize,
        ciphertext_modulus: u64,
        big_modulus: BigUint,
        plaintext_modulus: u64,
        error_std_dev: f64,
        relin_window: u32,
    ) -> Result<Self> {
        let q = ciphertext_modulus;
        let p = plaintext_modulus;

        if p < 2 {
            return Err(param_err!("plaintext modulus {} must be at least 2", p));
        }
        if p.gcd(&q) != 1 {
            return Err(param_err!(
                "plaintext modulus {} is not coprime to ciphertext modulus {}",
                p,
                q
            ));
        }
        if p >= q {
            return Err(param_err!(
                "plaintext modulus {} must be smaller than ciphertext modulus {}",
                p,
                q
            ));
        }
        if relin_window == 0 || relin_window > MAX_RELIN_WINDOW {
            return Err(param_err!(
                "relinearization window {} must lie in [1, {}]",
                relin_window,
                MAX_RELIN_WINDOW
            ));
        }
        let error = DiscreteGaussian::new(error_std_dev)?;
        if error.bound() as u64 >= q / 2 {
            return Err(param_err!(
                "error bound {} (6σ) must stay below q/2 = {}",
                error.bound(),
                q / 2
            ));
        }

        let plaintext_ring = Ring::new(ring_dim, NativeModulus::new(p)?)?;
        let ciphertext_ring = Ring::with_ntt(ring_dim, NativeModulus::new(q)?)?;

        // Balanced tensor coefficients stay below n·q²/2; the extra factor p
        // leaves room for the scaled product p·t as well.
        let tensor_bound = BigUint::from(p) * BigUint::from(ring_dim) * BigUint::from(q).pow(2);
        if big_modulus <= tensor_bound {
            return Err(param_err!(
                "auxiliary modulus {} must exceed p·n·q² = {}",
                big_modulus,
                tensor_bound
            ));
        }
        let big_ring = Ring::with_ntt(ring_dim, BigModulus::new(big_modulus)?)?;

        let params = Self {
            ciphertext_ring: Arc::new(ciphertext_ring),
            big_ring: Arc::new(big_ring),
            plaintext_ring: Arc::new(plaintext_ring),
            relin_window,
            error,
            delta: q / p,
        };
        debug!(
            n = ring_dim,
            q,
            p,
            big_bits = params.big_modulus().bits(),
            relin_window,
            digits = params.relin_digits(),
            "scheme parameters validated"
        );
        Ok(params)
    }

    /// Toy parameters: n = 8, q = 16369, p = 2.
    ///
    /// Large enough for encryption, addition and decryption; not secure.
    pub fn toy() -> Result<Self> {
        Self::new(8, 16369, BigUint::from(17179869409u64), 2, 3.2, 4)
    }

    /// Small parameters with room for one multiplication: n = 32, 50-bit q, p = 256.
    ///
    /// Not secure; intended for tests and demonstrations.
    pub fn small() -> Result<Self> {
        let big = BigModulus::from_decimal("20769187434139310514121985316880513")?;
        Self::new(32, 1125899906842177, big.value().clone(), 256, 3.2, 16)
    }

    pub fn from_config(config: &ParamsConfig) -> Result<Self> {
        let big = BigModulus::from_decimal(&config.big_modulus)?;
        Self::new(
            config.ring_dim,
            config.ciphertext_modulus,
            big.value().clone(),
            config.plaintext_modulus,
            config.error_std_dev,
            config.relin_window,
        )
    }

    pub fn to_config(&self) -> ParamsConfig {
        ParamsConfig {
            ring_dim: self.ring_dim(),
            ciphertext_modulus: self.ciphertext_modulus(),
            big_modulus: self.big_modulus().to_str_radix(10),
            plaintext_modulus: self.plaintext_modulus(),
            error_std_dev: self.error_std_dev(),
            relin_window: self.relin_window,
        }
    }

    /// Ring dimension n
    pub fn ring_dim(&self) -> usize {
        self.ciphertext_ring.dimension()
    }

    /// Ciphertext modulus q
    pub fn ciphertext_modulus(&self) -> u64 {
        self.ciphertext_ring.modulus().value()
    }

    /// Plaintext modulus p
    pub fn plaintext_modulus(&self) -> u64 {
        self.plaintext_ring.modulus().value()
    }

    /// Auxiliary modulus Q
    pub fn big_modulus(&self) -> &BigUint {
        self.big_ring.modulus().value()
    }

    pub fn ciphertext_ring(&self) -> &Arc<Ring<NativeModulus>> {
        &self.ciphertext_ring
    }

    pub fn plaintext_ring(&self) -> &Arc<Ring<NativeModulus>> {
        &self.plaintext_ring
    }

    pub fn big_ring(&self) -> &Arc<Ring<BigModulus>> {
        &self.big_ring
    }

    /// Scaling factor Δ = ⌊q/p⌋
    pub fn delta(&self) -> u64 {
        self.delta
    }

    pub fn error_std_dev(&self) -> f64 {
        self.error.sigma()
    }

    pub fn gaussian(&self) -> &DiscreteGaussian {
        &self.error
    }

    /// Relinearization digit width r
    pub fn relin_window(&self) -> u32 {
        self.relin_window
    }

    /// Number of relinearization digits w = ⌈log_{2^r}(q)⌉
    pub fn relin_digits(&self) -> usize {
        let bits = self.ciphertext_ring.modulus().bits() as u32;
        bits.div_ceil(self.relin_window) as usize
    }

    /// Build a plaintext from values, each reduced modulo p.
    ///
    /// Fewer than n values are padded with zeros.
    pub fn plaintext(&self, values: &[u64]) -> Result<Plaintext> {
        RingElement::from_u64_coeffs(&self.plaintext_ring, values)
    }

    /// Check that `m` belongs to this parameter set's plaintext ring
    pub(crate) fn check_plaintext(&self, m: &Plaintext) -> Result<()> {
        if m.ring() != &self.plaintext_ring {
            return Err(shape_err!(
                "plaintext ring {:?} does not match {:?}",
                m.ring(),
                self.plaintext_ring
            ));
        }
        Ok(())
    }
}

impl PartialEq for SchemeParameters {
    fn eq(&self, other: &Self) -> bool {
        self.ciphertext_ring == other.ciphertext_ring
            && self.plaintext_ring == other.plaintext_ring
            && self.big_ring == other.big_ring
            && self.relin_window == other.relin_window
            && self.error == other.error
    }
}

/// Ensure two parameter handles describe the same cryptosystem
pub(crate) fn ensure_same(a: &Arc<SchemeParameters>, b: &Arc<SchemeParameters>) -> Result<()> {
    if Arc::ptr_eq(a, b) || a == b {
        Ok(())
    } else {
        Err(shape_err!(
            "operands use different parameters (n = {}, q = {}) vs (n = {}, q = {})",
            a.ring_dim(),
            a.ciphertext_modulus(),
            b.ring_dim(),
            b.ciphertext_modulus()
        ))
    }
}
