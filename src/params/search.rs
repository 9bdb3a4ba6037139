//! Heuristic parameter generation
//!
//! Picks the ring dimension and moduli for a target security level and
//! multiplicative depth. The search is a fixed point over the ring dimension:
//! for the current `n` it recomputes the ciphertext modulus size the noise
//! growth requires, then the smallest dimension that modulus size is secure
//! at, and doubles `n` until the two agree.

use num_bigint::BigUint;
use tracing::debug;

use super::SchemeParameters;
use crate::error::{param_err, Result};
use crate::math::gaussian::TAILCUT;
use crate::math::{ntt_prime_above, ntt_prime_below, DEFAULT_SIGMA};

/// Largest ciphertext modulus the native backing is used with, in bits
const MAX_LOG_Q: u32 = 62;

/// Rounds of the digit-count refinement per dimension
const DIGIT_ROUNDS: usize = 16;

/// Target description for [`ParamsGenerator::generate`]
#[derive(Debug, Clone)]
pub struct ParamsGenerator {
    /// Target security level λ in bits
    pub security_bits: u32,
    /// Number of sequential multiplications to support
    pub depth: u32,
    pub plain_modulus: u64,
    pub error_std_dev: f64,
    pub relin_window: u32,
    /// First dimension tried (power of two)
    pub min_ring_dim: usize,
    /// Search fails beyond this dimension
    pub max_ring_dim: usize,
}

/// Outcome of the dimension search, before any prime is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratedParameters {
    pub ring_dim: usize,
    /// Bits of the ciphertext modulus
    pub log_q: u32,
    /// Relinearization digits at this modulus size
    pub relin_digits: usize,
    /// Smallest secure dimension for `log_q`
    pub secure_dim: usize,
}

impl Default for ParamsGenerator {
    fn default() -> Self {
        Self {
            security_bits: 128,
            depth: 1,
            plain_modulus: 256,
            error_std_dev: DEFAULT_SIGMA,
            relin_window: 16,
            min_ring_dim: 1024,
            max_ring_dim: 1 << 15,
        }
    }
}

impl ParamsGenerator {
    pub fn new(security_bits: u32, depth: u32, plain_modulus: u64) -> Self {
        Self {
            security_bits,
            depth,
            plain_modulus,
            ..Self::default()
        }
    }

    /// Run the dimension search.
    ///
    /// Fails when the required modulus outgrows the native width, or when
    /// no dimension up to `max_ring_dim` is secure for it.
    pub fn search(&self) -> Result<GeneratedParameters> {
        if !self.min_ring_dim.is_power_of_two() || self.min_ring_dim < 2 {
            return Err(param_err!(
                "minimum ring dimension {} must be a power of two",
                self.min_ring_dim
            ));
        }
        if self.plain_modulus < 2 || self.relin_window == 0 || self.error_std_dev <= 0.0 {
            return Err(param_err!("invalid generator target {:?}", self));
        }

        let mut n = self.min_ring_dim;
        loop {
            let (log_q, relin_digits) = self.modulus_bits(n);
            if log_q > MAX_LOG_Q {
                return Err(param_err!(
                    "depth {} needs a {}-bit modulus at n = {}, beyond the {}-bit limit",
                    self.depth,
                    log_q,
                    n,
                    MAX_LOG_Q
                ));
            }

            let secure_dim = self.secure_dimension(log_q);
            debug!(n, log_q, secure_dim, "parameter search step");
            if secure_dim <= n {
                return Ok(GeneratedParameters {
                    ring_dim: n,
                    log_q,
                    relin_digits,
                    secure_dim,
                });
            }

            n *= 2;
            if n > self.max_ring_dim {
                return Err(param_err!(
                    "no ring dimension up to {} is secure for a {}-bit modulus",
                    self.max_ring_dim,
                    log_q
                ));
            }
        }
    }

    /// Run the search and pick concrete NTT-friendly primes for the result
    pub fn generate(&self) -> Result<SchemeParameters> {
        let found = self.search()?;
        let n = found.ring_dim;

        let q = ntt_prime_below(&(BigUint::from(1u32) << found.log_q), n)?;
        let q = u64::try_from(&q).map_err(|_| param_err!("modulus {} exceeds 64 bits", q))?;

        let tensor_bound = BigUint::from(self.plain_modulus) * BigUint::from(n) * BigUint::from(q).pow(2);
        let big = ntt_prime_above(&tensor_bound, n)?;

        debug!(n, q, big_bits = big.bits(), "generated parameters");
        SchemeParameters::new(
            n,
            q,
            big,
            self.plain_modulus,
            self.error_std_dev,
            self.relin_window,
        )
    }

    /// Ciphertext modulus bits needed at dimension `n`, with the digit count
    /// refined until it matches the modulus it was computed for.
    fn modulus_bits(&self, n: usize) -> (u32, usize) {
        let mut digits = 1usize;
        let mut log_q = 0;
        for _ in 0..DIGIT_ROUNDS {
            log_q = self.log_q_for(n, digits);
            let next = log_q.div_ceil(self.relin_window) as usize;
            if next == digits {
                break;
            }
            digits = next;
        }
        (log_q, digits)
    }

    fn log_q_for(&self, n: usize, digits: usize) -> u32 {
        let n = n as f64;
        let p = self.plain_modulus as f64;
        let bound = TAILCUT * self.error_std_dev;

        let fresh = 2.0 * bound * bound * n + bound;
        let growth = 4.0 * p * n * bound;
        let relin = digits as f64 * n * 2f64.powi(self.relin_window as i32) * bound;

        let mut noise = fresh;
        for _ in 0..self.depth {
            noise = noise * growth + relin;
        }
        (p.log2() + 1.0 + noise.log2() + 2.0).ceil() as u32
    }

    /// Smallest dimension reaching `security_bits` for a `log_q`-bit modulus
    fn secure_dimension(&self, log_q: u32) -> usize {
        let margin = (log_q as f64 - self.error_std_dev.log2()) * (self.security_bits as f64 + 110.0) / 7.2;
        margin.ceil() as usize
    }
}
