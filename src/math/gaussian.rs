//! Discrete Gaussian sampling
//!
//! Provides a sampler for the discrete Gaussian distribution over Z,
//! used for secrets and error terms in both schemes.

use rand::Rng;

use crate::error::{param_err, Result};

/// Default Gaussian standard deviation
pub const DEFAULT_SIGMA: f64 = 3.2;

/// Samples are rejected beyond this many standard deviations
pub const TAILCUT: f64 = 6.0;

/// Discrete Gaussian sampler over Z using rejection sampling.
///
/// The sampler holds no randomness of its own; every call takes the
/// caller's random source, so equal seeds reproduce equal samples.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiscreteGaussian {
    /// Standard deviation σ
    sigma: f64,
    /// Largest magnitude ever returned, `ceil(6σ)`
    bound: i64,
}

impl DiscreteGaussian {
    pub fn new(sigma: f64) -> Result<Self> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(param_err!("error standard deviation {} must be positive", sigma));
        }
        Ok(Self {
            sigma,
            bound: (sigma * TAILCUT).ceil() as i64,
        })
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Largest magnitude a sample can have
    pub fn bound(&self) -> i64 {
        self.bound
    }

    /// Sample a single value from D_σ, centered at zero
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        let sigma_sq_2 = 2.0 * self.sigma * self.sigma;

        loop {
            let x = rng.gen_range(-self.bound..=self.bound);

            // Accept with probability exp(-x²/(2σ²)), squaring in f64
            let xf = x as f64;
            let prob = (-(xf * xf) / sigma_sq_2).exp();
            let u: f64 = rng.gen();
            if u < prob {
                return x;
            }
        }
    }

    /// Sample `len` independent values
    pub fn sample_vec<R: Rng + ?Sized>(&self, len: usize, rng: &mut R) -> Vec<i64> {
        (0..len).map(|_| self.sample(rng)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use std::collections::HashMap;

    #[test]
    fn test_basic_sampling() {
        let sampler = DiscreteGaussian::new(DEFAULT_SIGMA).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(1);

        let tailcut_bound = (6.0 * DEFAULT_SIGMA).ceil() as i64;
        for _ in 0..1000 {
            let s = sampler.sample(&mut rng);
            assert!(
                s.abs() <= tailcut_bound,
                "Sample {} exceeds tailcut bound {}",
                s,
                tailcut_bound
            );
        }
    }

    #[test]
    fn test_deterministic_seeding() {
        let sampler = DiscreteGaussian::new(DEFAULT_SIGMA).unwrap();
        let mut rng1 = ChaCha20Rng::seed_from_u64(12345);
        let mut rng2 = ChaCha20Rng::seed_from_u64(12345);

        assert_eq!(
            sampler.sample_vec(100, &mut rng1),
            sampler.sample_vec(100, &mut rng2)
        );
    }

    #[test]
    fn test_mean_and_variance() {
        let sampler = DiscreteGaussian::new(DEFAULT_SIGMA).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let samples = sampler.sample_vec(20000, &mut rng);

        let mean = samples.iter().sum::<i64>() as f64 / samples.len() as f64;
        let var = samples
            .iter()
            .map(|&x| (x as f64 - mean).powi(2))
            .sum::<f64>()
            / samples.len() as f64;

        assert!(mean.abs() < 0.2, "mean {} too far from zero", mean);
        let expected = DEFAULT_SIGMA * DEFAULT_SIGMA;
        assert!(
            (var - expected).abs() < expected * 0.1,
            "variance {} too far from {}",
            var,
            expected
        );
    }

    #[test]
    fn test_symmetry() {
        let sampler = DiscreteGaussian::new(DEFAULT_SIGMA).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let mut counts: HashMap<i64, usize> = HashMap::new();
        for s in sampler.sample_vec(20000, &mut rng) {
            *counts.entry(s).or_default() += 1;
        }

        let pos = counts.get(&1).copied().unwrap_or(0) as f64;
        let neg = counts.get(&-1).copied().unwrap_or(0) as f64;
        assert!((pos - neg).abs() / (pos + neg) < 0.1);

        // Mass falls off away from zero
        let zero = counts.get(&0).copied().unwrap_or(0);
        let four = counts.get(&4).copied().unwrap_or(0);
        let twelve = counts.get(&12).copied().unwrap_or(0);
        assert!(zero > four && four > twelve);
    }

    #[test]
    fn test_wide_sigma_stays_within_bound() {
        // ceil(6σ)² no longer fits in an i64
        let sampler = DiscreteGaussian::new(1e10).unwrap();
        assert!(sampler.bound() > 3_100_000_000);
        let mut rng = ChaCha20Rng::seed_from_u64(99);

        let samples = sampler.sample_vec(200, &mut rng);
        assert!(samples.iter().all(|s| s.abs() <= sampler.bound()));
        assert!(samples.iter().any(|&s| s != 0));
    }

    #[test]
    fn test_rejects_invalid_sigma() {
        assert!(DiscreteGaussian::new(0.0).is_err());
        assert!(DiscreteGaussian::new(-1.0).is_err());
        assert!(DiscreteGaussian::new(f64::NAN).is_err());
    }
}
