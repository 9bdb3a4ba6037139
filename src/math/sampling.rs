//! Ring element samplers.
//!
//! Uniform elements mask keys and ciphertexts; discrete Gaussian elements are
//! secrets and errors. Randomness always comes from the caller.

use std::sync::Arc;

use rand::Rng;

use super::gaussian::DiscreteGaussian;
use super::modular::ModularInteger;
use super::poly::RingElement;
use super::ring::Ring;

/// Element with every coefficient drawn uniformly from `[0, q)`
pub fn sample_uniform<M, R>(ring: &Arc<Ring<M>>, rng: &mut R) -> RingElement<M>
where
    M: ModularInteger,
    R: Rng + ?Sized,
{
    let m = ring.modulus();
    let coeffs = (0..ring.dimension()).map(|_| m.sample_uniform(rng)).collect();
    RingElement::from_raw(ring, coeffs)
}

/// Element with coefficients from a discrete Gaussian, negatives mapped to `q - |x|`
pub fn sample_discrete_gaussian<M, R>(
    ring: &Arc<Ring<M>>,
    gaussian: &DiscreteGaussian,
    rng: &mut R,
) -> RingElement<M>
where
    M: ModularInteger,
    R: Rng + ?Sized,
{
    let m = ring.modulus();
    let coeffs = (0..ring.dimension())
        .map(|_| m.from_i64(gaussian.sample(rng)))
        .collect();
    RingElement::from_raw(ring, coeffs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::modular::NativeModulus;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    const Q: u64 = 1125899906842177;

    fn ring() -> Arc<Ring<NativeModulus>> {
        Arc::new(Ring::with_ntt(32, NativeModulus::new(Q).unwrap()).unwrap())
    }

    #[test]
    fn test_uniform_in_range_and_deterministic() {
        let r = ring();
        let a = sample_uniform(&r, &mut ChaCha20Rng::seed_from_u64(9));
        let b = sample_uniform(&r, &mut ChaCha20Rng::seed_from_u64(9));
        let c = sample_uniform(&r, &mut ChaCha20Rng::seed_from_u64(10));

        assert!(a.coeffs().iter().all(|&x| x < Q));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_gaussian_is_small() {
        let r = ring();
        let g = DiscreteGaussian::new(3.2).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let e = sample_discrete_gaussian(&r, &g, &mut rng);

        assert!(e.linf_norm() <= num_bigint::BigUint::from(g.bound() as u64));
        // Negative samples wrap to the top of [0, q)
        assert!(e
            .coeffs()
            .iter()
            .all(|&x| x <= g.bound() as u64 || x >= Q - g.bound() as u64));
    }
}
