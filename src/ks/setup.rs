//! Evaluation key generation

use std::sync::Arc;

use num_bigint::BigUint;
use num_traits::One;
use rand::Rng;
use tracing::debug;

use crate::error::{shape_err, Result};
use crate::keys::PrivateKey;
use crate::math::{sample_discrete_gaussian, sample_uniform, ModularInteger, NativeModulus, RingElement};
use crate::params::SchemeParameters;

type Elem = RingElement<NativeModulus>;

/// Key-switching key from some secret expression to a new secret.
///
/// `a` holds the masked digit terms and `b` the raw uniform terms; key
/// switching consumes them in exactly those roles.
#[derive(Clone, Debug)]
pub struct EvalKey {
    params: Arc<SchemeParameters>,
    a: Vec<Elem>,
    b: Vec<Elem>,
}

impl EvalKey {
    pub fn params(&self) -> &Arc<SchemeParameters> {
        &self.params
    }

    /// Masked digit terms
    pub fn a(&self) -> &[Elem] {
        &self.a
    }

    /// Uniform terms
    pub fn b(&self) -> &[Elem] {
        &self.b
    }

    /// Number of digits w
    pub fn len(&self) -> usize {
        self.a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }
}

/// Generate an evaluation key for `old_secret` under `new_key`.
///
/// For each digit `i`, `mask(d_i, a_i, e_i, s')` produces the masked term,
/// where `d_i = old_secret · 2^(i·r)`, `a_i` is uniform and `e_i` Gaussian.
pub(crate) fn generate_eval_key<R, F>(
    rng: &mut R,
    old_secret: &Elem,
    new_key: &PrivateKey,
    mask: F,
) -> Result<EvalKey>
where
    R: Rng + ?Sized,
    F: Fn(&Elem, &Elem, &Elem, &Elem) -> Elem,
{
    let params = new_key.params();
    let ring = params.ciphertext_ring();
    if old_secret.ring() != ring {
        return Err(shape_err!(
            "secret expression ring {:?} does not match key ring {:?}",
            old_secret.ring(),
            ring
        ));
    }

    let window = params.relin_window() as usize;
    let digits = params.relin_digits();
    let modulus = ring.modulus();

    let mut a = Vec::with_capacity(digits);
    let mut b = Vec::with_capacity(digits);
    for i in 0..digits {
        let scale = modulus.from_biguint(&(BigUint::one() << (i * window)));
        let digit = old_secret.scalar_mul(&scale);

        let a_i = sample_uniform(ring, rng);
        let e_i = sample_discrete_gaussian(ring, params.gaussian(), rng);

        a.push(mask(&digit, &a_i, &e_i, new_key.secret()));
        b.push(a_i);
    }

    debug!(digits, window, "generated evaluation key");
    Ok(EvalKey {
        params: Arc::clone(params),
        a,
        b,
    })
}
