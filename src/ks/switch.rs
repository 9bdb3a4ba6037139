//! Key-switching operation

use tracing::trace;

use super::setup::EvalKey;
use crate::ciphertext::CipherText;
use crate::error::{shape_err, Result};
use crate::math::{NativeModulus, RingElement};
use crate::params::ensure_same;

/// Split every coefficient of `poly` into `count` base-`2^window` digits.
///
/// Returns one element per digit position; element `i` holds digit `i` of
/// every coefficient, so `Σ result[i] · 2^(i·window) = poly` whenever
/// `q < 2^(count·window)`.
pub fn decompose(
    poly: &RingElement<NativeModulus>,
    window: u32,
    count: usize,
) -> Vec<RingElement<NativeModulus>> {
    let mask = (1u64 << window) - 1;
    (0..count)
        .map(|i| {
            let shift = i as u32 * window;
            let coeffs = poly
                .coeffs()
                .iter()
                .map(|&c| c.checked_shr(shift).unwrap_or(0) & mask)
                .collect();
            RingElement::from_raw(poly.ring(), coeffs)
        })
        .collect()
}

/// Switch the last component of `ct` to the key `ek` was generated for.
///
/// A three-component ciphertext keeps `(c0, c1)` and folds `c2` in; a
/// two-component ciphertext keeps `c0` and folds `c1` in. The result is
/// always linear.
pub fn key_switch(ek: &EvalKey, ct: &CipherText) -> Result<CipherText> {
    ensure_same(ek.params(), ct.params())?;
    let params = ct.params();
    let parts = ct.parts();

    let (mut c0, mut c1, last) = match parts {
        [c0, last] => (c0.clone(), RingElement::zero(params.ciphertext_ring()), last),
        [c0, c1, last] => (c0.clone(), c1.clone(), last),
        _ => {
            return Err(shape_err!(
                "key switching needs 2 or 3 components, got {}",
                parts.len()
            ))
        }
    };

    let digits = decompose(last, params.relin_window(), ek.len());
    for ((digit, a), b) in digits.iter().zip(ek.a()).zip(ek.b()) {
        c0 = &c0 + &(a * digit);
        c1 = &c1 + &(b * digit);
    }

    trace!(components = parts.len(), digits = digits.len(), "key switched");
    Ok(CipherText::from_parts(params, vec![c0, c1]))
}

/// Bring a ciphertext back to two components.
///
/// Linear ciphertexts are returned unchanged; three-component ones are key
/// switched with the relinearization key.
pub fn relinearize(ek: &EvalKey, ct: &CipherText) -> Result<CipherText> {
    match ct.len() {
        2 => {
            ensure_same(ek.params(), ct.params())?;
            Ok(ct.clone())
        }
        3 => key_switch(ek, ct),
        n => Err(shape_err!("cannot relinearize a {}-component ciphertext", n)),
    }
}
