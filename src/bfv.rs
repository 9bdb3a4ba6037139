//! BFV scheme
//!
//! The message sits in the high-order bits: a linear ciphertext `(c0, c1)`
//! satisfies `c0 + c1·s = Δ·m + v (mod q)` for small noise `v`, and
//! decryption rounds `p·(c0 + c1·s)/q`.
//!
//! Multiplication lifts both operands into the auxiliary ring, where the
//! tensor product cannot wrap around, scales by `p/q` with
//! round-half-away-from-zero on balanced coefficients, and comes back down
//! to the ciphertext ring as a three-component ciphertext.

use std::sync::Arc;

use num_bigint::BigUint;
use rand::Rng;
use tracing::{debug, trace};

use crate::ciphertext::CipherText;
use crate::error::{shape_err, Result};
use crate::keys::{KeyPair, PrivateKey, PublicKey};
use crate::ks::{generate_eval_key, EvalKey};
use crate::math::{
    sample_discrete_gaussian, sample_uniform, BigModulus, ModularInteger, NativeModulus,
    RingElement,
};
use crate::params::{ensure_same, Plaintext, SchemeParameters};
use crate::scheme::{check_multiplicands, Scheme};

/// BFV over one parameter set
#[derive(Clone, Debug)]
pub struct Bfv {
    params: Arc<SchemeParameters>,
}

impl Bfv {
    pub fn new(params: Arc<SchemeParameters>) -> Self {
        Self { params }
    }

    /// Move a ciphertext to another ciphertext modulus.
    ///
    /// `target` must share the ring dimension and plaintext modulus. Every
    /// coefficient becomes `round(q'·c/q)` on its balanced value. The result
    /// decrypts under [`PrivateKey::switch_params`] of the original key.
    pub fn mod_switch(&self, ct: &CipherText, target: &Arc<SchemeParameters>) -> Result<CipherText> {
        ensure_same(&self.params, ct.params())?;
        if target.ring_dim() != self.params.ring_dim()
            || target.plaintext_modulus() != self.params.plaintext_modulus()
        {
            return Err(shape_err!(
                "modulus switch needs equal n and p, got (n = {}, p = {}) and (n = {}, p = {})",
                self.params.ring_dim(),
                self.params.plaintext_modulus(),
                target.ring_dim(),
                target.plaintext_modulus()
            ));
        }

        let num = BigUint::from(target.ciphertext_modulus());
        let den = BigUint::from(self.params.ciphertext_modulus());
        let parts = ct
            .parts()
            .iter()
            .map(|c| c.scale_round(&num, &den, target.ciphertext_ring()))
            .collect();

        trace!(
            from = self.params.ciphertext_modulus(),
            to = target.ciphertext_modulus(),
            "modulus switched"
        );
        Ok(CipherText::from_parts(target, parts))
    }

    /// Δ·m in the ciphertext ring
    fn embed(&self, plaintext: &Plaintext) -> RingElement<NativeModulus> {
        let ring = self.params.ciphertext_ring();
        let lifted: Vec<u64> = plaintext
            .coeffs()
            .iter()
            .map(|&c| ring.modulus().from_u64(c))
            .collect();
        RingElement::from_raw(ring, lifted).scalar_mul(&self.params.delta())
    }
}

impl Scheme for Bfv {
    fn params(&self) -> &Arc<SchemeParameters> {
        &self.params
    }

    fn keygen<R: Rng + ?Sized>(&self, rng: &mut R) -> KeyPair {
        let params = &self.params;
        let ring = params.ciphertext_ring();

        let a = sample_uniform(ring, rng);
        let s = sample_discrete_gaussian(ring, params.gaussian(), rng);
        let e = sample_discrete_gaussian(ring, params.gaussian(), rng);

        // b = -(a·s + e)
        let b = -&(&(&a * &s) + &e);

        debug!(n = params.ring_dim(), q = params.ciphertext_modulus(), "generated BFV key pair");
        KeyPair {
            private: PrivateKey::new(params, s),
            public: PublicKey::new(params, a, b),
        }
    }

    fn encrypt<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        key: &PublicKey,
        plaintext: &Plaintext,
    ) -> Result<CipherText> {
        let params = &self.params;
        ensure_same(params, key.params())?;
        params.check_plaintext(plaintext)?;

        let ring = params.ciphertext_ring();
        let u = sample_discrete_gaussian(ring, params.gaussian(), rng);
        let e1 = sample_discrete_gaussian(ring, params.gaussian(), rng);
        let e2 = sample_discrete_gaussian(ring, params.gaussian(), rng);

        let c0 = &(&(key.b() * &u) + &e1) + &self.embed(plaintext);
        let c1 = &(key.a() * &u) + &e2;
        Ok(CipherText::from_parts(params, vec![c0, c1]))
    }

    fn decrypt(&self, key: &PrivateKey, ct: &CipherText) -> Result<Plaintext> {
        let params = &self.params;
        ensure_same(params, key.params())?;
        key.check(ct)?;

        let phase = key.horner(ct.parts());
        Ok(phase.scale_round(
            &BigUint::from(params.plaintext_modulus()),
            &BigUint::from(params.ciphertext_modulus()),
            params.plaintext_ring(),
        ))
    }

    fn multiply(&self, a: &CipherText, b: &CipherText) -> Result<CipherText> {
        let params = &self.params;
        check_multiplicands(params, a, b)?;

        let big = params.big_ring();
        let lift = |ct: &CipherText| -> Vec<RingElement<BigModulus>> {
            ct.parts().iter().map(|c| c.switch_modulus(big)).collect()
        };
        let tensor = tensor_product(&lift(a), &lift(b));

        let p = BigUint::from(params.plaintext_modulus());
        let q = BigUint::from(params.ciphertext_modulus());
        let parts: Vec<_> = tensor
            .iter()
            .map(|t| t.scale_round(&p, &q, params.ciphertext_ring()))
            .collect();

        trace!(components = parts.len(), "BFV multiply");
        Ok(CipherText::from_parts(params, parts))
    }

    fn make_eval_key<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        old_secret: &RingElement<NativeModulus>,
        new_key: &PrivateKey,
    ) -> Result<EvalKey> {
        ensure_same(&self.params, new_key.params())?;
        // a[i] = d_i − a_i·s' − e_i
        generate_eval_key(rng, old_secret, new_key, |digit, a, e, s| {
            &(digit - &(a * s)) - e
        })
    }

    /// Residuals are taken from the canonical `[0, q)` phase against multiples of Δ, so
    /// when p does not divide q a small negative noise reads `q mod p` too large.
    fn noise_budget(&self, key: &PrivateKey, ct: &CipherText) -> Result<f64> {
        let params = &self.params;
        ensure_same(params, key.params())?;
        key.check(ct)?;

        let delta = params.delta();
        let phase = key.horner(ct.parts());
        let max_residual = phase
            .coeffs()
            .iter()
            .map(|&c| {
                let r = c % delta;
                r.min(delta - r)
            })
            .max()
            .unwrap_or(0)
            .max(1);

        let q = params.ciphertext_modulus() as f64;
        let p = params.plaintext_modulus() as f64;
        Ok(q.log2() - p.log2() - 1.0 - (max_residual as f64).log2())
    }
}

/// `out[k] = Σ_{i+j=k} x[i]·y[j]`
fn tensor_product<M: ModularInteger>(x: &[RingElement<M>], y: &[RingElement<M>]) -> Vec<RingElement<M>> {
    let ring = match x.first().or_else(|| y.first()) {
        Some(first) => Arc::clone(first.ring()),
        None => return Vec::new(),
    };
    let len = (x.len() + y.len()).saturating_sub(1);
    let mut out = vec![RingElement::zero(&ring); len];
    for (i, xi) in x.iter().enumerate() {
        for (j, yj) in y.iter().enumerate() {
            let acc = &out[i + j] + &(xi * yj);
            out[i + j] = acc;
        }
    }
    out
}
