//! Operations shared by BFV and BGV
//!
//! Both schemes encrypt into the same ciphertext ring and relinearize with
//! the same digit-decomposition key switch. They differ in where the message
//! sits (scaled by Δ in the high bits for BFV, in the low bits with error
//! scaled by `p` for BGV), which changes key generation, encryption,
//! decryption, multiplication and the evaluation key shape.

use std::sync::Arc;

use rand::Rng;

use crate::ciphertext::CipherText;
use crate::error::{shape_err, Result};
use crate::keys::{KeyPair, PrivateKey, PublicKey};
use crate::ks::{self, EvalKey};
use crate::math::{NativeModulus, RingElement};
use crate::params::{ensure_same, Plaintext, SchemeParameters};

/// An RLWE homomorphic encryption scheme over one parameter set.
pub trait Scheme {
    fn params(&self) -> &Arc<SchemeParameters>;

    /// Sample a fresh key pair
    fn keygen<R: Rng + ?Sized>(&self, rng: &mut R) -> KeyPair;

    /// Encrypt a plaintext-ring element under `key`
    fn encrypt<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        key: &PublicKey,
        plaintext: &Plaintext,
    ) -> Result<CipherText>;

    /// Decrypt a ciphertext of any length.
    ///
    /// Never reports noise overflow: a ciphertext past its budget silently
    /// decrypts to a wrong plaintext.
    fn decrypt(&self, key: &PrivateKey, ct: &CipherText) -> Result<Plaintext>;

    /// Multiply two linear ciphertexts into a three-component one
    fn multiply(&self, a: &CipherText, b: &CipherText) -> Result<CipherText>;

    /// Evaluation key that switches ciphertexts pairing with `old_secret`
    /// over to `new_key`
    fn make_eval_key<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        old_secret: &RingElement<NativeModulus>,
        new_key: &PrivateKey,
    ) -> Result<EvalKey>;

    /// Remaining noise headroom in bits; non-positive means decryption is
    /// expected to fail
    fn noise_budget(&self, key: &PrivateKey, ct: &CipherText) -> Result<f64>;

    /// Relinearization key: an evaluation key for `s²`
    fn make_relin_key<R: Rng + ?Sized>(&self, rng: &mut R, key: &PrivateKey) -> Result<EvalKey> {
        let squared = key.secret() * key.secret();
        self.make_eval_key(rng, &squared, key)
    }

    fn add(&self, a: &CipherText, b: &CipherText) -> Result<CipherText> {
        ensure_same(self.params(), a.params())?;
        a.add(b)
    }

    fn sub(&self, a: &CipherText, b: &CipherText) -> Result<CipherText> {
        ensure_same(self.params(), a.params())?;
        a.sub(b)
    }

    fn negate(&self, a: &CipherText) -> Result<CipherText> {
        ensure_same(self.params(), a.params())?;
        Ok(a.negate())
    }

    fn key_switch(&self, ek: &EvalKey, ct: &CipherText) -> Result<CipherText> {
        ensure_same(self.params(), ct.params())?;
        ks::key_switch(ek, ct)
    }

    fn relinearize(&self, ek: &EvalKey, ct: &CipherText) -> Result<CipherText> {
        ensure_same(self.params(), ct.params())?;
        ks::relinearize(ek, ct)
    }

    /// Multiply and relinearize in one step
    fn multiply_relin(&self, ek: &EvalKey, a: &CipherText, b: &CipherText) -> Result<CipherText> {
        let product = self.multiply(a, b)?;
        self.relinearize(ek, &product)
    }
}

/// Both operands belong to `params` and are linear
pub(crate) fn check_multiplicands(
    params: &Arc<SchemeParameters>,
    a: &CipherText,
    b: &CipherText,
) -> Result<()> {
    ensure_same(params, a.params())?;
    ensure_same(params, b.params())?;
    if !a.is_linear() || !b.is_linear() {
        return Err(shape_err!(
            "multiplication needs linear ciphertexts, got {} and {} components",
            a.len(),
            b.len()
        ));
    }
    Ok(())
}
