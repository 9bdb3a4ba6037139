//! Key types
//!
//! Keys are generated by a [`Scheme`](crate::Scheme) implementation and never
//! change afterwards. The relation between the public key and the secret
//! differs between BFV (`b = -(a·s + e)`) and BGV (`b = a·s + p·e`), which is
//! why generation lives with the schemes and only the containers live here.

use std::sync::Arc;

use crate::ciphertext::CipherText;
use crate::error::{shape_err, Result};
use crate::math::{NativeModulus, RingElement};
use crate::params::{ensure_same, SchemeParameters};

/// Secret key with small (Gaussian) coefficients
#[derive(Clone, Debug)]
pub struct PrivateKey {
    params: Arc<SchemeParameters>,
    secret: RingElement<NativeModulus>,
}

/// Public encryption key `(a, b)`
#[derive(Clone, Debug)]
pub struct PublicKey {
    params: Arc<SchemeParameters>,
    a: RingElement<NativeModulus>,
    b: RingElement<NativeModulus>,
}

/// Matching secret and public key
#[derive(Clone, Debug)]
pub struct KeyPair {
    pub private: PrivateKey,
    pub public: PublicKey,
}

impl PrivateKey {
    pub(crate) fn new(params: &Arc<SchemeParameters>, secret: RingElement<NativeModulus>) -> Self {
        Self {
            params: Arc::clone(params),
            secret,
        }
    }

    pub fn params(&self) -> &Arc<SchemeParameters> {
        &self.params
    }

    pub fn secret(&self) -> &RingElement<NativeModulus> {
        &self.secret
    }

    /// `Σ s^i · parts[i]`, evaluated by Horner's rule
    pub(crate) fn horner(&self, parts: &[RingElement<NativeModulus>]) -> RingElement<NativeModulus> {
        let mut iter = parts.iter().rev();
        let mut acc = match iter.next() {
            Some(last) => last.clone(),
            None => return RingElement::zero(self.params.ciphertext_ring()),
        };
        for part in iter {
            acc = &(&acc * &self.secret) + part;
        }
        acc
    }

    /// Check that `ct` was produced under this key's parameters
    pub(crate) fn check(&self, ct: &CipherText) -> Result<()> {
        ensure_same(&self.params, ct.params())
    }

    /// Re-embed the secret under another parameter set with the same
    /// dimension and plaintext modulus.
    ///
    /// The secret is small, so its balanced coefficients carry over exactly.
    /// This is the key that decrypts ciphertexts moved by
    /// [`Bfv::mod_switch`](crate::Bfv::mod_switch).
    pub fn switch_params(&self, target: &Arc<SchemeParameters>) -> Result<PrivateKey> {
        if target.ring_dim() != self.params.ring_dim()
            || target.plaintext_modulus() != self.params.plaintext_modulus()
        {
            return Err(shape_err!(
                "cannot move a key from (n = {}, p = {}) to (n = {}, p = {})",
                self.params.ring_dim(),
                self.params.plaintext_modulus(),
                target.ring_dim(),
                target.plaintext_modulus()
            ));
        }
        Ok(PrivateKey::new(
            target,
            self.secret.switch_modulus(target.ciphertext_ring()),
        ))
    }
}

impl PublicKey {
    pub(crate) fn new(
        params: &Arc<SchemeParameters>,
        a: RingElement<NativeModulus>,
        b: RingElement<NativeModulus>,
    ) -> Self {
        Self {
            params: Arc::clone(params),
            a,
            b,
        }
    }

    pub fn params(&self) -> &Arc<SchemeParameters> {
        &self.params
    }

    /// Uniform mask
    pub fn a(&self) -> &RingElement<NativeModulus> {
        &self.a
    }

    /// Masked secret
    pub fn b(&self) -> &RingElement<NativeModulus> {
        &self.b
    }
}
