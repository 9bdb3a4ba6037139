//! BGV scheme
//!
//! The message sits in the low-order bits and every error term is scaled by
//! the plaintext modulus: a linear ciphertext satisfies
//! `c0 − c1·s = m + p·v (mod q)`, and decryption reduces the balanced phase
//! modulo `p`. Multiplication stays in the ciphertext ring.

use std::sync::Arc;

use num_traits::ToPrimitive;
use rand::Rng;
use tracing::{debug, trace};

use crate::ciphertext::CipherText;
use crate::error::Result;
use crate::keys::{KeyPair, PrivateKey, PublicKey};
use crate::ks::{generate_eval_key, EvalKey};
use crate::math::{
    sample_discrete_gaussian, sample_uniform, ModularInteger, NativeModulus, RingElement,
};
use crate::params::{ensure_same, Plaintext, SchemeParameters};
use crate::scheme::{check_multiplicands, Scheme};

type Elem = RingElement<NativeModulus>;

/// BGV over one parameter set
#[derive(Clone, Debug)]
pub struct Bgv {
    params: Arc<SchemeParameters>,
}

impl Bgv {
    pub fn new(params: Arc<SchemeParameters>) -> Self {
        Self { params }
    }

    /// `p` as a ciphertext-ring scalar
    fn plain_scalar(&self) -> u64 {
        self.params
            .ciphertext_ring()
            .modulus()
            .from_u64(self.params.plaintext_modulus())
    }

    /// Gaussian noise scaled by p
    fn scaled_noise<R: Rng + ?Sized>(&self, rng: &mut R) -> Elem {
        let ring = self.params.ciphertext_ring();
        sample_discrete_gaussian(ring, self.params.gaussian(), rng).scalar_mul(&self.plain_scalar())
    }

    /// `c0 − s·(c1 + s·c2 + …)`
    fn phase(&self, key: &PrivateKey, ct: &CipherText) -> Elem {
        let parts = ct.parts();
        match parts.split_first() {
            Some((c0, [])) => c0.clone(),
            Some((c0, rest)) => c0 - &(key.secret() * &key.horner(rest)),
            None => RingElement::zero(self.params.ciphertext_ring()),
        }
    }
}

impl Scheme for Bgv {
    fn params(&self) -> &Arc<SchemeParameters> {
        &self.params
    }

    fn keygen<R: Rng + ?Sized>(&self, rng: &mut R) -> KeyPair {
        let params = &self.params;
        let ring = params.ciphertext_ring();

        let a = sample_uniform(ring, rng);
        let s = sample_discrete_gaussian(ring, params.gaussian(), rng);
        let pe = self.scaled_noise(rng);

        // b = a·s + p·e
        let b = &(&a * &s) + &pe;

        debug!(n = params.ring_dim(), q = params.ciphertext_modulus(), "generated BGV key pair");
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
        let pe1 = self.scaled_noise(rng);
        let pe2 = self.scaled_noise(rng);
        let m = RingElement::from_u64_coeffs(ring, plaintext.coeffs())?;

        let c0 = &(&(key.b() * &u) + &pe1) + &m;
        let c1 = &(key.a() * &u) + &pe2;
        Ok(CipherText::from_parts(params, vec![c0, c1]))
    }

    fn decrypt(&self, key: &PrivateKey, ct: &CipherText) -> Result<Plaintext> {
        ensure_same(&self.params, key.params())?;
        key.check(ct)?;
        Ok(self
            .phase(key, ct)
            .switch_modulus(self.params.plaintext_ring()))
    }

    fn multiply(&self, a: &CipherText, b: &CipherText) -> Result<CipherText> {
        let params = &self.params;
        check_multiplicands(params, a, b)?;

        let (c0, c1) = (&a.parts()[0], &a.parts()[1]);
        let (d0, d1) = (&b.parts()[0], &b.parts()[1]);
        let parts = vec![
            c0 * d0,
            &(c0 * d1) + &(c1 * d0),
            -&(c1 * d1),
        ];

        trace!("BGV multiply");
        Ok(CipherText::from_parts(params, parts))
    }

    fn make_eval_key<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        old_secret: &RingElement<NativeModulus>,
        new_key: &PrivateKey,
    ) -> Result<EvalKey> {
        ensure_same(&self.params, new_key.params())?;
        let p = self.plain_scalar();
        // a[i] = a_i·s' + p·e_i − d_i
        generate_eval_key(rng, old_secret, new_key, |digit, a, e, s| {
            &(&(a * s) + &e.scalar_mul(&p)) - digit
        })
    }

    fn noise_budget(&self, key: &PrivateKey, ct: &CipherText) -> Result<f64> {
        ensure_same(&self.params, key.params())?;
        key.check(ct)?;

        let norm = self
            .phase(key, ct)
            .linf_norm()
            .to_f64()
            .unwrap_or(f64::INFINITY)
            .max(1.0);
        let q = self.params.ciphertext_modulus() as f64;
        Ok(q.log2() - 1.0 - norm.log2())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HeError;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn small() -> (Arc<SchemeParameters>, Bgv) {
        let params = Arc::new(SchemeParameters::small().unwrap());
        let bgv = Bgv::new(Arc::clone(&params));
        (params, bgv)
    }

    fn message(params: &SchemeParameters, seed: u64) -> Plaintext {
        let values: Vec<u64> = (0..params.ring_dim() as u64)
            .map(|i| (i * i + seed * 29) % params.plaintext_modulus())
            .collect();
        params.plaintext(&values).unwrap()
    }

    #[test]
    fn test_toy_encrypt_one_hundred_trials() {
        let params = Arc::new(SchemeParameters::toy().unwrap());
        let bgv = Bgv::new(Arc::clone(&params));
        let one = params.plaintext(&[1]).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(200);

        for trial in 0..100 {
            let keys = bgv.keygen(&mut rng);
            let ct = bgv.encrypt(&mut rng, &keys.public, &one).unwrap();
            assert_eq!(bgv.decrypt(&keys.private, &ct).unwrap(), one, "trial {}", trial);
        }
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let (params, bgv) = small();
        let mut rng = ChaCha20Rng::seed_from_u64(31);
        let keys = bgv.keygen(&mut rng);

        let m = message(&params, 1);
        let ct = bgv.encrypt(&mut rng, &keys.public, &m).unwrap();
        assert_eq!(bgv.decrypt(&keys.private, &ct).unwrap(), m);
    }

    #[test]
    fn test_public_key_noise_is_multiple_of_p() {
        let (params, bgv) = small();
        let keys = bgv.keygen(&mut ChaCha20Rng::seed_from_u64(32));
        let noise = keys.public.b() - &(keys.public.a() * keys.private.secret());
        let p = params.plaintext_modulus() as i64;
        for c in noise.signed_coeffs() {
            let c = c.to_i64().unwrap();
            assert_eq!(c % p, 0);
        }
    }

    #[test]
    fn test_homomorphic_add_and_sub() {
        let (params, bgv) = small();
        let mut rng = ChaCha20Rng::seed_from_u64(33);
        let keys = bgv.keygen(&mut rng);

        let m1 = message(&params, 2);
        let m2 = message(&params, 3);
        let c1 = bgv.encrypt(&mut rng, &keys.public, &m1).unwrap();
        let c2 = bgv.encrypt(&mut rng, &keys.public, &m2).unwrap();

        let sum = bgv.add(&c1, &c2).unwrap();
        assert_eq!(bgv.decrypt(&keys.private, &sum).unwrap(), &m1 + &m2);
        let diff = bgv.sub(&c1, &c2).unwrap();
        assert_eq!(bgv.decrypt(&keys.private, &diff).unwrap(), &m1 - &m2);
    }

    #[test]
    fn test_multiply_then_relinearize() {
        let (params, bgv) = small();
        let mut rng = ChaCha20Rng::seed_from_u64(34);
        let keys = bgv.keygen(&mut rng);
        let rk = bgv.make_relin_key(&mut rng, &keys.private).unwrap();

        let m1 = message(&params, 4);
        let m2 = message(&params, 5);
        let c1 = bgv.encrypt(&mut rng, &keys.public, &m1).unwrap();
        let c2 = bgv.encrypt(&mut rng, &keys.public, &m2).unwrap();

        let product = bgv.multiply(&c1, &c2).unwrap();
        assert_eq!(product.len(), 3);
        assert_eq!(bgv.decrypt(&keys.private, &product).unwrap(), &m1 * &m2);

        let relin = bgv.relinearize(&rk, &product).unwrap();
        assert_eq!(relin.len(), 2);
        assert_eq!(bgv.decrypt(&keys.private, &relin).unwrap(), &m1 * &m2);
    }

    #[test]
    fn test_noise_budget_decreases() {
        let (params, bgv) = small();
        let mut rng = ChaCha20Rng::seed_from_u64(35);
        let keys = bgv.keygen(&mut rng);

        let ct = bgv.encrypt(&mut rng, &keys.public, &message(&params, 6)).unwrap();
        let fresh = bgv.noise_budget(&keys.private, &ct).unwrap();
        assert!(fresh > 0.0);

        let product = bgv.multiply(&ct, &ct).unwrap();
        let after = bgv.noise_budget(&keys.private, &product).unwrap();
        assert!(after < fresh, "{} !< {}", after, fresh);
        assert!(after > 0.0);
    }

    #[test]
    fn test_noise_budget_of_trivial_ciphertext() {
        // (m, 0) has phase m
        let (params, bgv) = small();
        let keys = bgv.keygen(&mut ChaCha20Rng::seed_from_u64(36));
        let ring = params.ciphertext_ring();
        let ct = CipherText::new(
            &params,
            vec![RingElement::constant(ring, 1), RingElement::zero(ring)],
        )
        .unwrap();

        let q = params.ciphertext_modulus() as f64;
        let budget = bgv.noise_budget(&keys.private, &ct).unwrap();
        assert!((budget - (q.log2() - 1.0)).abs() < 1e-9);
        assert_eq!(
            bgv.decrypt(&keys.private, &ct).unwrap(),
            params.plaintext(&[1]).unwrap()
        );
    }

    #[test]
    fn test_identity_relin_key_on_linear_ciphertext() {
        let (params, bgv) = small();
        let mut rng = ChaCha20Rng::seed_from_u64(37);
        let keys = bgv.keygen(&mut rng);
        let ek = bgv.make_eval_key(&mut rng, keys.private.secret(), &keys.private).unwrap();

        let m = message(&params, 7);
        let ct = bgv.encrypt(&mut rng, &keys.public, &m).unwrap();
        let switched = bgv.key_switch(&ek, &ct).unwrap();
        assert_eq!(bgv.decrypt(&keys.private, &switched).unwrap(), m);
    }

    #[test]
    fn test_multiply_rejects_non_linear_input() {
        let (params, bgv) = small();
        let mut rng = ChaCha20Rng::seed_from_u64(38);
        let keys = bgv.keygen(&mut rng);
        let ct = bgv
            .encrypt(&mut rng, &keys.public, &params.plaintext(&[3]).unwrap())
            .unwrap();
        let product = bgv.multiply(&ct, &ct).unwrap();
        assert!(matches!(
            bgv.multiply(&ct, &product),
            Err(HeError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_keys_from_other_parameters_rejected() {
        let (params, bgv) = small();
        let toy_bgv = Bgv::new(Arc::new(SchemeParameters::toy().unwrap()));
        let mut rng = ChaCha20Rng::seed_from_u64(39);
        let toy_keys = toy_bgv.keygen(&mut rng);

        assert!(matches!(
            bgv.encrypt(&mut rng, &toy_keys.public, &params.plaintext(&[1]).unwrap()),
            Err(HeError::ShapeMismatch(_))
        ));
        assert!(matches!(
            bgv.make_relin_key(&mut rng, &toy_keys.private),
            Err(HeError::ShapeMismatch(_))
        ));
    }
}
