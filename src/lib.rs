//! RLWE homomorphic encryption: BFV and BGV
//!
//! Both schemes work over the negacyclic ring `Z_q[X]/(X^n + 1)` with a
//! plaintext ring `Z_p[X]/(X^n + 1)`.
//!
//! Key components:
//! - Ring arithmetic with NTT multiplication, generic over native and
//!   arbitrary-precision moduli
//! - Key generation, encryption, decryption, addition and subtraction
//! - BFV multiplication through a tensor product in a big auxiliary ring
//! - Relinearization / key switching by base-`2^r` digit decomposition
//! - BFV ciphertext modulus switching
//! - Noise budget estimation and a parameter generator
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//! use rlwe_he::{Bfv, Scheme, SchemeParameters};
//!
//! let params = Arc::new(SchemeParameters::small().unwrap());
//! let bfv = Bfv::new(Arc::clone(&params));
//! let mut rng = ChaCha20Rng::seed_from_u64(7);
//!
//! let keys = bfv.keygen(&mut rng);
//! let m = params.plaintext(&[1, 2, 3]).unwrap();
//! let ct = bfv.encrypt(&mut rng, &keys.public, &m).unwrap();
//! let sum = bfv.add(&ct, &ct).unwrap();
//! assert_eq!(bfv.decrypt(&keys.private, &sum).unwrap(), &m + &m);
//! ```

pub mod error;
pub mod math;
pub mod params;
pub mod keys;
pub mod ciphertext;
pub mod ks;
pub mod scheme;
pub mod bfv;
pub mod bgv;

pub use bfv::Bfv;
pub use bgv::Bgv;
pub use ciphertext::CipherText;
pub use error::{HeError, Result};
pub use keys::{KeyPair, PrivateKey, PublicKey};
pub use ks::EvalKey;
pub use params::{ParamsConfig, ParamsGenerator, Plaintext, SchemeParameters};
pub use scheme::Scheme;
