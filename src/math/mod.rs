//! Mathematical primitives for the encryption engine.
//!
//! - **Modular integers** over a native word or an arbitrary-precision modulus
//! - **Prime utilities**: Miller-Rabin, roots of unity, NTT-friendly primes
//! - **Number-Theoretic Transform (NTT)** for fast negacyclic multiplication
//! - **Ring elements** of R_q = Z_q[X]/(X^n + 1)
//! - **Discrete Gaussian and uniform sampling**
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//! use rlwe_he::math::{sample_uniform, NativeModulus, Ring};
//!
//! let ring = Arc::new(Ring::with_ntt(8, NativeModulus::new(16369).unwrap()).unwrap());
//! let mut rng = ChaCha20Rng::seed_from_u64(0);
//! let a = sample_uniform(&ring, &mut rng);
//! let b = sample_uniform(&ring, &mut rng);
//! let _product = &a * &b;
//! ```

pub mod gaussian;
pub mod modular;
pub mod ntt;
pub mod poly;
pub mod prime;
pub mod ring;
pub mod sampling;

pub use gaussian::{DiscreteGaussian, DEFAULT_SIGMA};
pub use modular::{div_round, BigModulus, ModularInteger, NativeModulus};
pub use ntt::NttTable;
pub use poly::RingElement;
pub use prime::{is_prime, ntt_prime_above, ntt_prime_below, primitive_root_of_unity};
pub use ring::Ring;
pub use sampling::{sample_discrete_gaussian, sample_uniform};
