//! Key-switching module
//!
//! Key switching turns a ciphertext whose last component pairs with some
//! secret expression `s_old` into a linear ciphertext under a new secret `s'`.
//! Relinearization is the special case `s_old = s²`, which removes the third
//! component a multiplication leaves behind.
//!
//! # Evaluation key
//!
//! An evaluation key holds one encryption-like pair per digit of the
//! decomposition base `2^r`:
//! ```text
//! a[i] = mask(s_old · 2^(i·r), a_i, e_i, s')
//! b[i] = a_i                                    (uniform)
//! ```
//! where `mask` is the scheme's encryption shape (BFV: `d − a·s' − e`,
//! BGV: `a·s' + p·e − d`).
//!
//! # Algorithm
//!
//! To switch `(c0, c1, c2)` (or `(c0, c1)`, switching `c1` itself):
//! 1. Decompose the last component into digits `p_0 … p_{w-1}`
//! 2. Start from `(c0, c1)` (or `(c0, 0)`)
//! 3. Accumulate `c0 += Σ a[i]·p_i` and `c1 += Σ b[i]·p_i`

mod setup;
mod switch;

pub use setup::EvalKey;
pub(crate) use setup::generate_eval_key;
pub use switch::{decompose, key_switch, relinearize};
