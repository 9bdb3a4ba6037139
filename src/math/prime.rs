//! Primality testing and NTT-friendly prime search.
//!
//! An NTT-friendly prime for dimension `n` satisfies `q ≡ 1 (mod 2n)`, which is
//! exactly the condition for a primitive `2n`-th root of unity to exist in `Z_q`.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};

use super::modular::pow_mod;
use crate::error::{param_err, Result};

const WITNESSES: [u32; 20] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71,
];

/// Upper bound on generator candidates tried when looking for a root of unity
const MAX_GENERATOR: u64 = 1 << 16;

/// Upper bound on candidates tried by the prime searches
const MAX_PRIME_CANDIDATES: usize = 1 << 20;

/// Miller-Rabin primality test with fixed witnesses.
///
/// Deterministic for all inputs below 3.3 * 10^24 and overwhelmingly
/// reliable above that.
pub fn is_prime(q: &BigUint) -> bool {
    if *q < BigUint::from(2u32) {
        return false;
    }
    for &p in WITNESSES.iter() {
        let p = BigUint::from(p);
        if *q == p {
            return true;
        }
        if (q % &p).is_zero() {
            return false;
        }
    }

    let q_minus_one = q - 1u32;
    let s = q_minus_one.trailing_zeros().unwrap_or(0);
    let d = &q_minus_one >> s;

    'witness: for &a in WITNESSES.iter() {
        let mut x = pow_mod(&BigUint::from(a), &d, q);
        if x.is_one() || x == q_minus_one {
            continue;
        }
        for _ in 1..s {
            x = (&x * &x) % q;
            if x == q_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Find a primitive `order`-th root of unity modulo the prime `q`.
///
/// `order` must be a power of two dividing `q - 1`. A candidate
/// `ψ = g^((q-1)/order)` is primitive exactly when `ψ^(order/2) = -1`.
pub fn primitive_root_of_unity(order: u64, q: &BigUint) -> Result<BigUint> {
    if !order.is_power_of_two() || order < 2 {
        return Err(param_err!("root order {} must be a power of two >= 2", order));
    }
    let q_minus_one = q - 1u32;
    let (exp, rem) = q_minus_one.div_rem(&BigUint::from(order));
    if !rem.is_zero() {
        return Err(param_err!(
            "modulus {} is not 1 mod {}: no primitive {}-th root of unity",
            q,
            order,
            order
        ));
    }

    let half = BigUint::from(order / 2);
    let mut g = BigUint::from(2u32);
    while g < *q && g < BigUint::from(MAX_GENERATOR) {
        let candidate = pow_mod(&g, &exp, q);
        if pow_mod(&candidate, &half, q) == q_minus_one {
            return Ok(candidate);
        }
        g += 1u32;
    }
    Err(param_err!(
        "no primitive {}-th root of unity found modulo {}",
        order,
        q
    ))
}

/// Largest prime `q < bound` with `q ≡ 1 (mod 2n)`.
pub fn ntt_prime_below(bound: &BigUint, n: usize) -> Result<BigUint> {
    let step = BigUint::from(2 * n as u64);
    if *bound <= step {
        return Err(param_err!("no NTT prime below {} for n = {}", bound, n));
    }
    // Largest value < bound that is 1 mod 2n
    let mut candidate = ((bound - 2u32) / &step) * &step + 1u32;
    for _ in 0..MAX_PRIME_CANDIDATES {
        if candidate <= BigUint::one() {
            break;
        }
        if is_prime(&candidate) {
            return Ok(candidate);
        }
        candidate -= &step;
    }
    Err(param_err!("no NTT prime below {} for n = {}", bound, n))
}

/// Smallest prime `q > bound` with `q ≡ 1 (mod 2n)`.
pub fn ntt_prime_above(bound: &BigUint, n: usize) -> Result<BigUint> {
    let step = BigUint::from(2 * n as u64);
    // Smallest value > bound that is 1 mod 2n
    let mut candidate = (bound / &step) * &step + 1u32;
    if candidate <= *bound {
        candidate += &step;
    }
    for _ in 0..MAX_PRIME_CANDIDATES {
        if is_prime(&candidate) {
            return Ok(candidate);
        }
        candidate += &step;
    }
    Err(param_err!("no NTT prime above {} for n = {}", bound, n))
}
