//! End-to-end BFV circuits
//!
//! keygen → encrypt → add / multiply → relinearize → decrypt = plaintext result

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rlwe_he::{
    Bfv, HeError, ParamsConfig, ParamsGenerator, Plaintext, Scheme, SchemeParameters,
};

fn small() -> Arc<SchemeParameters> {
    Arc::new(SchemeParameters::small().unwrap())
}

fn message(params: &SchemeParameters, stride: u64, offset: u64) -> Plaintext {
    let p = params.plaintext_modulus();
    let values: Vec<u64> = (0..params.ring_dim() as u64)
        .map(|i| (i * stride + offset) % p)
        .collect();
    params.plaintext(&values).unwrap()
}

#[test]
fn test_e2e_add_then_multiply() {
    let params = small();
    let bfv = Bfv::new(Arc::clone(&params));
    let mut rng = ChaCha20Rng::seed_from_u64(1000);
    let keys = bfv.keygen(&mut rng);
    let rk = bfv.make_relin_key(&mut rng, &keys.private).unwrap();

    let m1 = message(&params, 5, 1);
    let m2 = message(&params, 7, 3);
    let m3 = message(&params, 11, 2);
    let c1 = bfv.encrypt(&mut rng, &keys.public, &m1).unwrap();
    let c2 = bfv.encrypt(&mut rng, &keys.public, &m2).unwrap();
    let c3 = bfv.encrypt(&mut rng, &keys.public, &m3).unwrap();

    // (m1 + m2) · m3
    let sum = bfv.add(&c1, &c2).unwrap();
    let out = bfv.multiply_relin(&rk, &sum, &c3).unwrap();

    let expected = &(&m1 + &m2) * &m3;
    assert_eq!(bfv.decrypt(&keys.private, &out).unwrap(), expected);
    assert!(bfv.noise_budget(&keys.private, &out).unwrap() > 0.0);
}

#[test]
fn test_e2e_depth_two() {
    let params = small();
    let bfv = Bfv::new(Arc::clone(&params));
    let mut rng = ChaCha20Rng::seed_from_u64(1001);
    let keys = bfv.keygen(&mut rng);
    let rk = bfv.make_relin_key(&mut rng, &keys.private).unwrap();

    let m1 = params.plaintext(&[2, 1]).unwrap();
    let m2 = params.plaintext(&[3, 0, 1]).unwrap();
    let m3 = params.plaintext(&[1, 1, 1, 1]).unwrap();
    let c1 = bfv.encrypt(&mut rng, &keys.public, &m1).unwrap();
    let c2 = bfv.encrypt(&mut rng, &keys.public, &m2).unwrap();
    let c3 = bfv.encrypt(&mut rng, &keys.public, &m3).unwrap();

    let first = bfv.multiply_relin(&rk, &c1, &c2).unwrap();
    let budget_first = bfv.noise_budget(&keys.private, &first).unwrap();
    let second = bfv.multiply_relin(&rk, &first, &c3).unwrap();
    let budget_second = bfv.noise_budget(&keys.private, &second).unwrap();

    assert!(budget_second < budget_first);
    assert_eq!(
        bfv.decrypt(&keys.private, &second).unwrap(),
        &(&m1 * &m2) * &m3
    );
}

#[test]
fn test_e2e_negacyclic_wraparound() {
    // X^(n-1) · X = X^n = -1
    let params = small();
    let n = params.ring_dim();
    let bfv = Bfv::new(Arc::clone(&params));
    let mut rng = ChaCha20Rng::seed_from_u64(1002);
    let keys = bfv.keygen(&mut rng);
    let rk = bfv.make_relin_key(&mut rng, &keys.private).unwrap();

    let mut top = vec![0u64; n];
    top[n - 1] = 1;
    let x_top = params.plaintext(&top).unwrap();
    let x = params.plaintext(&[0, 1]).unwrap();

    let c1 = bfv.encrypt(&mut rng, &keys.public, &x_top).unwrap();
    let c2 = bfv.encrypt(&mut rng, &keys.public, &x).unwrap();
    let out = bfv.multiply_relin(&rk, &c1, &c2).unwrap();

    let minus_one = params.plaintext(&[params.plaintext_modulus() - 1]).unwrap();
    assert_eq!(bfv.decrypt(&keys.private, &out).unwrap(), minus_one);
}

#[test]
fn test_e2e_key_switch_chain() {
    let params = small();
    let bfv = Bfv::new(Arc::clone(&params));
    let mut rng = ChaCha20Rng::seed_from_u64(1003);
    let alice = bfv.keygen(&mut rng);
    let bob = bfv.keygen(&mut rng);
    let carol = bfv.keygen(&mut rng);

    let to_bob = bfv.make_eval_key(&mut rng, alice.private.secret(), &bob.private).unwrap();
    let to_carol = bfv.make_eval_key(&mut rng, bob.private.secret(), &carol.private).unwrap();

    let m = message(&params, 13, 4);
    let ct = bfv.encrypt(&mut rng, &alice.public, &m).unwrap();
    let at_bob = bfv.key_switch(&to_bob, &ct).unwrap();
    let at_carol = bfv.key_switch(&to_carol, &at_bob).unwrap();

    assert_eq!(bfv.decrypt(&bob.private, &at_bob).unwrap(), m);
    assert_eq!(bfv.decrypt(&carol.private, &at_carol).unwrap(), m);
}

#[test]
fn test_e2e_mod_switch_then_add() {
    let params = small();
    let target = Arc::new(
        SchemeParameters::new(32, 1099511626049, params.big_modulus().clone(), 256, 3.2, 16)
            .unwrap(),
    );
    let bfv = Bfv::new(Arc::clone(&params));
    let lower = Bfv::new(Arc::clone(&target));
    let mut rng = ChaCha20Rng::seed_from_u64(1004);
    let keys = bfv.keygen(&mut rng);
    let lower_key = keys.private.switch_params(&target).unwrap();

    let m1 = message(&params, 3, 0);
    let m2 = message(&params, 9, 5);
    let c1 = bfv
        .mod_switch(&bfv.encrypt(&mut rng, &keys.public, &m1).unwrap(), &target)
        .unwrap();
    let c2 = bfv
        .mod_switch(&bfv.encrypt(&mut rng, &keys.public, &m2).unwrap(), &target)
        .unwrap();

    let sum = lower.add(&c1, &c2).unwrap();
    assert_eq!(lower.decrypt(&lower_key, &sum).unwrap(), &m1 + &m2);

    // Switched ciphertexts no longer mix with the original parameters
    let fresh = bfv.encrypt(&mut rng, &keys.public, &m1).unwrap();
    assert!(matches!(bfv.add(&fresh, &c1), Err(HeError::ShapeMismatch(_))));
}

#[test]
fn test_e2e_params_from_json_config() {
    let json = r#"{
        "ring_dim": 32,
        "ciphertext_modulus": 1125899906842177,
        "big_modulus": "20769187434139310514121985316880513",
        "plaintext_modulus": 256,
        "error_std_dev": 3.2,
        "relin_window": 16
    }"#;
    let config: ParamsConfig = serde_json::from_str(json).unwrap();
    let params = Arc::new(SchemeParameters::from_config(&config).unwrap());
    assert_eq!(*params, SchemeParameters::small().unwrap());

    let bfv = Bfv::new(Arc::clone(&params));
    let mut rng = ChaCha20Rng::seed_from_u64(1005);
    let keys = bfv.keygen(&mut rng);
    let m = message(&params, 1, 1);
    let ct = bfv.encrypt(&mut rng, &keys.public, &m).unwrap();
    assert_eq!(bfv.decrypt(&keys.private, &ct).unwrap(), m);
}

#[test]
fn test_e2e_rejects_invalid_config() {
    let config = ParamsConfig {
        ring_dim: 32,
        ciphertext_modulus: 1125899906842177,
        big_modulus: "1000003".to_string(),
        plaintext_modulus: 256,
        error_std_dev: 3.2,
        relin_window: 16,
    };
    assert!(matches!(
        SchemeParameters::from_config(&config),
        Err(HeError::Parameter(_))
    ));
}

#[test]
fn test_e2e_generated_parameters_multiply() {
    let params = Arc::new(ParamsGenerator::new(128, 1, 256).generate().unwrap());
    assert_eq!(params.ring_dim(), 2048);

    let bfv = Bfv::new(Arc::clone(&params));
    let mut rng = ChaCha20Rng::seed_from_u64(1006);
    let keys = bfv.keygen(&mut rng);
    let rk = bfv.make_relin_key(&mut rng, &keys.private).unwrap();

    let m1 = message(&params, 17, 6);
    let m2 = params.plaintext(&[4, 0, 0, 1]).unwrap();
    let c1 = bfv.encrypt(&mut rng, &keys.public, &m1).unwrap();
    let c2 = bfv.encrypt(&mut rng, &keys.public, &m2).unwrap();

    let out = bfv.multiply_relin(&rk, &c1, &c2).unwrap();
    assert_eq!(bfv.decrypt(&keys.private, &out).unwrap(), &m1 * &m2);
    assert!(bfv.noise_budget(&keys.private, &out).unwrap() > 0.0);
}
