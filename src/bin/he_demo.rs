//! he-demo: run one homomorphic circuit end to end
//!
//! Encrypts two messages, adds them, multiplies them, relinearizes the
//! product and decrypts every intermediate, logging noise budgets along the
//! way.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use eyre::{Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use rlwe_he::{Bfv, Bgv, ParamsConfig, ParamsGenerator, Plaintext, Scheme, SchemeParameters};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SchemeKind {
    Bfv,
    Bgv,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Preset {
    Toy,
    Small,
}

#[derive(Parser)]
#[command(name = "he-demo")]
#[command(about = "Evaluate a small circuit under BFV or BGV")]
#[command(version)]
struct Args {
    #[arg(long, value_enum, default_value = "bfv")]
    scheme: SchemeKind,

    /// Built-in parameter set, used when neither --config nor --generate is given
    #[arg(long, value_enum, default_value = "small")]
    preset: Preset,

    /// JSON parameter config
    #[arg(long, conflicts_with = "generate")]
    config: Option<PathBuf>,

    /// Search for parameters instead of using a preset
    #[arg(long)]
    generate: bool,

    /// Target security level in bits (with --generate)
    #[arg(long, default_value = "128")]
    security: u32,

    /// Multiplicative depth (with --generate)
    #[arg(long, default_value = "1")]
    depth: u32,

    /// Random seed for deterministic runs
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let params = Arc::new(load_params(&args)?);
    info!(
        "Parameters: n = {}, q = {}, p = {}, r = {}",
        params.ring_dim(),
        params.ciphertext_modulus(),
        params.plaintext_modulus(),
        params.relin_window()
    );

    let mut rng = ChaCha20Rng::seed_from_u64(args.seed);
    match args.scheme {
        SchemeKind::Bfv => run(&Bfv::new(Arc::clone(&params)), &mut rng),
        SchemeKind::Bgv => run(&Bgv::new(Arc::clone(&params)), &mut rng),
    }
}

fn load_params(args: &Args) -> Result<SchemeParameters> {
    if let Some(path) = &args.config {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: ParamsConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        return SchemeParameters::from_config(&config).wrap_err("Invalid parameter config");
    }

    if args.generate {
        let generator = ParamsGenerator::new(args.security, args.depth, 256);
        let found = generator.search().wrap_err("Parameter search failed")?;
        info!(
            "Generator: n = {}, log q = {}, secure dimension = {}",
            found.ring_dim, found.log_q, found.secure_dim
        );
        return generator.generate().wrap_err("Parameter generation failed");
    }

    let params = match args.preset {
        Preset::Toy => SchemeParameters::toy(),
        Preset::Small => SchemeParameters::small(),
    };
    params.wrap_err("Invalid preset")
}

fn demo_message(params: &SchemeParameters, offset: u64) -> Result<Plaintext> {
    let values: Vec<u64> = (0..params.ring_dim() as u64)
        .map(|i| (3 * i + offset) % params.plaintext_modulus())
        .collect();
    Ok(params.plaintext(&values)?)
}

fn check(label: &str, expected: &Plaintext, got: &Plaintext, budget: f64) {
    if expected == got {
        info!("{}: correct, noise budget {:.1} bits", label, budget);
    } else {
        warn!("{}: WRONG, noise budget {:.1} bits", label, budget);
    }
}

fn run<S: Scheme>(scheme: &S, rng: &mut ChaCha20Rng) -> Result<()> {
    let params = scheme.params();
    let total_start = Instant::now();

    let keys = scheme.keygen(rng);
    let relin_key = scheme.make_relin_key(rng, &keys.private)?;
    info!("Key generation: {:.2?}", total_start.elapsed());

    let m1 = demo_message(params, 1)?;
    let m2 = demo_message(params, 2)?;
    let c1 = scheme.encrypt(rng, &keys.public, &m1)?;
    let c2 = scheme.encrypt(rng, &keys.public, &m2)?;
    let fresh = scheme.decrypt(&keys.private, &c1)?;
    check("fresh", &m1, &fresh, scheme.noise_budget(&keys.private, &c1)?);

    let sum = scheme.add(&c1, &c2)?;
    let decrypted = scheme.decrypt(&keys.private, &sum)?;
    check("add", &(&m1 + &m2), &decrypted, scheme.noise_budget(&keys.private, &sum)?);

    let mul_start = Instant::now();
    let product = scheme.multiply(&c1, &c2)?;
    info!("Multiply: {:.2?}", mul_start.elapsed());
    let expected = &m1 * &m2;
    let decrypted = scheme.decrypt(&keys.private, &product)?;
    check(
        "multiply",
        &expected,
        &decrypted,
        scheme.noise_budget(&keys.private, &product)?,
    );

    let relin_start = Instant::now();
    let relin = scheme.relinearize(&relin_key, &product)?;
    info!("Relinearize: {:.2?}", relin_start.elapsed());
    let decrypted = scheme.decrypt(&keys.private, &relin)?;
    check(
        "relinearize",
        &expected,
        &decrypted,
        scheme.noise_budget(&keys.private, &relin)?,
    );

    info!("Total: {:.2?}", total_start.elapsed());
    Ok(())
}
