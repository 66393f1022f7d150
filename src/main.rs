//! PolyPoW Prover CLI
//!
//! A command-line tool for mining and checking PolyPoW proofs.
//!
//! # Commands
//!
//! - `mine` - Search for a proof
//! - `verify` - Check a saved proof report
//! - `benchmark` - Measure puzzle throughput
//! - `algorithms` - List the supported algorithms

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

use polypow::algorithm::{Algorithm, Engine, ProofRequest, Verdict};
use polypow::config::{parse_difficulty, ProverConfig};
use polypow::report::ProofReport;

#[derive(Parser)]
#[command(name = "polypow")]
#[command(author = "Cyberia")]
#[command(version)]
#[command(about = "Multi-algorithm proof-of-work prover and verifier")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for a proof
    Mine {
        /// Algorithm id or name (see `polypow algorithms`)
        #[arg(short, long, default_value = "spow")]
        algorithm: Algorithm,

        /// Data the proof commits to
        #[arg(long, default_value = "Hello World!")]
        data: String,

        /// Data as hex, for binary payloads
        #[arg(long, conflicts_with = "data")]
        data_hex: Option<String>,

        /// Difficulty parameter: decimal, 0x-hex, or max/N
        #[arg(short, long)]
        difficulty: String,

        /// Chained-hash rounds, when they should differ from the difficulty
        #[arg(long)]
        rounds: Option<u64>,

        /// Worker threads (0 = one per CPU core)
        #[arg(short, long)]
        threads: Option<usize>,

        /// Maximum puzzle evaluations
        #[arg(long)]
        max_iterations: Option<u64>,

        /// Give up after this many seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Start from this nonce instead of a random one
        #[arg(long)]
        start_nonce: Option<u64>,

        /// Hex-encoded 32-byte RNG seed for a reproducible search
        #[arg(long)]
        seed: Option<String>,

        /// Print the proof as JSON
        #[arg(long)]
        json: bool,

        /// Also write the JSON proof to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check a proof report
    Verify {
        /// Proof report file ('-' reads stdin)
        proof: PathBuf,
    },

    /// Run performance benchmark
    Benchmark {
        /// Algorithm to measure (default: all)
        #[arg(short, long)]
        algorithm: Option<Algorithm>,

        /// Number of evaluations per algorithm
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Rounds per chained-hash evaluation
        #[arg(long, default_value = "1000")]
        rounds: u64,
    },

    /// List the supported algorithms
    Algorithms,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Mine {
            algorithm,
            data,
            data_hex,
            difficulty,
            rounds,
            threads,
            max_iterations,
            timeout,
            start_nonce,
            seed,
            json,
            output,
        } => load_config(cli.config.as_deref()).and_then(|mut config| {
            if let Some(threads) = threads {
                config.threads = threads;
            }
            if let Some(max) = max_iterations {
                config.max_iterations = max;
            }
            if timeout.is_some() {
                config.timeout_secs = timeout;
            }
            if start_nonce.is_some() {
                config.start_nonce = start_nonce;
            }
            if seed.is_some() {
                config.seed = seed;
            }
            let data = match data_hex {
                Some(hex) => hex::decode(hex.trim()).context("--data-hex is not valid hex")?,
                None => data.into_bytes(),
            };
            cmd_mine(
                &config,
                algorithm,
                data,
                &difficulty,
                rounds,
                json,
                output.as_deref(),
            )
        }),
        Commands::Verify { proof } => {
            load_config(cli.config.as_deref()).and_then(|config| cmd_verify(&config, &proof))
        }
        Commands::Benchmark {
            algorithm,
            count,
            rounds,
        } => load_config(cli.config.as_deref())
            .and_then(|config| cmd_benchmark(&config, algorithm, count, rounds)),
        Commands::Algorithms => cmd_algorithms(),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ProverConfig> {
    Ok(ProverConfig::load_or_default(path)?)
}

fn cmd_mine(
    config: &ProverConfig,
    algorithm: Algorithm,
    data: Vec<u8>,
    difficulty: &str,
    rounds: Option<u64>,
    json: bool,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let engine = Engine::new(config.engine_config()).context("invalid engine configuration")?;
    let difficulty = parse_difficulty(difficulty)?;
    let request = match rounds {
        Some(rounds) => ProofRequest::with_chain_rounds(data, algorithm, difficulty, rounds)?,
        None => ProofRequest::new(data, algorithm, difficulty)?,
    };
    let mut rng = config.rng()?;

    let threads = match config.threads {
        0 => num_cpus::get(),
        n => n,
    };

    if !json {
        println!("Mining {} ({})...", algorithm.id(), algorithm.name());
        println!("Difficulty: {} ({})", request.difficulty(), algorithm.difficulty_meaning());
        println!("Threads: {}", threads);
    }

    tracing::debug!(%algorithm, threads, seeded = config.seed.is_some(), "mining");
    let start = Instant::now();
    let record = search(&engine, &request, threads, &mut rng)?;
    let elapsed = start.elapsed();

    let report = ProofReport::from_record(&record);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("\nFound valid proof!");
        println!("{}", report);
        println!("Time elapsed: {:.2}s", elapsed.as_secs_f64());
        println!("Rate: {:.2} H/s", rate(record.iterations(), elapsed));
        println!("Verdict: {}", engine.verify(&record));
    }

    if let Some(path) = output {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        if !json {
            println!("Saved to: {}", path.display());
        }
    }

    Ok(())
}

#[cfg(feature = "parallel")]
fn search(
    engine: &Engine,
    request: &ProofRequest,
    threads: usize,
    rng: &mut rand_chacha::ChaCha12Rng,
) -> polypow::algorithm::Result<polypow::ProofRecord> {
    if threads > 1 {
        engine.search_parallel(request, threads, rng)
    } else {
        engine.search_with_rng(request, rng)
    }
}

#[cfg(not(feature = "parallel"))]
fn search(
    engine: &Engine,
    request: &ProofRequest,
    threads: usize,
    rng: &mut rand_chacha::ChaCha12Rng,
) -> polypow::algorithm::Result<polypow::ProofRecord> {
    if threads > 1 {
        tracing::warn!(threads, "built without parallel support, searching on one thread");
    }
    engine.search_with_rng(request, rng)
}

fn cmd_verify(config: &ProverConfig, proof: &Path) -> anyhow::Result<()> {
    let text = if proof == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        text
    } else {
        std::fs::read_to_string(proof)
            .with_context(|| format!("failed to read {}", proof.display()))?
    };

    let report = ProofReport::from_json(&text)?;
    let record = report.to_record()?;
    let engine = Engine::new(config.engine_config()).context("invalid engine configuration")?;

    println!("{}", report);
    let verdict = engine.verify(&record);
    println!("Verdict: {}", verdict);

    match verdict {
        Verdict::Verified => Ok(()),
        Verdict::PredicateOnly => {
            println!(
                "\nNote: {} proofs cannot be recomputed; only the difficulty predicate was checked.",
                record.algorithm().id()
            );
            Ok(())
        }
        Verdict::Rejected(reason) => anyhow::bail!("proof rejected: {}", reason),
    }
}

fn cmd_benchmark(
    config: &ProverConfig,
    algorithm: Option<Algorithm>,
    count: u32,
    rounds: u64,
) -> anyhow::Result<()> {
    let engine = Engine::new(config.engine_config()).context("invalid engine configuration")?;
    let costs = engine.config().memory;
    let mut rng = config.rng()?;
    let input = b"benchmark input data for PolyPoW";

    let algorithms: Vec<Algorithm> = match algorithm {
        Some(a) => vec![a],
        None => Algorithm::ALL.to_vec(),
    };

    println!("Running benchmark with {} evaluations per algorithm...", count);

    for algorithm in algorithms {
        let puzzle = algorithm.puzzle();
        let start = Instant::now();

        for i in 0..count {
            // Factorial cost grows with the nonce, so keep it near the start span
            let nonce = match algorithm {
                Algorithm::FactorialHash => u64::from(i % 100),
                _ => u64::from(i),
            };
            puzzle
                .evaluate(input, nonce, rounds, &costs, &mut rng)
                .with_context(|| format!("{} evaluation failed", algorithm.id()))?;
        }

        let elapsed = start.elapsed();
        println!("\n{} ({}):", algorithm.id(), algorithm.name());
        println!("  Time elapsed: {:.2}s", elapsed.as_secs_f64());
        println!("  Rate: {:.2} H/s", rate(u64::from(count), elapsed));
        if puzzle.is_memory_hard() {
            println!(
                "  Memory per evaluation: {} KB",
                puzzle.footprint_bytes(&costs) / 1024
            );
        }
        if algorithm == Algorithm::SequentialHash {
            println!("  Rounds: {}", rounds);
        }
    }

    Ok(())
}

fn cmd_algorithms() -> anyhow::Result<()> {
    println!("{:<7} {:<17} {:<13} Difficulty", "ID", "Name", "Verification");
    for algorithm in Algorithm::ALL {
        let verification = if algorithm.is_reproducible() {
            "recomputed"
        } else {
            "predicate only"
        };
        println!(
            "{:<7} {:<17} {:<13} {}",
            algorithm.id(),
            algorithm.name(),
            verification,
            algorithm.difficulty_meaning()
        );
    }
    Ok(())
}

fn rate(evaluations: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        evaluations as f64 / secs
    } else {
        0.0
    }
}
