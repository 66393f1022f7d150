//! Tests for the PolyPoW engine

use std::time::Duration;

use num_bigint::BigUint;
use num_traits::One;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

use crate::{
    Algorithm, Argon2Cost, Candidate, ConfigError, Engine, EngineConfig, Error, ExhaustReason,
    MemoryCosts, Predicate, ProofRecord, ProofRequest, Puzzle, Rejection, ScryptCost,
    SearchLimits, StartNonce, Verdict, factorial, leading_byte_zeros, leading_hex_zeros,
    puzzle_input, sha256, verify,
};

/// Cheap memory-hard costs so tests finish quickly in debug builds
fn cheap_config() -> EngineConfig {
    EngineConfig {
        limits: SearchLimits {
            max_iterations: 200_000,
            ..SearchLimits::default()
        },
        memory: MemoryCosts {
            argon2: Argon2Cost {
                m_cost: 64,
                t_cost: 1,
                p_cost: 1,
            },
            scrypt: ScryptCost {
                log_n: 4,
                r: 8,
                p: 1,
            },
        },
        ..EngineConfig::default()
    }
}

fn cheap_engine() -> Engine {
    Engine::new(cheap_config()).expect("cheap config is valid")
}

fn engine_with(f: impl FnOnce(&mut EngineConfig)) -> Engine {
    let mut config = cheap_config();
    f(&mut config);
    Engine::new(config).expect("config is valid")
}

/// `(2^256 - 1) / n`, the threshold form used by the reference demos
fn max_over(n: u32) -> BigUint {
    ((BigUint::one() << 256u32) - 1u32) / n
}

fn rng(seed: u64) -> ChaCha12Rng {
    ChaCha12Rng::seed_from_u64(seed)
}

// === Digest providers and puzzle functions ===

#[test]
fn test_puzzle_input_encoding() {
    assert_eq!(puzzle_input(b"12", 3u64), b"123");
    assert_eq!(puzzle_input(b"Hello World!", 0u64), b"Hello World!0");
    assert_eq!(
        puzzle_input(b"", 100_000_000_000u64),
        b"100000000000".to_vec()
    );
}

#[test]
fn test_sha256_known_vectors() {
    assert_eq!(
        hex::encode(sha256(b"abc")),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );

    // data || decimal(nonce) = "123"
    let costs = MemoryCosts::default();
    let candidate = Puzzle::DirectHash
        .evaluate(b"12", 3, 0, &costs, &mut rng(0))
        .unwrap();
    assert_eq!(
        hex::encode(candidate.digest()),
        "a665a45920422f9d417e4867efdc4fb8a04a1f3fff1fa07e998e86f7f7a27ae3"
    );
}

#[test]
fn test_chained_hash_rounds() {
    let costs = MemoryCosts::default();
    let direct = Puzzle::DirectHash
        .evaluate(b"chain", 7, 0, &costs, &mut rng(0))
        .unwrap();

    let zero_rounds = Puzzle::ChainedHash
        .evaluate(b"chain", 7, 0, &costs, &mut rng(0))
        .unwrap();
    assert_eq!(zero_rounds, direct);

    // Each round hashes the hex text of the previous digest
    let one_round = Puzzle::ChainedHash
        .evaluate(b"chain", 7, 1, &costs, &mut rng(0))
        .unwrap();
    let expected = sha256(hex::encode(direct.digest()).as_bytes());
    assert_eq!(one_round.digest(), &expected[..]);

    let two_rounds = Puzzle::ChainedHash
        .evaluate(b"chain", 7, 2, &costs, &mut rng(0))
        .unwrap();
    let expected = sha256(hex::encode(expected).as_bytes());
    assert_eq!(two_rounds.digest(), &expected[..]);
}

#[test]
fn test_factorial_values() {
    assert_eq!(factorial(0), BigUint::one());
    assert_eq!(factorial(1), BigUint::one());
    assert_eq!(factorial(5), BigUint::from(120u32));
    assert_eq!(factorial(20), BigUint::from(2_432_902_008_176_640_000u64));

    // 25! overflows u64 and needs arbitrary precision
    assert_eq!(
        factorial(25).to_string(),
        "15511210043330985984000000"
    );
}

#[test]
fn test_factorial_candidate_digest() {
    let costs = MemoryCosts::default();
    let candidate = Puzzle::Factorial
        .evaluate(b"data", 5, 0, &costs, &mut rng(0))
        .unwrap();
    match candidate {
        Candidate::Factorial { value, digest } => {
            assert_eq!(value, BigUint::from(120u32));
            assert_eq!(digest, sha256(b"data120").to_vec());
        }
        other => panic!("expected factorial candidate, got {:?}", other),
    }
}

#[test]
fn test_scrypt_is_reproducible() {
    let costs = cheap_config().memory;
    let a = Puzzle::Scrypt
        .evaluate(b"data", 42, 0, &costs, &mut rng(1))
        .unwrap();
    let b = Puzzle::Scrypt
        .evaluate(b"data", 42, 0, &costs, &mut rng(2))
        .unwrap();
    assert_eq!(a, b, "scrypt output must not depend on the RNG");
    assert_eq!(a.digest().len(), 64);
    assert!(Puzzle::Scrypt.is_reproducible());
}

#[test]
fn test_argon2_salt_makes_output_unreproducible() {
    let costs = cheap_config().memory;
    let mut r = rng(3);
    let a = Puzzle::Argon2
        .evaluate(b"data", 42, 0, &costs, &mut r)
        .unwrap();
    let b = Puzzle::Argon2
        .evaluate(b"data", 42, 0, &costs, &mut r)
        .unwrap();
    assert_ne!(a, b, "a fresh salt per call must change the output");
    assert_eq!(a.digest().len(), 32);
    assert!(!Puzzle::Argon2.is_reproducible());
}

#[test]
fn test_memory_footprints() {
    let costs = MemoryCosts::default();
    assert_eq!(Puzzle::Argon2.footprint_bytes(&costs), 64 * 1024 * 1024);
    // 128 * r * (N + p) = 128 * 8 * 16385
    assert_eq!(Puzzle::Scrypt.footprint_bytes(&costs), 128 * 8 * 16_385);
    assert_eq!(Puzzle::DirectHash.footprint_bytes(&costs), 0);
}

// === Difficulty predicates ===

#[test]
fn test_leading_hex_zeros() {
    let digest = [0x00, 0x0F, 0xFF];
    assert!(leading_hex_zeros(&digest, 0));
    assert!(leading_hex_zeros(&digest, 2));
    assert!(leading_hex_zeros(&digest, 3));
    assert!(!leading_hex_zeros(&digest, 4));
    assert!(!leading_hex_zeros(&digest, 7), "longer than the digest");

    assert!(!leading_hex_zeros(&[0x10], 1));
    assert!(leading_hex_zeros(&[0x01], 1));
}

#[test]
fn test_leading_byte_zeros() {
    let digest = [0x00, 0x00, 0x01];
    assert!(leading_byte_zeros(&digest, 0));
    assert!(leading_byte_zeros(&digest, 2));
    assert!(!leading_byte_zeros(&digest, 3));
    assert!(!leading_byte_zeros(&digest, 4));
}

#[test]
fn test_threshold_predicates() {
    let mut digest = vec![0u8; 32];
    digest[31] = 5;
    let candidate = Candidate::Digest(digest);

    assert!(Predicate::Threshold(BigUint::from(6u32)).accepts(&candidate, 0));
    assert!(!Predicate::Threshold(BigUint::from(5u32)).accepts(&candidate, 0));

    // 5 XOR 5 = 0 < 1, while 5 on its own is not below 1
    assert!(Predicate::XorThreshold(BigUint::from(1u32)).accepts(&candidate, 5));
    assert!(!Predicate::XorThreshold(BigUint::from(1u32)).accepts(&candidate, 4));
    assert!(!Predicate::Threshold(BigUint::from(1u32)).accepts(&candidate, 5));
}

#[test]
fn test_divisibility_predicate() {
    let predicate = Predicate::Divisibility(BigUint::from(17u32));
    let candidate = |n| Candidate::Factorial {
        value: factorial(n),
        digest: vec![0; 32],
    };

    assert!(!predicate.accepts(&candidate(16), 16));
    assert!(predicate.accepts(&candidate(17), 17));
    assert!(predicate.accepts(&candidate(30), 30));

    // Composite divisor: 4! = 24 is the first factorial divisible by 8
    let eight = Predicate::Divisibility(BigUint::from(8u32));
    assert!(!eight.accepts(&candidate(3), 3));
    assert!(eight.accepts(&candidate(4), 4));

    // A plain digest never satisfies divisibility
    assert!(!predicate.accepts(&Candidate::Digest(vec![0; 32]), 17));
}

// === Request validation ===

#[test]
fn test_zero_divisor_rejected() {
    let err = ProofRequest::new(b"x".to_vec(), Algorithm::FactorialHash, 0u32).unwrap_err();
    assert_eq!(
        err,
        ConfigError::ZeroDivisor {
            algorithm: Algorithm::FactorialHash
        }
    );
}

#[test]
fn test_zero_threshold_rejected() {
    for algorithm in [
        Algorithm::Numerical,
        Algorithm::BitwiseXor,
        Algorithm::MemoryArgon,
        Algorithm::RandomizedHash,
    ] {
        let err = ProofRequest::new(b"x".to_vec(), algorithm, 0u32).unwrap_err();
        assert_eq!(err, ConfigError::ZeroThreshold { algorithm });
    }

    let err =
        ProofRequest::with_chain_rounds(b"x".to_vec(), Algorithm::SequentialHash, 0u32, 3)
            .unwrap_err();
    assert!(matches!(err, ConfigError::ZeroThreshold { .. }));
}

#[test]
fn test_prefix_longer_than_digest_rejected() {
    // 64 hex digits in SHA-256
    assert!(ProofRequest::new(b"x".to_vec(), Algorithm::Simple, 64u32).is_ok());
    let err = ProofRequest::new(b"x".to_vec(), Algorithm::Simple, 65u32).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::PrefixTooLong {
            available: 64,
            unit: "nibble",
            ..
        }
    ));

    // 64 bytes of scrypt output
    assert!(ProofRequest::new(b"x".to_vec(), Algorithm::MemoryScrypt, 64u32).is_ok());
    let err = ProofRequest::new(b"x".to_vec(), Algorithm::MemoryScrypt, 65u32).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::PrefixTooLong {
            available: 64,
            unit: "byte",
            ..
        }
    ));

    let huge = BigUint::one() << 100u32;
    assert!(ProofRequest::new(b"x".to_vec(), Algorithm::Simple, huge).is_err());
}

#[test]
fn test_chain_rounds_validation() {
    // The threshold doubles as the round count unless decoupled
    let err = ProofRequest::new(b"x".to_vec(), Algorithm::SequentialHash, max_over(100))
        .unwrap_err();
    assert!(matches!(err, ConfigError::TooManyChainRounds { .. }));

    let request = ProofRequest::new(b"x".to_vec(), Algorithm::SequentialHash, 1_000u32).unwrap();
    assert_eq!(request.effective_chain_rounds(), 1_000);

    let request =
        ProofRequest::with_chain_rounds(b"x".to_vec(), Algorithm::SequentialHash, max_over(100), 5)
            .unwrap();
    assert_eq!(request.effective_chain_rounds(), 5);

    let err = ProofRequest::with_chain_rounds(
        b"x".to_vec(),
        Algorithm::SequentialHash,
        max_over(100),
        crate::MAX_CHAIN_ROUNDS + 1,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::TooManyChainRounds { .. }));

    let err =
        ProofRequest::with_chain_rounds(b"x".to_vec(), Algorithm::Numerical, 10u32, 5).unwrap_err();
    assert_eq!(
        err,
        ConfigError::UnexpectedChainRounds {
            algorithm: Algorithm::Numerical
        }
    );

    let request = ProofRequest::new(b"x".to_vec(), Algorithm::Numerical, 10u32).unwrap();
    assert_eq!(request.effective_chain_rounds(), 0);
}

#[test]
fn test_engine_config_validation() {
    let mut config = cheap_config();
    config.memory.argon2.m_cost = 0;
    assert!(matches!(
        Engine::new(config).unwrap_err(),
        ConfigError::InvalidMemoryCost {
            provider: "argon2",
            ..
        }
    ));

    let mut config = cheap_config();
    config.memory.scrypt.r = 0;
    assert!(matches!(
        Engine::new(config).unwrap_err(),
        ConfigError::InvalidMemoryCost {
            provider: "scrypt",
            ..
        }
    ));

    let mut config = cheap_config();
    config.limits.max_iterations = 0;
    assert_eq!(
        Engine::new(config).unwrap_err(),
        ConfigError::ZeroIterationBudget
    );

    assert!(EngineConfig::default().validate().is_ok());
}

#[test]
fn test_algorithm_parsing() {
    assert_eq!("spow".parse::<Algorithm>().unwrap(), Algorithm::Simple);
    assert_eq!("MSPOW".parse::<Algorithm>().unwrap(), Algorithm::MemoryScrypt);
    assert_eq!(
        "memory-argon".parse::<Algorithm>().unwrap(),
        Algorithm::MemoryArgon
    );
    assert_eq!(
        "bitwisexor".parse::<Algorithm>().unwrap(),
        Algorithm::BitwiseXor
    );
    assert!(matches!(
        "sha3pow".parse::<Algorithm>(),
        Err(ConfigError::UnknownAlgorithm(_))
    ));

    for algorithm in Algorithm::ALL {
        assert_eq!(algorithm.to_string().parse::<Algorithm>().unwrap(), algorithm);
    }
}

// === Search / verify symmetry ===

fn assert_round_trip(request: &ProofRequest, expected: Verdict) -> ProofRecord {
    let engine = cheap_engine();
    let record = engine
        .search_with_rng(request, &mut rng(7))
        .expect("search should succeed");

    assert_eq!(record.algorithm(), request.algorithm());
    assert_eq!(record.data(), request.data());
    assert!(record.iterations() >= 1);
    assert_eq!(engine.verify(&record), expected, "{}", request.algorithm());
    record
}

#[test]
fn test_simple_round_trip() {
    let request = ProofRequest::new(b"Hello World!".to_vec(), Algorithm::Simple, 2u32).unwrap();
    let record = assert_round_trip(&request, Verdict::Verified);
    assert_eq!(record.candidate_digest()[0], 0);
}

#[test]
fn test_numerical_round_trip() {
    let request = ProofRequest::new(b"Hello World!".to_vec(), Algorithm::Numerical, max_over(16))
        .unwrap();
    let record = assert_round_trip(&request, Verdict::Verified);
    assert!(BigUint::from_bytes_be(record.candidate_digest()) < max_over(16));
}

#[test]
fn test_bitwise_xor_round_trip() {
    let request =
        ProofRequest::new(b"Hello World!".to_vec(), Algorithm::BitwiseXor, max_over(16)).unwrap();
    let record = assert_round_trip(&request, Verdict::Verified);
    let value = BigUint::from_bytes_be(record.candidate_digest()) ^ BigUint::from(record.nonce());
    assert!(value < max_over(16));
}

#[test]
fn test_sequential_round_trip() {
    let request = ProofRequest::with_chain_rounds(
        b"Hello World!".to_vec(),
        Algorithm::SequentialHash,
        max_over(16),
        3,
    )
    .unwrap();
    let record = assert_round_trip(&request, Verdict::Verified);
    assert_eq!(record.request().chain_rounds(), Some(3));
}

#[test]
fn test_memory_scrypt_round_trip() {
    let request = ProofRequest::new(b"Hello World!".to_vec(), Algorithm::MemoryScrypt, 1u32)
        .unwrap();
    let record = assert_round_trip(&request, Verdict::Verified);
    assert_eq!(record.candidate_digest()[0], 0);
    assert_eq!(record.candidate_digest().len(), 64);
}

#[test]
fn test_memory_argon_round_trip_is_predicate_only() {
    let request =
        ProofRequest::new(b"Hello World!".to_vec(), Algorithm::MemoryArgon, max_over(4)).unwrap();
    let record = assert_round_trip(&request, Verdict::PredicateOnly);
    assert!(BigUint::from_bytes_be(record.candidate_digest()) < max_over(4));
}

#[test]
fn test_randomized_round_trip_is_predicate_only() {
    let request =
        ProofRequest::new(b"Hello World!".to_vec(), Algorithm::RandomizedHash, max_over(16))
            .unwrap();
    assert_round_trip(&request, Verdict::PredicateOnly);
}

#[test]
fn test_factorial_first_nonce_for_prime_divisor() {
    let engine = engine_with(|c| c.start = StartNonce::Fixed(0));
    let request = ProofRequest::new(b"Hello World!".to_vec(), Algorithm::FactorialHash, 17u32)
        .unwrap();

    let record = engine.search_with_rng(&request, &mut rng(0)).unwrap();
    assert_eq!(record.nonce(), 17);
    assert_eq!(record.iterations(), 18);
    assert_eq!(engine.verify(&record), Verdict::Verified);

    // Every nonce below the prime fails, even with an honestly derived digest
    let costs = engine.config().memory;
    for nonce in 0..17 {
        let digest = Puzzle::Factorial
            .evaluate(request.data(), nonce, 0, &costs, &mut rng(0))
            .unwrap()
            .into_digest();
        let forged = ProofRecord::from_parts(request.clone(), nonce, digest, 1);
        assert_eq!(
            engine.verify(&forged),
            Verdict::Rejected(Rejection::PredicateFailed),
            "nonce {}",
            nonce
        );
        assert!(!verify(&forged));
    }
}

#[test]
fn test_factorial_random_start_within_span() {
    let engine = cheap_engine();
    let request = ProofRequest::new(b"x".to_vec(), Algorithm::FactorialHash, 17u32).unwrap();
    for seed in 0..8 {
        let record = engine.search_with_rng(&request, &mut rng(seed)).unwrap();
        assert!(record.nonce() >= 17);
        assert!(record.nonce() <= crate::FACTORIAL_NONCE_SPAN.max(17));
        assert!(engine.verify(&record).is_reproduced());
    }
}

#[test]
fn test_scrypt_mutated_first_byte_fails() {
    let engine = cheap_engine();
    let request = ProofRequest::new(b"Hello World!".to_vec(), Algorithm::MemoryScrypt, 1u32)
        .unwrap();
    let record = engine.search_with_rng(&request, &mut rng(11)).unwrap();
    assert_eq!(record.candidate_digest()[0], 0);
    assert!(engine.verify(&record).is_valid());

    for byte in 1..=u8::MAX {
        let mut digest = record.candidate_digest().to_vec();
        digest[0] = byte;
        let tampered =
            ProofRecord::from_parts(record.request().clone(), record.nonce(), digest, 1);
        assert!(!engine.verify(&tampered).is_valid(), "first byte {:#04x}", byte);
    }
}

#[test]
fn test_tampered_data_fails() {
    let engine = cheap_engine();
    let request = ProofRequest::new(b"original".to_vec(), Algorithm::Simple, 1u32).unwrap();
    let record = engine.search_with_rng(&request, &mut rng(5)).unwrap();

    let other = ProofRequest::new(b"tampered".to_vec(), Algorithm::Simple, 1u32).unwrap();
    let forged = ProofRecord::from_parts(
        other,
        record.nonce(),
        record.candidate_digest().to_vec(),
        record.iterations(),
    );
    assert!(matches!(engine.verify(&forged), Verdict::Rejected(_)));
}

#[test]
fn test_randomized_tampered_digest_fails_predicate() {
    let engine = cheap_engine();
    let request =
        ProofRequest::new(b"x".to_vec(), Algorithm::RandomizedHash, max_over(16)).unwrap();
    let record = engine.search_with_rng(&request, &mut rng(9)).unwrap();

    let forged = ProofRecord::from_parts(request, record.nonce(), vec![0xFF; 32], 1);
    assert_eq!(
        engine.verify(&forged),
        Verdict::Rejected(Rejection::PredicateFailed)
    );
}

#[test]
fn test_malformed_digest_rejected() {
    let engine = cheap_engine();
    let request = ProofRequest::new(b"x".to_vec(), Algorithm::Numerical, max_over(2)).unwrap();
    let record = ProofRecord::from_parts(request, 0, vec![0u8; 31], 1);
    assert_eq!(
        engine.verify(&record),
        Verdict::Rejected(Rejection::MalformedDigest {
            expected: 32,
            actual: 31
        })
    );
}

#[test]
fn test_verify_is_idempotent() {
    let engine = cheap_engine();
    for (algorithm, difficulty) in [
        (Algorithm::Simple, BigUint::from(1u32)),
        (Algorithm::RandomizedHash, max_over(4)),
    ] {
        let request = ProofRequest::new(b"x".to_vec(), algorithm, difficulty).unwrap();
        let record = engine.search_with_rng(&request, &mut rng(1)).unwrap();
        let first = engine.verify(&record);
        let second = engine.verify(&record);
        assert_eq!(first, second);
        assert_eq!(verify(&record), verify(&record));
    }
}

#[test]
fn test_randomized_searches_differ() {
    let engine = cheap_engine();
    let request =
        ProofRequest::new(b"Hello World!".to_vec(), Algorithm::RandomizedHash, max_over(16))
            .unwrap();

    let a = engine.search_with_rng(&request, &mut rng(100)).unwrap();
    let b = engine.search_with_rng(&request, &mut rng(200)).unwrap();

    assert_ne!(a.nonce(), b.nonce());
    assert_ne!(a.candidate_digest(), b.candidate_digest());
    assert_eq!(engine.verify(&a), Verdict::PredicateOnly);
    assert_eq!(engine.verify(&b), Verdict::PredicateOnly);
}

#[test]
fn test_seeded_search_is_deterministic() {
    let engine = cheap_engine();
    let request =
        ProofRequest::new(b"Hello World!".to_vec(), Algorithm::Numerical, max_over(32)).unwrap();

    let a = engine.search_with_rng(&request, &mut rng(42)).unwrap();
    let b = engine.search_with_rng(&request, &mut rng(42)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_harder_difficulty_needs_more_iterations() {
    let engine = cheap_engine();
    let mean_iterations = |algorithm: Algorithm, difficulty: BigUint| {
        let request = ProofRequest::new(b"mean".to_vec(), algorithm, difficulty).unwrap();
        let total: u64 = (0..16)
            .map(|seed| {
                engine
                    .search_with_rng(&request, &mut rng(seed))
                    .unwrap()
                    .iterations()
            })
            .sum();
        total as f64 / 16.0
    };

    // Expected 2 vs 64 iterations
    let easy = mean_iterations(Algorithm::Numerical, max_over(2));
    let hard = mean_iterations(Algorithm::Numerical, max_over(64));
    assert!(hard > easy, "easy {} hard {}", easy, hard);

    // Expected 16 vs 256 iterations
    let easy = mean_iterations(Algorithm::Simple, BigUint::from(1u32));
    let hard = mean_iterations(Algorithm::Simple, BigUint::from(2u32));
    assert!(hard > easy, "easy {} hard {}", easy, hard);
}

// === Ceilings ===

#[test]
fn test_iteration_ceiling() {
    let engine = engine_with(|c| c.limits.max_iterations = 100);
    // A threshold of 1 needs an all-zero digest
    let request = ProofRequest::new(b"x".to_vec(), Algorithm::Numerical, 1u32).unwrap();

    match engine.search_with_rng(&request, &mut rng(0)) {
        Err(Error::SearchExhausted {
            iterations, reason, ..
        }) => {
            assert_eq!(iterations, 100);
            assert_eq!(reason, ExhaustReason::Iterations);
        }
        other => panic!("expected exhaustion, got {:?}", other),
    }
}

#[test]
fn test_deadline_ceiling() {
    let engine = engine_with(|c| c.limits.max_duration = Some(Duration::ZERO));
    let request = ProofRequest::new(b"x".to_vec(), Algorithm::Numerical, 1u32).unwrap();

    assert!(matches!(
        engine.search_with_rng(&request, &mut rng(0)),
        Err(Error::SearchExhausted {
            iterations: 0,
            reason: ExhaustReason::Deadline,
            ..
        })
    ));
}

#[test]
fn test_nonce_ceiling() {
    let engine = engine_with(|c| {
        c.start = StartNonce::Fixed(10);
        c.limits.max_nonce = Some(12);
    });
    let request = ProofRequest::new(b"x".to_vec(), Algorithm::Numerical, 1u32).unwrap();

    match engine.search_with_rng(&request, &mut rng(0)) {
        Err(Error::SearchExhausted {
            iterations,
            last_nonce,
            reason,
        }) => {
            assert_eq!(iterations, 3);
            assert_eq!(last_nonce, 13);
            assert_eq!(reason, ExhaustReason::NonceCeiling);
        }
        other => panic!("expected exhaustion, got {:?}", other),
    }
}

#[test]
fn test_nonce_overflow_is_exhaustion() {
    let engine = engine_with(|c| c.start = StartNonce::Fixed(u64::MAX));
    let request = ProofRequest::new(b"x".to_vec(), Algorithm::Numerical, 1u32).unwrap();

    assert!(matches!(
        engine.search_with_rng(&request, &mut rng(0)),
        Err(Error::SearchExhausted {
            iterations: 1,
            last_nonce: u64::MAX,
            reason: ExhaustReason::NonceCeiling,
        })
    ));
}

#[test]
fn test_factorial_ceiling() {
    let engine = engine_with(|c| {
        c.start = StartNonce::Fixed(0);
        c.max_factorial_nonce = 50;
    });
    // 10007 is prime, so no factorial below 10007! is divisible by it
    let request = ProofRequest::new(b"x".to_vec(), Algorithm::FactorialHash, 10_007u32).unwrap();

    assert!(matches!(
        engine.search_with_rng(&request, &mut rng(0)),
        Err(Error::SearchExhausted {
            iterations: 51,
            reason: ExhaustReason::NonceCeiling,
            ..
        })
    ));

    // The verifier refuses to evaluate past the same ceiling
    let record = ProofRecord::from_parts(request, 10_007, vec![0u8; 32], 1);
    assert_eq!(
        engine.verify(&record),
        Verdict::Rejected(Rejection::ResourceLimit)
    );
}

#[test]
fn test_random_start_stays_under_nonce_ceiling() {
    let engine = engine_with(|c| c.limits.max_nonce = Some(1_000));
    let request = ProofRequest::new(b"x".to_vec(), Algorithm::Simple, 1u32).unwrap();

    let mut found = 0;
    for seed in 0..20 {
        match engine.search_with_rng(&request, &mut rng(seed)) {
            Ok(record) => {
                assert!(record.nonce() <= 1_000);
                assert_eq!(engine.verify(&record), Verdict::Verified);
                found += 1;
            }
            // A start near the ceiling may run out of range, but never before evaluating
            Err(Error::SearchExhausted {
                iterations,
                reason: ExhaustReason::NonceCeiling,
                ..
            }) => assert!(iterations > 0, "seed {seed} did no work"),
            Err(e) => panic!("seed {seed}: {e}"),
        }
    }
    assert!(found >= 15, "only {found}/20 searches succeeded");
}

#[test]
fn test_random_factorial_start_stays_under_ceiling() {
    let engine = engine_with(|c| c.max_factorial_nonce = 50);
    let request = ProofRequest::new(b"x".to_vec(), Algorithm::FactorialHash, 17u32).unwrap();

    for seed in 0..20 {
        let record = engine.search_with_rng(&request, &mut rng(seed)).unwrap();
        assert!((17..=50).contains(&record.nonce()));
    }
}

// === Convenience surface ===

#[test]
fn test_default_engine_entry_points() {
    let request = crate::new_request(b"entry".to_vec(), Algorithm::Simple, 1u32).unwrap();
    let record = crate::search(&request).unwrap();
    assert!(verify(&record));
    assert!(leading_hex_zeros(record.candidate_digest(), 1));
}

// === Parallel search ===

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_search_verifies() {
    let engine = cheap_engine();
    let request =
        ProofRequest::new(b"Hello World!".to_vec(), Algorithm::Numerical, max_over(64)).unwrap();

    let record = engine
        .search_parallel(&request, 4, &mut rng(21))
        .unwrap();
    assert_eq!(engine.verify(&record), Verdict::Verified);
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_memory_hard_worker_cap() {
    let engine = cheap_engine();
    assert_eq!(engine.worker_count(Algorithm::MemoryScrypt, 8), 2);
    assert_eq!(engine.worker_count(Algorithm::MemoryArgon, 8), 2);
    assert_eq!(engine.worker_count(Algorithm::Numerical, 8), 8);
    assert_eq!(engine.worker_count(Algorithm::Numerical, 0), 1);

    let request =
        ProofRequest::new(b"Hello World!".to_vec(), Algorithm::MemoryScrypt, 1u32).unwrap();
    let record = engine
        .search_parallel(&request, 8, &mut rng(22))
        .unwrap();
    assert_eq!(engine.verify(&record), Verdict::Verified);
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_shared_iteration_budget() {
    let engine = engine_with(|c| c.limits.max_iterations = 1_000);
    let request = ProofRequest::new(b"x".to_vec(), Algorithm::Numerical, 1u32).unwrap();

    match engine.search_parallel(&request, 4, &mut rng(23)) {
        Err(Error::SearchExhausted {
            iterations, reason, ..
        }) => {
            assert_eq!(iterations, 1_000);
            assert_eq!(reason, ExhaustReason::Iterations);
        }
        other => panic!("expected exhaustion, got {:?}", other),
    }
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_worker_at_ceiling_does_not_stop_others() {
    let engine = engine_with(|c| {
        c.start = StartNonce::Fixed(0);
        c.max_factorial_nonce = 97;
    });
    // 97 is prime: only 97! qualifies, and only worker 1 of 4 visits it
    let request = ProofRequest::new(b"x".to_vec(), Algorithm::FactorialHash, 97u32).unwrap();

    let record = engine
        .search_parallel(&request, 4, &mut rng(24))
        .unwrap();
    assert_eq!(record.nonce(), 97);
    // Worker 1 visits 1, 5, ..., 97
    assert_eq!(record.iterations(), 25);
    assert_eq!(engine.verify(&record), Verdict::Verified);
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_fixed_start_splits_nonces() {
    let engine = engine_with(|c| {
        c.start = StartNonce::Fixed(0);
        c.max_factorial_nonce = 97;
    });
    // 101 is prime, so nothing up to 97 qualifies
    let request = ProofRequest::new(b"x".to_vec(), Algorithm::FactorialHash, 101u32).unwrap();

    match engine.search_parallel(&request, 4, &mut rng(25)) {
        Err(Error::SearchExhausted {
            iterations, reason, ..
        }) => {
            // Nonces 0..=97, each evaluated once across all workers
            assert_eq!(iterations, 98);
            assert_eq!(reason, ExhaustReason::NonceCeiling);
        }
        other => panic!("expected exhaustion, got {:?}", other),
    }
}
