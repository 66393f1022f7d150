//! # PolyPoW Core
//!
//! One search-and-verify engine for eight proof-of-work variants. Each
//! variant is a pairing of a puzzle function, which derives a candidate from
//! `(data, nonce)`, and a difficulty predicate, which accepts or rejects it.
//!
//! ## Algorithms
//!
//! | id | puzzle | predicate |
//! |---|---|---|
//! | `spow` | SHA-256 | leading zero hex digits |
//! | `npow` | SHA-256 | below threshold |
//! | `bxpow` | SHA-256 | digest XOR nonce below threshold |
//! | `fhpow` | factorial | divisibility |
//! | `shpow` | chained SHA-256 | below threshold |
//! | `mapow` | salted Argon2id | below threshold |
//! | `mspow` | scrypt | leading zero bytes |
//! | `rhpow` | SHA-256 of a random value | below threshold |
//!
//! ## Input Format
//!
//! ```text
//! input = data || decimal(nonce)
//!         ^^^^    ^^^^^^^^^^^^^^
//!         bytes   ASCII digits, no padding
//! ```
//!
//! ## Example
//!
//! ```rust
//! use polypow_core::{Algorithm, Engine, ProofRequest, verify};
//!
//! let request = ProofRequest::new(b"Hello World!".to_vec(), Algorithm::Simple, 2u32)?;
//! let record = Engine::default().search(&request)?;
//!
//! assert!(record.candidate_digest().starts_with(&[0x00]));
//! assert!(verify(&record));
//! # Ok::<(), polypow_core::Error>(())
//! ```
//!
//! ## Verification Strength
//!
//! `mapow` salts every Argon2id call and `rhpow` hashes a value unrelated to
//! the nonce, so their records cannot be recomputed. The verifier re-checks
//! only the predicate for them and says so with [`Verdict::PredicateOnly`].

mod algorithm;
mod engine;
mod error;
mod parallel;
mod params;
mod predicate;
mod primitives;
mod puzzle;
mod request;
mod verify;

pub use algorithm::Algorithm;
pub use engine::{Engine, EngineConfig, SearchLimits, StartNonce};
pub use error::{ConfigError, DigestError, Error, ExhaustReason, Result};
pub use params::*;
pub use predicate::{Predicate, PredicateKind, leading_byte_zeros, leading_hex_zeros};
pub use primitives::{Argon2Cost, MemoryHardDigest, ScryptCost, puzzle_input, sha256};
pub use puzzle::{Candidate, MemoryCosts, Puzzle, factorial};
pub use request::{ProofRecord, ProofRequest};
pub use verify::{Rejection, Verdict, verify};

/// Build a request, validating the difficulty parameter
pub fn new_request(
    data: impl Into<Vec<u8>>,
    algorithm: Algorithm,
    difficulty: impl Into<num_bigint::BigUint>,
) -> core::result::Result<ProofRequest, ConfigError> {
    ProofRequest::new(data, algorithm, difficulty)
}

/// Search for a proof with a default-configured engine
pub fn search(request: &ProofRequest) -> Result<ProofRecord> {
    Engine::default().search(request)
}

pub use num_bigint::BigUint;

#[cfg(test)]
mod tests;
