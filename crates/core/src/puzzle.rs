//! Puzzle functions: `(data, nonce) -> candidate`

use num_bigint::BigUint;
use num_traits::One;
use rand::{Rng, RngCore};

use crate::error::DigestError;
use crate::params::RANDOM_VALUE_MAX;
use crate::primitives::{
    Argon2Cost, MemoryHardDigest, ScryptCost, puzzle_input, sha256, sha256_chain,
    sha256_with_suffix,
};

/// How a candidate value is derived from data and nonce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Puzzle {
    /// `SHA-256(data || nonce)`
    DirectHash,
    /// `SHA-256(data || nonce)` re-hashed a fixed number of rounds
    ChainedHash,
    /// `factorial(nonce)`, with `SHA-256(data || factorial)` as its digest
    Factorial,
    /// Argon2id over `data || nonce` with a random salt
    Argon2,
    /// scrypt over `data || nonce` with an empty salt
    Scrypt,
    /// `SHA-256(data || r)` for a fresh random `r` independent of the nonce
    Randomized,
}

/// Engine-fixed cost parameters for the memory-hard puzzles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryCosts {
    /// Argon2id costs
    pub argon2: Argon2Cost,
    /// scrypt costs
    pub scrypt: ScryptCost,
}

/// Output of a puzzle function
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// A digest, compared as bytes or as a big-endian integer
    Digest(Vec<u8>),
    /// A factorial plus the digest used for reporting
    Factorial {
        /// `factorial(nonce)`
        value: BigUint,
        /// `SHA-256(data || value)`
        digest: Vec<u8>,
    },
}

impl Candidate {
    /// The digest stored in a proof record
    pub fn digest(&self) -> &[u8] {
        match self {
            Self::Digest(d) => d,
            Self::Factorial { digest, .. } => digest,
        }
    }

    /// Consume the candidate, keeping only its digest
    pub fn into_digest(self) -> Vec<u8> {
        match self {
            Self::Digest(d) => d,
            Self::Factorial { digest, .. } => digest,
        }
    }
}

impl Puzzle {
    /// Evaluate the puzzle for one nonce.
    ///
    /// `chain_rounds` is only read by [`Puzzle::ChainedHash`]; `rng` is only
    /// drawn from by the non-reproducible puzzles.
    pub fn evaluate(
        self,
        data: &[u8],
        nonce: u64,
        chain_rounds: u64,
        costs: &MemoryCosts,
        rng: &mut dyn RngCore,
    ) -> Result<Candidate, DigestError> {
        let candidate = match self {
            Self::DirectHash => Candidate::Digest(sha256_with_suffix(data, nonce).to_vec()),
            Self::ChainedHash => {
                let seed = sha256_with_suffix(data, nonce);
                Candidate::Digest(sha256_chain(seed, chain_rounds).to_vec())
            }
            Self::Factorial => {
                let value = factorial(nonce);
                let digest = sha256_with_suffix(data, &value).to_vec();
                Candidate::Factorial { value, digest }
            }
            Self::Argon2 => Candidate::Digest(
                costs
                    .argon2
                    .memory_hard_digest(&puzzle_input(data, nonce), rng)?,
            ),
            Self::Scrypt => Candidate::Digest(
                costs
                    .scrypt
                    .memory_hard_digest(&puzzle_input(data, nonce), rng)?,
            ),
            Self::Randomized => {
                let value: u32 = rng.random_range(0..=RANDOM_VALUE_MAX);
                Candidate::Digest(sha256(&puzzle_input(data, value)).to_vec())
            }
        };
        Ok(candidate)
    }

    /// Whether the candidate depends only on `(data, nonce)`
    pub fn is_reproducible(self) -> bool {
        match self {
            Self::DirectHash | Self::ChainedHash | Self::Factorial | Self::Scrypt => true,
            Self::Argon2 | Self::Randomized => false,
        }
    }

    /// Whether each evaluation holds a large memory buffer
    pub fn is_memory_hard(self) -> bool {
        matches!(self, Self::Argon2 | Self::Scrypt)
    }

    /// Per-evaluation memory footprint in bytes, for the memory-hard puzzles
    pub fn footprint_bytes(self, costs: &MemoryCosts) -> usize {
        match self {
            Self::Argon2 => costs.argon2.footprint_bytes(),
            Self::Scrypt => costs.scrypt.footprint_bytes(),
            _ => 0,
        }
    }

    /// Length in bytes of the digest this puzzle stores
    pub fn digest_len(self) -> usize {
        match self {
            Self::Argon2 => crate::params::ARGON2_OUTPUT_LEN,
            Self::Scrypt => crate::params::SCRYPT_OUTPUT_LEN,
            _ => crate::params::SHA256_SIZE,
        }
    }
}

/// `n!` as an arbitrary-precision integer
pub fn factorial(n: u64) -> BigUint {
    (2..=n).fold(BigUint::one(), |acc, k| acc * k)
}
