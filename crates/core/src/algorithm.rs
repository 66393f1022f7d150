//! Algorithm identifiers
//!
//! Each identifier selects one puzzle function and one difficulty predicate.

use core::fmt;
use core::str::FromStr;

use crate::error::ConfigError;
use crate::params::{FACTORIAL_NONCE_SPAN, NONCE_SPAN};
use crate::predicate::PredicateKind;
use crate::puzzle::Puzzle;

/// The eight proof-of-work variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// SHA-256 with a leading-zero hex prefix
    Simple,
    /// SHA-256 below a numeric threshold
    Numerical,
    /// SHA-256 XOR nonce below a numeric threshold
    BitwiseXor,
    /// factorial(nonce) divisible by a divisor
    FactorialHash,
    /// Chained SHA-256 below a numeric threshold
    SequentialHash,
    /// Salted Argon2id below a numeric threshold
    MemoryArgon,
    /// scrypt with a leading-zero byte prefix
    MemoryScrypt,
    /// SHA-256 over a fresh random value below a numeric threshold
    RandomizedHash,
}

impl Algorithm {
    /// Every algorithm, in catalogue order
    pub const ALL: [Algorithm; 8] = [
        Algorithm::Simple,
        Algorithm::Numerical,
        Algorithm::BitwiseXor,
        Algorithm::FactorialHash,
        Algorithm::SequentialHash,
        Algorithm::MemoryArgon,
        Algorithm::MemoryScrypt,
        Algorithm::RandomizedHash,
    ];

    /// Short identifier, e.g. `spow`
    pub fn id(self) -> &'static str {
        match self {
            Self::Simple => "spow",
            Self::Numerical => "npow",
            Self::BitwiseXor => "bxpow",
            Self::FactorialHash => "fhpow",
            Self::SequentialHash => "shpow",
            Self::MemoryArgon => "mapow",
            Self::MemoryScrypt => "mspow",
            Self::RandomizedHash => "rhpow",
        }
    }

    /// Long name, e.g. `simple`
    pub fn name(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Numerical => "numerical",
            Self::BitwiseXor => "bitwise-xor",
            Self::FactorialHash => "factorial-hash",
            Self::SequentialHash => "sequential-hash",
            Self::MemoryArgon => "memory-argon",
            Self::MemoryScrypt => "memory-scrypt",
            Self::RandomizedHash => "randomized-hash",
        }
    }

    /// One-line description of what the difficulty parameter means
    pub fn difficulty_meaning(self) -> &'static str {
        match self {
            Self::Simple => "leading zero hex digits of SHA-256",
            Self::Numerical | Self::SequentialHash | Self::MemoryArgon | Self::RandomizedHash => {
                "exclusive upper bound on the digest as an integer"
            }
            Self::BitwiseXor => "exclusive upper bound on digest XOR nonce",
            Self::FactorialHash => "divisor of factorial(nonce)",
            Self::MemoryScrypt => "leading zero bytes of the scrypt output",
        }
    }

    /// Puzzle function for this algorithm
    pub fn puzzle(self) -> Puzzle {
        match self {
            Self::Simple | Self::Numerical | Self::BitwiseXor => Puzzle::DirectHash,
            Self::FactorialHash => Puzzle::Factorial,
            Self::SequentialHash => Puzzle::ChainedHash,
            Self::MemoryArgon => Puzzle::Argon2,
            Self::MemoryScrypt => Puzzle::Scrypt,
            Self::RandomizedHash => Puzzle::Randomized,
        }
    }

    /// Difficulty predicate for this algorithm
    pub fn predicate(self) -> PredicateKind {
        match self {
            Self::Simple => PredicateKind::LeadingHexZeros,
            Self::MemoryScrypt => PredicateKind::LeadingByteZeros,
            Self::BitwiseXor => PredicateKind::XorThreshold,
            Self::FactorialHash => PredicateKind::Divisibility,
            Self::Numerical | Self::SequentialHash | Self::MemoryArgon | Self::RandomizedHash => {
                PredicateKind::Threshold
            }
        }
    }

    /// Inclusive upper bound of the random start nonce
    pub fn start_span(self) -> u64 {
        match self {
            Self::FactorialHash => FACTORIAL_NONCE_SPAN,
            _ => NONCE_SPAN,
        }
    }

    /// Whether a record can be re-derived from `(data, nonce)` alone
    pub fn is_reproducible(self) -> bool {
        self.puzzle().is_reproducible()
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Algorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|a| a.id() == wanted || a.name() == wanted || a.name().replace('-', "") == wanted)
            .ok_or_else(|| ConfigError::UnknownAlgorithm(s.to_string()))
    }
}
