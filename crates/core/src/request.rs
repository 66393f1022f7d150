//! Proof requests and proof records

use num_bigint::BigUint;
use num_traits::ToPrimitive;

use crate::algorithm::Algorithm;
use crate::error::ConfigError;
use crate::params::MAX_CHAIN_ROUNDS;
use crate::predicate::Predicate;

/// A validated request to search for a proof
///
/// Construction checks the difficulty parameter against the algorithm's
/// domain, so a request that exists can always enter the search loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofRequest {
    data: Vec<u8>,
    algorithm: Algorithm,
    difficulty: BigUint,
    chain_rounds: Option<u64>,
    predicate: Predicate,
}

impl ProofRequest {
    /// Build a request, validating `difficulty` for `algorithm`.
    ///
    /// For [`Algorithm::SequentialHash`] the difficulty is also the number of
    /// re-hash rounds; use [`ProofRequest::with_chain_rounds`] to decouple them.
    pub fn new(
        data: impl Into<Vec<u8>>,
        algorithm: Algorithm,
        difficulty: impl Into<BigUint>,
    ) -> Result<Self, ConfigError> {
        Self::build(data.into(), algorithm, difficulty.into(), None)
    }

    /// Build a [`Algorithm::SequentialHash`] request with an explicit round count
    pub fn with_chain_rounds(
        data: impl Into<Vec<u8>>,
        algorithm: Algorithm,
        difficulty: impl Into<BigUint>,
        rounds: u64,
    ) -> Result<Self, ConfigError> {
        Self::build(data.into(), algorithm, difficulty.into(), Some(rounds))
    }

    /// Build a request from parts, as read back from a stored record
    pub fn from_parts(
        data: Vec<u8>,
        algorithm: Algorithm,
        difficulty: BigUint,
        chain_rounds: Option<u64>,
    ) -> Result<Self, ConfigError> {
        Self::build(data, algorithm, difficulty, chain_rounds)
    }

    fn build(
        data: Vec<u8>,
        algorithm: Algorithm,
        difficulty: BigUint,
        chain_rounds: Option<u64>,
    ) -> Result<Self, ConfigError> {
        let puzzle = algorithm.puzzle();
        let predicate = algorithm
            .predicate()
            .bind(algorithm, &difficulty, puzzle.digest_len())?;

        match (algorithm, chain_rounds) {
            (Algorithm::SequentialHash, Some(rounds)) if rounds > MAX_CHAIN_ROUNDS => {
                return Err(ConfigError::TooManyChainRounds {
                    algorithm,
                    requested: rounds.to_string(),
                    max: MAX_CHAIN_ROUNDS,
                });
            }
            (Algorithm::SequentialHash, None) => {
                if difficulty.to_u64().is_none_or(|r| r > MAX_CHAIN_ROUNDS) {
                    return Err(ConfigError::TooManyChainRounds {
                        algorithm,
                        requested: difficulty.to_string(),
                        max: MAX_CHAIN_ROUNDS,
                    });
                }
            }
            (Algorithm::SequentialHash, Some(_)) | (_, None) => {}
            (_, Some(_)) => return Err(ConfigError::UnexpectedChainRounds { algorithm }),
        }

        Ok(Self {
            data,
            algorithm,
            difficulty,
            chain_rounds,
            predicate,
        })
    }

    /// Application data the proof commits to
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Selected algorithm
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Difficulty parameter as supplied
    pub fn difficulty(&self) -> &BigUint {
        &self.difficulty
    }

    /// Explicit round count, if one was supplied
    pub fn chain_rounds(&self) -> Option<u64> {
        self.chain_rounds
    }

    /// Number of re-hash rounds the chained puzzle performs (0 for other puzzles)
    pub fn effective_chain_rounds(&self) -> u64 {
        match self.algorithm {
            Algorithm::SequentialHash => self
                .chain_rounds
                .or_else(|| self.difficulty.to_u64())
                .unwrap_or(MAX_CHAIN_ROUNDS),
            _ => 0,
        }
    }

    /// Bound difficulty predicate
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }
}

/// An accepted proof
///
/// Produced by a successful search and consumed by the verifier. The
/// candidate digest is stored verbatim so non-reproducible puzzles can still
/// have their predicate re-checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofRecord {
    request: ProofRequest,
    nonce: u64,
    candidate_digest: Vec<u8>,
    iterations: u64,
}

impl ProofRecord {
    /// Assemble a record, e.g. when loading one from storage.
    ///
    /// Nothing is checked here; run it through the verifier.
    pub fn from_parts(
        request: ProofRequest,
        nonce: u64,
        candidate_digest: Vec<u8>,
        iterations: u64,
    ) -> Self {
        Self {
            request,
            nonce,
            candidate_digest,
            iterations,
        }
    }

    /// The request this proof answers
    pub fn request(&self) -> &ProofRequest {
        &self.request
    }

    /// Application data
    pub fn data(&self) -> &[u8] {
        self.request.data()
    }

    /// Algorithm used
    pub fn algorithm(&self) -> Algorithm {
        self.request.algorithm()
    }

    /// Difficulty parameter
    pub fn difficulty(&self) -> &BigUint {
        self.request.difficulty()
    }

    /// Accepted nonce
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Accepted candidate digest
    pub fn candidate_digest(&self) -> &[u8] {
        &self.candidate_digest
    }

    /// Puzzle evaluations the search performed (diagnostic only)
    pub fn iterations(&self) -> u64 {
        self.iterations
    }
}
