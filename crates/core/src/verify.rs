//! Proof verification
//!
//! For reproducible puzzles the verifier recomputes the candidate from
//! `(data, nonce)` and re-runs the predicate, mirroring the acceptance test
//! of the search loop exactly. For non-reproducible puzzles (salted Argon2id,
//! randomized hashing) only the predicate can be re-checked against the
//! stored digest; that weaker result is reported as
//! [`Verdict::PredicateOnly`], never as [`Verdict::Verified`].

use core::fmt;

use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

use crate::engine::Engine;
use crate::error::DigestError;
use crate::puzzle::{Candidate, Puzzle};
use crate::request::ProofRecord;

/// Outcome of verifying a [`ProofRecord`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Candidate recomputed, matches the stored digest, and is accepted
    Verified,
    /// The puzzle is non-reproducible; the predicate holds for the stored
    /// digest but its derivation from `(data, nonce)` is unproven
    PredicateOnly,
    /// The record does not prove anything
    Rejected(Rejection),
}

/// Why a record was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The predicate does not accept the candidate
    PredicateFailed,
    /// The recomputed candidate differs from the stored digest
    DigestMismatch,
    /// The stored digest has the wrong length for the puzzle
    MalformedDigest {
        /// Expected length in bytes
        expected: usize,
        /// Stored length in bytes
        actual: usize,
    },
    /// Recomputing the candidate would exceed the engine's ceilings
    ResourceLimit,
    /// The digest provider failed while recomputing
    DigestFailure(DigestError),
}

impl Verdict {
    /// Whether the predicate holds (with or without full provenance)
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Verified | Self::PredicateOnly)
    }

    /// Whether the candidate was recomputed from `(data, nonce)`
    pub fn is_reproduced(&self) -> bool {
        matches!(self, Self::Verified)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verified => f.write_str("valid (recomputed from data and nonce)"),
            Self::PredicateOnly => {
                f.write_str("valid predicate only (puzzle is not reproducible)")
            }
            Self::Rejected(reason) => write!(f, "invalid: {reason}"),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PredicateFailed => f.write_str("difficulty predicate not satisfied"),
            Self::DigestMismatch => f.write_str("stored digest does not match recomputation"),
            Self::MalformedDigest { expected, actual } => {
                write!(f, "digest is {actual} bytes, expected {expected}")
            }
            Self::ResourceLimit => f.write_str("nonce exceeds the verifier's evaluation ceiling"),
            Self::DigestFailure(e) => write!(f, "digest provider failed: {e}"),
        }
    }
}

impl Engine {
    /// Verify a proof record.
    ///
    /// Never panics and never returns an error; every failure is a
    /// [`Rejection`]. Holds no state, so repeated calls agree.
    pub fn verify(&self, record: &ProofRecord) -> Verdict {
        let request = record.request();
        let puzzle = request.algorithm().puzzle();
        let stored = record.candidate_digest();

        let expected = puzzle.digest_len();
        if stored.len() != expected {
            return Verdict::Rejected(Rejection::MalformedDigest {
                expected,
                actual: stored.len(),
            });
        }

        if !puzzle.is_reproducible() {
            let candidate = Candidate::Digest(stored.to_vec());
            return if request.predicate().accepts(&candidate, record.nonce()) {
                Verdict::PredicateOnly
            } else {
                Verdict::Rejected(Rejection::PredicateFailed)
            };
        }

        if puzzle == Puzzle::Factorial && record.nonce() > self.config().max_factorial_nonce {
            return Verdict::Rejected(Rejection::ResourceLimit);
        }

        // Reproducible puzzles never draw from the RNG
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        let candidate = match puzzle.evaluate(
            request.data(),
            record.nonce(),
            request.effective_chain_rounds(),
            &self.config().memory,
            &mut rng,
        ) {
            Ok(c) => c,
            Err(e) => return Verdict::Rejected(Rejection::DigestFailure(e)),
        };

        if !request.predicate().accepts(&candidate, record.nonce()) {
            return Verdict::Rejected(Rejection::PredicateFailed);
        }
        if candidate.digest() != stored {
            return Verdict::Rejected(Rejection::DigestMismatch);
        }
        Verdict::Verified
    }
}

/// Verify a record with a default-configured engine.
///
/// Returns true for both [`Verdict::Verified`] and [`Verdict::PredicateOnly`];
/// use [`Engine::verify`] to tell them apart. Memory-hard records produced
/// with non-default costs must be checked with an engine configured the same way.
pub fn verify(record: &ProofRecord) -> bool {
    Engine::default().verify(record).is_valid()
}
