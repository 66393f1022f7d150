//! Error types for request construction, engine configuration and search

use thiserror::Error;

use crate::algorithm::Algorithm;

/// Result alias used throughout the crate
pub type Result<T> = core::result::Result<T, Error>;

/// Top-level error returned by request construction and search
#[derive(Debug, Error)]
pub enum Error {
    /// A difficulty parameter or engine setting is outside its valid domain
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The search hit one of its ceilings before the predicate accepted
    #[error("search exhausted after {iterations} iterations (last nonce {last_nonce}): {reason}")]
    SearchExhausted {
        /// Puzzle evaluations performed
        iterations: u64,
        /// Nonce the search stopped at
        last_nonce: u64,
        /// Which ceiling was hit
        reason: ExhaustReason,
    },

    /// A digest provider failed
    #[error("digest provider failed: {0}")]
    Digest(#[from] DigestError),

    /// The worker pool for a parallel search could not be built
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

/// Invalid difficulty parameter or engine setting
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A threshold of zero can never be undercut
    #[error("{algorithm}: threshold must be greater than zero")]
    ZeroThreshold {
        /// Algorithm the request was built for
        algorithm: Algorithm,
    },

    /// Division by zero
    #[error("{algorithm}: divisor must be non-zero")]
    ZeroDivisor {
        /// Algorithm the request was built for
        algorithm: Algorithm,
    },

    /// More leading zeros requested than the digest has symbols
    #[error("{algorithm}: {requested} leading zero {unit}s requested but the digest has only {available}")]
    PrefixTooLong {
        /// Algorithm the request was built for
        algorithm: Algorithm,
        /// Requested prefix length
        requested: String,
        /// Digest length in the same unit
        available: usize,
        /// Symbol unit ("nibble" or "byte")
        unit: &'static str,
    },

    /// Chained hashing would re-hash more times than allowed
    #[error("{algorithm}: {requested} chain rounds requested, maximum is {max}")]
    TooManyChainRounds {
        /// Algorithm the request was built for
        algorithm: Algorithm,
        /// Requested round count
        requested: String,
        /// Largest accepted round count
        max: u64,
    },

    /// Chain rounds only apply to the chained puzzle
    #[error("{algorithm}: chain rounds only apply to the sequential hash algorithm")]
    UnexpectedChainRounds {
        /// Algorithm the request was built for
        algorithm: Algorithm,
    },

    /// Memory-hard cost parameters rejected by the provider
    #[error("invalid {provider} cost parameters: {reason}")]
    InvalidMemoryCost {
        /// Provider name
        provider: &'static str,
        /// Provider's explanation
        reason: String,
    },

    /// The engine limits leave no room to search
    #[error("max_iterations must be greater than zero")]
    ZeroIterationBudget,

    /// Unknown algorithm identifier
    #[error("unknown algorithm '{0}'")]
    UnknownAlgorithm(String),
}

/// Failure inside a digest provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DigestError {
    /// Argon2 rejected its parameters or input
    #[error("argon2: {0}")]
    Argon2(argon2::Error),

    /// scrypt rejected its parameters or output length
    #[error("scrypt: {0}")]
    Scrypt(String),
}

/// The ceiling that ended an unsuccessful search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExhaustReason {
    /// `max_iterations` evaluations were performed
    Iterations,
    /// `max_duration` elapsed
    Deadline,
    /// The nonce passed `max_nonce`, the factorial ceiling, or `u64::MAX`
    NonceCeiling,
}

impl core::fmt::Display for ExhaustReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let text = match self {
            Self::Iterations => "iteration limit reached",
            Self::Deadline => "time limit reached",
            Self::NonceCeiling => "nonce ceiling reached",
        };
        f.write_str(text)
    }
}
