//! Proof search engine
//!
//! One engine drives every algorithm: seed a nonce, evaluate the puzzle,
//! test the predicate, advance the nonce by one, repeat. The loop always runs
//! under explicit ceilings (iterations, wall-clock time, nonce value) so an
//! unlucky or unsatisfiable search ends in [`Error::SearchExhausted`] instead
//! of hanging.

use std::time::{Duration, Instant};

use rand::{Rng, RngCore};
use tracing::{debug, trace, warn};

use crate::algorithm::Algorithm;
use crate::error::{ConfigError, Error, ExhaustReason, Result};
use crate::parallel::SharedSearch;
use crate::params::*;
use crate::puzzle::{MemoryCosts, Puzzle};
use crate::request::{ProofRecord, ProofRequest};

/// Ceilings applied to every search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    /// Maximum puzzle evaluations per search
    pub max_iterations: u64,
    /// Maximum wall-clock time per search
    pub max_duration: Option<Duration>,
    /// Largest nonce that may be evaluated
    pub max_nonce: Option<u64>,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_duration: None,
            max_nonce: None,
        }
    }
}

/// Where a search begins
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StartNonce {
    /// Uniform over the algorithm's start span, drawn from the search RNG
    #[default]
    Random,
    /// A fixed starting point
    Fixed(u64),
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Search ceilings
    pub limits: SearchLimits,
    /// Start nonce policy
    pub start: StartNonce,
    /// Memory-hard cost parameters
    pub memory: MemoryCosts,
    /// Largest nonce the factorial puzzle will evaluate
    pub max_factorial_nonce: u64,
    /// Concurrent memory-hard evaluations allowed in a parallel search
    pub max_memory_hard_workers: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            limits: SearchLimits::default(),
            start: StartNonce::Random,
            memory: MemoryCosts::default(),
            max_factorial_nonce: DEFAULT_MAX_FACTORIAL_NONCE,
            max_memory_hard_workers: DEFAULT_MAX_MEMORY_HARD_WORKERS,
        }
    }
}

impl EngineConfig {
    /// Check every setting the engine depends on
    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        if self.limits.max_iterations == 0 {
            return Err(ConfigError::ZeroIterationBudget);
        }
        self.memory.argon2.validate()?;
        self.memory.scrypt.validate()?;
        Ok(())
    }
}

/// Nonce search state, owned by one search
#[derive(Debug, Clone, Copy)]
struct SearchState {
    nonce: u64,
    iterations: u64,
}

/// How a single search loop ended without an error
pub(crate) enum Outcome {
    Found(ProofRecord),
    Cancelled,
}

/// Search-and-verify engine
///
/// Holds only configuration; every search owns its own state, so one engine
/// can serve concurrent searches.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Create an engine, validating its configuration
    pub fn new(config: EngineConfig) -> core::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Search for a proof using the thread-local RNG
    pub fn search(&self, request: &ProofRequest) -> Result<ProofRecord> {
        self.search_with_rng(request, &mut rand::rng())
    }

    /// Search for a proof, drawing all randomness from `rng`.
    ///
    /// With a seeded RNG the result is fully reproducible, including the
    /// start nonce and any randomness the puzzle consumes.
    pub fn search_with_rng<R: RngCore>(
        &self,
        request: &ProofRequest,
        rng: &mut R,
    ) -> Result<ProofRecord> {
        let start = self.start_nonce(request.algorithm(), rng);
        match self.run(request, start, 1, rng, None)? {
            Outcome::Found(record) => Ok(record),
            // Only a shared stop flag can cancel, and there is none here
            Outcome::Cancelled => Err(Error::SearchExhausted {
                iterations: 0,
                last_nonce: start,
                reason: ExhaustReason::Iterations,
            }),
        }
    }

    /// Pick the starting nonce for a search.
    ///
    /// A random start never lies above the nonce ceiling.
    pub(crate) fn start_nonce<R: RngCore + ?Sized>(&self, algorithm: Algorithm, rng: &mut R) -> u64 {
        match self.config.start {
            StartNonce::Fixed(nonce) => nonce,
            StartNonce::Random => {
                let span = algorithm
                    .start_span()
                    .min(self.nonce_ceiling(algorithm.puzzle()));
                rng.random_range(0..=span)
            }
        }
    }

    /// Largest nonce this engine will evaluate for `puzzle`
    fn nonce_ceiling(&self, puzzle: Puzzle) -> u64 {
        let mut ceiling = self.config.limits.max_nonce.unwrap_or(u64::MAX);
        if puzzle == Puzzle::Factorial {
            ceiling = ceiling.min(self.config.max_factorial_nonce);
        }
        ceiling
    }

    /// The search loop shared by the sequential and parallel entry points.
    ///
    /// Visits `start`, `start + stride`, ... until a candidate is accepted
    /// or a limit is hit.
    pub(crate) fn run<R: RngCore>(
        &self,
        request: &ProofRequest,
        start: u64,
        stride: u64,
        rng: &mut R,
        shared: Option<&SharedSearch>,
    ) -> Result<Outcome> {
        let algorithm = request.algorithm();
        let puzzle = algorithm.puzzle();
        let predicate = request.predicate();
        let rounds = request.effective_chain_rounds();
        let limits = self.config.limits;
        let ceiling = self.nonce_ceiling(puzzle);
        let started = Instant::now();
        let deadline = limits.max_duration.map(|d| started + d);

        debug!(
            %algorithm,
            start_nonce = start,
            stride,
            max_iterations = limits.max_iterations,
            nonce_ceiling = ceiling,
            "starting proof search"
        );

        let mut state = SearchState {
            nonce: start,
            iterations: 0,
        };

        let exhausted = |state: &SearchState, reason: ExhaustReason| -> Result<Outcome> {
            warn!(
                %algorithm,
                iterations = state.iterations,
                last_nonce = state.nonce,
                %reason,
                "proof search exhausted"
            );
            Err(Error::SearchExhausted {
                iterations: state.iterations,
                last_nonce: state.nonce,
                reason,
            })
        };

        loop {
            if shared.is_some_and(SharedSearch::is_stopped) {
                return Ok(Outcome::Cancelled);
            }
            if state.nonce > ceiling {
                return exhausted(&state, ExhaustReason::NonceCeiling);
            }
            let within_budget = match shared {
                Some(shared) => shared.claim_iteration(limits.max_iterations),
                None => state.iterations < limits.max_iterations,
            };
            if !within_budget {
                return exhausted(&state, ExhaustReason::Iterations);
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return exhausted(&state, ExhaustReason::Deadline);
            }

            let candidate =
                puzzle.evaluate(request.data(), state.nonce, rounds, &self.config.memory, rng)?;
            state.iterations += 1;

            if predicate.accepts(&candidate, state.nonce) {
                debug!(
                    %algorithm,
                    nonce = state.nonce,
                    iterations = state.iterations,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "proof found"
                );
                return Ok(Outcome::Found(ProofRecord::from_parts(
                    request.clone(),
                    state.nonce,
                    candidate.into_digest(),
                    state.iterations,
                )));
            }

            if state.iterations % PROGRESS_INTERVAL == 0 {
                trace!(
                    %algorithm,
                    nonce = state.nonce,
                    iterations = state.iterations,
                    "search progress"
                );
            }

            state.nonce = match state.nonce.checked_add(stride) {
                Some(next) => next,
                None => return exhausted(&state, ExhaustReason::NonceCeiling),
            };
        }
    }
}
