//! Parallel nonce search
//!
//! N independent workers, each with its own RNG and random start nonce,
//! race to the first accepted candidate. The winner publishes through a
//! single-assignment slot and raises a stop flag that the other workers
//! check once per iteration.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

#[cfg(feature = "parallel")]
use rand::{RngCore, SeedableRng};
#[cfg(feature = "parallel")]
use rand_chacha::ChaCha12Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::request::ProofRecord;

#[cfg(feature = "parallel")]
use crate::engine::{Engine, Outcome, StartNonce};
#[cfg(feature = "parallel")]
use crate::error::{Error, ExhaustReason, Result};
#[cfg(feature = "parallel")]
use crate::request::ProofRequest;

/// State shared by the workers of one parallel search
#[derive(Debug, Default)]
#[cfg_attr(not(feature = "parallel"), allow(dead_code))]
pub(crate) struct SharedSearch {
    stop: AtomicBool,
    iterations: AtomicU64,
    found: OnceLock<ProofRecord>,
}

impl SharedSearch {
    /// Whether another worker finished the search
    pub(crate) fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Take one iteration from the shared budget; false once it is spent
    pub(crate) fn claim_iteration(&self, budget: u64) -> bool {
        self.iterations.fetch_add(1, Ordering::Relaxed) < budget
    }

    /// Iterations claimed so far, capped at the budget
    #[cfg(feature = "parallel")]
    fn iterations(&self, budget: u64) -> u64 {
        self.iterations.load(Ordering::Relaxed).min(budget)
    }

    /// Publish a proof; only the first publication is kept
    #[cfg(feature = "parallel")]
    fn publish(&self, record: ProofRecord) {
        let _ = self.found.set(record);
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Tell every worker to stop
    #[cfg(feature = "parallel")]
    fn cancel(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

#[cfg(feature = "parallel")]
impl Engine {
    /// Number of workers a parallel search over `algorithm` may use.
    ///
    /// Memory-hard puzzles are capped at `max_memory_hard_workers` so the
    /// total resident memory stays bounded.
    pub fn worker_count(&self, algorithm: crate::Algorithm, requested: usize) -> usize {
        let requested = requested.max(1);
        if algorithm.puzzle().is_memory_hard() {
            requested.min(self.config().max_memory_hard_workers.max(1))
        } else {
            requested
        }
    }

    /// Search with several workers on a dedicated thread pool.
    ///
    /// Each worker gets a ChaCha12 generator seeded from `rng` and its own
    /// start nonce. The iteration budget and deadline apply to the search
    /// as a whole.
    pub fn search_parallel<R: RngCore>(
        &self,
        request: &ProofRequest,
        workers: usize,
        rng: &mut R,
    ) -> Result<ProofRecord> {
        let algorithm = request.algorithm();
        let workers = self.worker_count(algorithm, workers);
        let budget = self.config().limits.max_iterations;

        let seeds: Vec<[u8; 32]> = (0..workers)
            .map(|_| {
                let mut seed = [0u8; 32];
                rng.fill_bytes(&mut seed);
                seed
            })
            .collect();

        tracing::debug!(
            %algorithm,
            workers,
            footprint_bytes = algorithm.puzzle().footprint_bytes(&self.config().memory) * workers,
            "starting parallel proof search"
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| Error::ThreadPool(e.to_string()))?;

        // Fixed starts interleave so no two workers share a nonce
        let stride = match self.config().start {
            StartNonce::Fixed(_) => workers as u64,
            StartNonce::Random => 1,
        };

        let shared = SharedSearch::default();
        let results: Vec<Result<Outcome>> = pool.install(|| {
            seeds
                .into_par_iter()
                .enumerate()
                .map(|(worker, seed)| {
                    let _span = tracing::debug_span!("worker", worker).entered();
                    let mut rng = ChaCha12Rng::from_seed(seed);
                    let start = match self.config().start {
                        StartNonce::Fixed(nonce) => nonce.saturating_add(worker as u64),
                        StartNonce::Random => self.start_nonce(algorithm, &mut rng),
                    };
                    let outcome = self.run(request, start, stride, &mut rng, Some(&shared));
                    match &outcome {
                        Ok(Outcome::Found(record)) => shared.publish(record.clone()),
                        Ok(Outcome::Cancelled) => {}
                        // This worker's range is spent; the others keep going
                        Err(Error::SearchExhausted {
                            reason: ExhaustReason::NonceCeiling,
                            ..
                        }) => {}
                        Err(_) => shared.cancel(),
                    }
                    outcome
                })
                .collect()
        });

        let total = shared.iterations(budget);
        if let Some(record) = shared.found.into_inner() {
            return Ok(record);
        }

        // Report the limit that stopped the search as a whole, if any
        let mut errors: Vec<Error> = results.into_iter().filter_map(|r| r.err()).collect();
        let first_global = errors.iter().position(|e| {
            !matches!(
                e,
                Error::SearchExhausted {
                    reason: ExhaustReason::NonceCeiling,
                    ..
                }
            )
        });
        let err = match first_global {
            Some(i) => Some(errors.swap_remove(i)),
            None => errors.pop(),
        }
        .unwrap_or(Error::SearchExhausted {
            iterations: total,
            last_nonce: 0,
            reason: ExhaustReason::Iterations,
        });
        Err(match err {
            Error::SearchExhausted {
                last_nonce, reason, ..
            } => Error::SearchExhausted {
                iterations: total,
                last_nonce,
                reason,
            },
            other => other,
        })
    }
}
