//! PolyPoW Prover Library
//!
//! Configuration and report handling around the PolyPoW engine.
//!
//! # Overview
//!
//! The engine itself lives in `polypow-core` and is re-exported here as
//! [`algorithm`]. This crate adds what a command-line prover needs on top:
//!
//! - **Configuration**: JSON config files with per-field defaults
//! - **Difficulty parsing**: decimal, `0x` hex, or `max/N` thresholds
//! - **Reports**: proof records as JSON and as human-readable text
//!
//! # Example
//!
//! ```rust
//! use polypow::config::{parse_difficulty, ProverConfig};
//! use polypow::report::ProofReport;
//! use polypow::{Algorithm, Engine, ProofRequest};
//!
//! let config = ProverConfig {
//!     start_nonce: Some(0),
//!     ..ProverConfig::default()
//! };
//! let engine = Engine::new(config.engine_config())?;
//!
//! let difficulty = parse_difficulty("max/16")?;
//! let request = ProofRequest::new(b"Hello World!".to_vec(), Algorithm::Numerical, difficulty)?;
//! let record = engine.search(&request)?;
//!
//! let report = ProofReport::from_record(&record);
//! assert!(engine.verify(&report.to_record()?).is_valid());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export the core engine
pub use polypow_core as algorithm;

pub mod config;
pub mod report;

// Convenience re-exports
pub use algorithm::{verify, Algorithm, Engine, ProofRecord, ProofRequest, Verdict};
