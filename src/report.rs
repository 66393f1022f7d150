//! Serializable proof reports
//!
//! A [`ProofReport`] is the on-disk and on-screen form of a
//! [`ProofRecord`]: byte fields as hex, the difficulty as a decimal string.

use std::fmt;

use polypow_core::{Algorithm, BigUint, ConfigError, ProofRecord, ProofRequest};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors turning a report back into a record
#[derive(Debug, Error)]
pub enum ReportError {
    /// A hex field failed to decode
    #[error("invalid hex in '{field}': {source}")]
    Hex {
        /// Field name
        field: &'static str,
        /// Underlying error
        source: hex::FromHexError,
    },

    /// The difficulty is not a decimal integer
    #[error("invalid difficulty '{0}'")]
    Difficulty(String),

    /// Algorithm id or parameters were rejected
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The report is not valid JSON
    #[error("invalid proof report: {0}")]
    Json(#[from] serde_json::Error),
}

/// A proof record in serializable form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofReport {
    /// Algorithm identifier, e.g. `spow`
    pub algorithm: String,
    /// Hex-encoded application data
    pub data: String,
    /// Data as text, for display only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_text: Option<String>,
    /// Difficulty parameter as a decimal integer
    pub difficulty: String,
    /// Explicit chained-hash round count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_rounds: Option<u64>,
    /// Winning nonce
    pub nonce: u64,
    /// Hex-encoded candidate digest
    pub hash: String,
    /// Puzzle evaluations the search performed
    #[serde(default)]
    pub iterations: u64,
}

impl ProofReport {
    /// Build a report from a record
    pub fn from_record(record: &ProofRecord) -> Self {
        let data = record.data();
        Self {
            algorithm: record.algorithm().id().to_string(),
            data: hex::encode(data),
            data_text: std::str::from_utf8(data).ok().map(str::to_string),
            difficulty: record.difficulty().to_string(),
            chain_rounds: record.request().chain_rounds(),
            nonce: record.nonce(),
            hash: hex::encode(record.candidate_digest()),
            iterations: record.iterations(),
        }
    }

    /// Rebuild the record, re-validating the request parameters
    pub fn to_record(&self) -> Result<ProofRecord, ReportError> {
        let algorithm: Algorithm = self.algorithm.parse()?;
        let data = hex::decode(&self.data).map_err(|source| ReportError::Hex {
            field: "data",
            source,
        })?;
        let digest = hex::decode(&self.hash).map_err(|source| ReportError::Hex {
            field: "hash",
            source,
        })?;
        let difficulty = BigUint::parse_bytes(self.difficulty.trim().as_bytes(), 10)
            .ok_or_else(|| ReportError::Difficulty(self.difficulty.clone()))?;

        let request = ProofRequest::from_parts(data, algorithm, difficulty, self.chain_rounds)?;
        Ok(ProofRecord::from_parts(
            request,
            self.nonce,
            digest,
            self.iterations,
        ))
    }

    /// Parse a report from JSON
    pub fn from_json(text: &str) -> Result<Self, ReportError> {
        Ok(serde_json::from_str(text)?)
    }
}

impl fmt::Display for ProofReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Algorithm: {}", self.algorithm)?;
        match &self.data_text {
            Some(text) => writeln!(f, "Data: {}", text)?,
            None => writeln!(f, "Data (hex): {}", self.data)?,
        }
        writeln!(f, "Difficulty: {}", self.difficulty)?;
        if let Some(rounds) = self.chain_rounds {
            writeln!(f, "Rounds: {}", rounds)?;
        }
        writeln!(f, "Nonce: {}", self.nonce)?;
        writeln!(f, "Hash: {}", self.hash)?;
        write!(f, "Iterations: {}", self.iterations)
    }
}
