//! Prover configuration
//!
//! A JSON file supplies engine settings; command-line flags override it.
//! Every field is optional in the file and falls back to the engine default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use polypow_core::{
    Argon2Cost, BigUint, EngineConfig, MemoryCosts, ScryptCost, SearchLimits, StartNonce,
};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading configuration or parsing user input
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// The file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that was read
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The file is not valid configuration JSON
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// File that was parsed
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },

    /// RNG seed is not 32 hex-encoded bytes
    #[error("seed must be 64 hex characters: {0}")]
    BadSeed(String),

    /// Difficulty string could not be parsed
    #[error("invalid difficulty '{0}' (expected decimal, 0x-hex, or max/N)")]
    BadDifficulty(String),

    /// The OS random source failed
    #[error("failed to read OS randomness: {0}")]
    Entropy(String),
}

/// Argon2id cost section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Argon2Settings {
    /// Memory size in KiB
    pub m_cost: u32,
    /// Number of passes
    pub t_cost: u32,
    /// Degree of parallelism
    pub p_cost: u32,
}

impl Default for Argon2Settings {
    fn default() -> Self {
        let cost = Argon2Cost::default();
        Self {
            m_cost: cost.m_cost,
            t_cost: cost.t_cost,
            p_cost: cost.p_cost,
        }
    }
}

/// scrypt cost section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScryptSettings {
    /// log2 of N
    pub log_n: u8,
    /// Block size
    pub r: u32,
    /// Parallelism
    pub p: u32,
}

impl Default for ScryptSettings {
    fn default() -> Self {
        let cost = ScryptCost::default();
        Self {
            log_n: cost.log_n,
            r: cost.r,
            p: cost.p,
        }
    }
}

/// Prover configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProverConfig {
    /// Maximum puzzle evaluations per search
    pub max_iterations: u64,
    /// Maximum seconds per search
    pub timeout_secs: Option<u64>,
    /// Largest nonce to evaluate
    pub max_nonce: Option<u64>,
    /// Fixed start nonce (random when absent)
    pub start_nonce: Option<u64>,
    /// Worker threads; 0 means one per CPU core, 1 is a sequential search
    pub threads: usize,
    /// Largest nonce the factorial puzzle evaluates
    pub max_factorial_nonce: u64,
    /// Concurrent memory-hard evaluations allowed
    pub max_memory_hard_workers: usize,
    /// Hex-encoded 32-byte RNG seed for reproducible runs
    pub seed: Option<String>,
    /// Argon2id costs
    pub argon2: Argon2Settings,
    /// scrypt costs
    pub scrypt: ScryptSettings,
}

impl Default for ProverConfig {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            max_iterations: engine.limits.max_iterations,
            timeout_secs: None,
            max_nonce: None,
            start_nonce: None,
            threads: 1,
            max_factorial_nonce: engine.max_factorial_nonce,
            max_memory_hard_workers: engine.max_memory_hard_workers,
            seed: None,
            argon2: Argon2Settings::default(),
            scrypt: ScryptSettings::default(),
        }
    }
}

impl ProverConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigFileError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path` if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigFileError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Engine configuration described by this file
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            limits: SearchLimits {
                max_iterations: self.max_iterations,
                max_duration: self.timeout_secs.map(Duration::from_secs),
                max_nonce: self.max_nonce,
            },
            start: match self.start_nonce {
                Some(nonce) => StartNonce::Fixed(nonce),
                None => StartNonce::Random,
            },
            memory: MemoryCosts {
                argon2: Argon2Cost {
                    m_cost: self.argon2.m_cost,
                    t_cost: self.argon2.t_cost,
                    p_cost: self.argon2.p_cost,
                },
                scrypt: ScryptCost {
                    log_n: self.scrypt.log_n,
                    r: self.scrypt.r,
                    p: self.scrypt.p,
                },
            },
            max_factorial_nonce: self.max_factorial_nonce,
            max_memory_hard_workers: self.max_memory_hard_workers,
        }
    }

    /// RNG for a search: seeded from `seed` when set, from the OS otherwise
    pub fn rng(&self) -> Result<ChaCha12Rng, ConfigFileError> {
        let mut seed = [0u8; 32];
        match &self.seed {
            Some(text) => {
                let bytes = hex::decode(text.trim())
                    .map_err(|_| ConfigFileError::BadSeed(text.clone()))?;
                if bytes.len() != seed.len() {
                    return Err(ConfigFileError::BadSeed(text.clone()));
                }
                seed.copy_from_slice(&bytes);
            }
            None => {
                getrandom::getrandom(&mut seed)
                    .map_err(|e| ConfigFileError::Entropy(e.to_string()))?;
            }
        }
        Ok(ChaCha12Rng::from_seed(seed))
    }
}

/// Parse a difficulty parameter.
///
/// Accepts a decimal integer, a `0x`-prefixed hex integer, or `max/N` for
/// `(2^256 - 1) / N`.
///
/// # Example
///
/// ```rust
/// use polypow::algorithm::BigUint;
/// use polypow::config::parse_difficulty;
///
/// assert_eq!(parse_difficulty("17").unwrap(), BigUint::from(17u32));
/// assert_eq!(parse_difficulty("0xff").unwrap(), BigUint::from(255u32));
/// assert!(parse_difficulty("max/100").unwrap().bits() <= 250);
/// ```
pub fn parse_difficulty(text: &str) -> Result<BigUint, ConfigFileError> {
    let trimmed = text.trim();
    let bad = || ConfigFileError::BadDifficulty(text.to_string());

    if let Some(divisor) = trimmed.strip_prefix("max/") {
        let divisor = BigUint::parse_bytes(divisor.trim().as_bytes(), 10).ok_or_else(bad)?;
        if divisor == BigUint::from(0u32) {
            return Err(bad());
        }
        let max = (BigUint::from(1u32) << 256u32) - 1u32;
        return Ok(max / divisor);
    }

    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => BigUint::parse_bytes(hex.as_bytes(), 16),
        None => BigUint::parse_bytes(trimmed.as_bytes(), 10),
    };
    parsed.ok_or_else(bad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_difficulty_forms() {
        assert_eq!(parse_difficulty("4").unwrap(), BigUint::from(4u32));
        assert_eq!(parse_difficulty(" 0X10 ").unwrap(), BigUint::from(16u32));

        let max = (BigUint::from(1u32) << 256u32) - 1u32;
        assert_eq!(parse_difficulty("max/1").unwrap(), max);
        assert_eq!(
            parse_difficulty("max/100").unwrap(),
            max / BigUint::from(100u32)
        );

        assert!(parse_difficulty("max/0").is_err());
        assert!(parse_difficulty("max/x").is_err());
        assert!(parse_difficulty("-3").is_err());
        assert!(parse_difficulty("0xzz").is_err());
        assert!(parse_difficulty("").is_err());
    }

    #[test]
    fn test_default_config_matches_engine_defaults() {
        assert_eq!(ProverConfig::default().engine_config(), EngineConfig::default());
    }

    #[test]
    fn test_partial_file_takes_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "max_iterations": 1000, "start_nonce": 5, "scrypt": {{ "log_n": 4 }} }}"#
        )
        .unwrap();

        let config = ProverConfig::load(file.path()).unwrap();
        assert_eq!(config.max_iterations, 1000);
        assert_eq!(config.threads, 1);

        let engine = config.engine_config();
        assert_eq!(engine.start, StartNonce::Fixed(5));
        assert_eq!(engine.memory.scrypt.log_n, 4);
        assert_eq!(engine.memory.scrypt.r, ScryptCost::default().r);
        assert_eq!(engine.memory.argon2, Argon2Cost::default());
    }

    #[test]
    fn test_bad_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = ProverConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigFileError::Parse { .. }));

        let err = ProverConfig::load(Path::new("/nonexistent/polypow.json")).unwrap_err();
        assert!(matches!(err, ConfigFileError::Io { .. }));
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        use rand::RngCore;

        let config = ProverConfig {
            seed: Some("11".repeat(32)),
            ..ProverConfig::default()
        };
        let a = config.rng().unwrap().next_u64();
        let b = config.rng().unwrap().next_u64();
        assert_eq!(a, b);

        let short = ProverConfig {
            seed: Some("abcd".to_string()),
            ..ProverConfig::default()
        };
        assert!(matches!(short.rng(), Err(ConfigFileError::BadSeed(_))));

        assert!(ProverConfig::default().rng().is_ok());
    }
}
