//! Digest providers for PolyPoW
//!
//! The engine treats every provider as an opaque one-way function. SHA-256 is
//! the fast fixed-output hash; Argon2id and scrypt are the two memory-hard
//! providers, each with its own cost-parameter shape.

use core::fmt::Write as _;

use argon2::{Algorithm as Argon2Variant, Argon2, Params as Argon2Params, Version};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::{ConfigError, DigestError};
use crate::params::*;

/// Fast fixed-output hash: SHA-256
#[inline]
pub fn sha256(input: &[u8]) -> [u8; SHA256_SIZE] {
    Sha256::digest(input).into()
}

/// Build the puzzle input `data || decimal(nonce)`
pub fn puzzle_input(data: &[u8], nonce: impl core::fmt::Display) -> Vec<u8> {
    let mut suffix = String::with_capacity(24);
    // Writing into a String cannot fail
    let _ = write!(suffix, "{nonce}");

    let mut input = Vec::with_capacity(data.len() + suffix.len());
    input.extend_from_slice(data);
    input.extend_from_slice(suffix.as_bytes());
    input
}

/// SHA-256 of `data || decimal(nonce)`
#[inline]
pub fn sha256_with_suffix(data: &[u8], suffix: impl core::fmt::Display) -> [u8; SHA256_SIZE] {
    sha256(&puzzle_input(data, suffix))
}

/// Re-hash a digest `rounds` times, each round hashing the lowercase hex text
/// of the previous digest.
pub fn sha256_chain(seed: [u8; SHA256_SIZE], rounds: u64) -> [u8; SHA256_SIZE] {
    let mut digest = seed;
    for _ in 0..rounds {
        digest = sha256(hex::encode(digest).as_bytes());
    }
    digest
}

/// A memory-hard digest provider with engine-fixed cost parameters
pub trait MemoryHardDigest {
    /// Compute the digest of `input`.
    ///
    /// Providers that salt themselves draw the salt from `rng`.
    fn memory_hard_digest(&self, input: &[u8], rng: &mut dyn RngCore)
    -> Result<Vec<u8>, DigestError>;

    /// Whether identical inputs always produce identical output
    fn reproducible(&self) -> bool;

    /// Output length in bytes
    fn output_len(&self) -> usize;

    /// Approximate resident memory of one evaluation, in bytes
    fn footprint_bytes(&self) -> usize;
}

/// Argon2id cost parameters
///
/// Every evaluation uses a fresh random salt, so outputs are not reproducible
/// from the input alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Cost {
    /// Memory size in KiB
    pub m_cost: u32,
    /// Number of passes
    pub t_cost: u32,
    /// Degree of parallelism
    pub p_cost: u32,
}

impl Argon2Cost {
    fn params(&self) -> Result<Argon2Params, argon2::Error> {
        Argon2Params::new(
            self.m_cost,
            self.t_cost,
            self.p_cost,
            Some(ARGON2_OUTPUT_LEN),
        )
    }

    /// Check the cost parameters against argon2's limits
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.params()
            .map(|_| ())
            .map_err(|e| ConfigError::InvalidMemoryCost {
                provider: "argon2",
                reason: e.to_string(),
            })
    }
}

impl Default for Argon2Cost {
    fn default() -> Self {
        Self {
            m_cost: DEFAULT_ARGON2_M_COST,
            t_cost: DEFAULT_ARGON2_T_COST,
            p_cost: DEFAULT_ARGON2_P_COST,
        }
    }
}

impl MemoryHardDigest for Argon2Cost {
    fn memory_hard_digest(
        &self,
        input: &[u8],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<u8>, DigestError> {
        let params = self.params().map_err(DigestError::Argon2)?;
        let hasher = Argon2::new(Argon2Variant::Argon2id, Version::V0x13, params);

        let mut salt = [0u8; ARGON2_SALT_LEN];
        rng.fill_bytes(&mut salt);

        let mut out = vec![0u8; ARGON2_OUTPUT_LEN];
        hasher
            .hash_password_into(input, &salt, &mut out)
            .map_err(DigestError::Argon2)?;
        Ok(out)
    }

    fn reproducible(&self) -> bool {
        false
    }

    fn output_len(&self) -> usize {
        ARGON2_OUTPUT_LEN
    }

    fn footprint_bytes(&self) -> usize {
        self.m_cost as usize * 1024
    }
}

/// scrypt cost parameters
///
/// The salt is empty, so outputs depend only on the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScryptCost {
    /// log2 of the CPU/memory cost N
    pub log_n: u8,
    /// Block size
    pub r: u32,
    /// Parallelism
    pub p: u32,
}

impl ScryptCost {
    fn params(&self) -> Result<scrypt::Params, scrypt::errors::InvalidParams> {
        scrypt::Params::new(self.log_n, self.r, self.p, SCRYPT_OUTPUT_LEN)
    }

    /// Check the cost parameters against scrypt's limits
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.params()
            .map(|_| ())
            .map_err(|e| ConfigError::InvalidMemoryCost {
                provider: "scrypt",
                reason: e.to_string(),
            })
    }
}

impl Default for ScryptCost {
    fn default() -> Self {
        Self {
            log_n: DEFAULT_SCRYPT_LOG_N,
            r: DEFAULT_SCRYPT_R,
            p: DEFAULT_SCRYPT_P,
        }
    }
}

impl MemoryHardDigest for ScryptCost {
    fn memory_hard_digest(
        &self,
        input: &[u8],
        _rng: &mut dyn RngCore,
    ) -> Result<Vec<u8>, DigestError> {
        let params = self
            .params()
            .map_err(|e| DigestError::Scrypt(e.to_string()))?;

        let mut out = vec![0u8; SCRYPT_OUTPUT_LEN];
        scrypt::scrypt(input, b"", &params, &mut out)
            .map_err(|e| DigestError::Scrypt(e.to_string()))?;
        Ok(out)
    }

    fn reproducible(&self) -> bool {
        true
    }

    fn output_len(&self) -> usize {
        SCRYPT_OUTPUT_LEN
    }

    fn footprint_bytes(&self) -> usize {
        // 128 * r * N for the V array, plus 128 * r * p for B
        let n = 1usize
            .checked_shl(u32::from(self.log_n))
            .unwrap_or(usize::MAX);
        (128 * self.r as usize).saturating_mul(n.saturating_add(self.p as usize))
    }
}
