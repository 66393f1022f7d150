//! Difficulty predicates: `(candidate, difficulty) -> accepted`

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use crate::algorithm::Algorithm;
use crate::error::ConfigError;
use crate::puzzle::Candidate;

/// Predicate family, before a difficulty parameter is bound to it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredicateKind {
    /// `integer(candidate) < threshold`
    Threshold,
    /// The first N hex digits of the candidate are `0`
    LeadingHexZeros,
    /// The first N bytes of the candidate are `0x00`
    LeadingByteZeros,
    /// `(integer(candidate) XOR nonce) < threshold`
    XorThreshold,
    /// `factorial(nonce) mod divisor == 0`
    Divisibility,
}

/// A difficulty predicate with its parameter validated and bound
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Exclusive upper bound on the candidate
    Threshold(BigUint),
    /// Required count of leading zero hex digits
    LeadingHexZeros(usize),
    /// Required count of leading zero bytes
    LeadingByteZeros(usize),
    /// Exclusive upper bound on candidate XOR nonce
    XorThreshold(BigUint),
    /// Required divisor of the factorial
    Divisibility(BigUint),
}

impl PredicateKind {
    /// Bind a difficulty parameter, rejecting values that can never be satisfied.
    ///
    /// `digest_len` is the byte length of the digest the paired puzzle emits.
    pub fn bind(
        self,
        algorithm: Algorithm,
        difficulty: &BigUint,
        digest_len: usize,
    ) -> Result<Predicate, ConfigError> {
        match self {
            Self::Threshold | Self::XorThreshold => {
                if difficulty.is_zero() {
                    return Err(ConfigError::ZeroThreshold { algorithm });
                }
                Ok(if self == Self::Threshold {
                    Predicate::Threshold(difficulty.clone())
                } else {
                    Predicate::XorThreshold(difficulty.clone())
                })
            }
            Self::Divisibility => {
                if difficulty.is_zero() {
                    return Err(ConfigError::ZeroDivisor { algorithm });
                }
                Ok(Predicate::Divisibility(difficulty.clone()))
            }
            Self::LeadingHexZeros => {
                let count = prefix_len(algorithm, difficulty, digest_len * 2, "nibble")?;
                Ok(Predicate::LeadingHexZeros(count))
            }
            Self::LeadingByteZeros => {
                let count = prefix_len(algorithm, difficulty, digest_len, "byte")?;
                Ok(Predicate::LeadingByteZeros(count))
            }
        }
    }
}

fn prefix_len(
    algorithm: Algorithm,
    requested: &BigUint,
    available: usize,
    unit: &'static str,
) -> Result<usize, ConfigError> {
    requested
        .to_usize()
        .filter(|n| *n <= available)
        .ok_or_else(|| ConfigError::PrefixTooLong {
            algorithm,
            requested: requested.to_string(),
            available,
            unit,
        })
}

impl Predicate {
    /// Test a candidate produced for `nonce`
    pub fn accepts(&self, candidate: &Candidate, nonce: u64) -> bool {
        match self {
            Self::Threshold(threshold) => digest_value(candidate) < *threshold,
            Self::XorThreshold(threshold) => {
                (digest_value(candidate) ^ BigUint::from(nonce)) < *threshold
            }
            Self::LeadingHexZeros(count) => leading_hex_zeros(candidate.digest(), *count),
            Self::LeadingByteZeros(count) => leading_byte_zeros(candidate.digest(), *count),
            Self::Divisibility(divisor) => match candidate {
                Candidate::Factorial { value, .. } => (value % divisor).is_zero(),
                Candidate::Digest(_) => false,
            },
        }
    }
}

/// Interpret the candidate digest as a big-endian unsigned integer
fn digest_value(candidate: &Candidate) -> BigUint {
    BigUint::from_bytes_be(candidate.digest())
}

/// Check that the first `count` hex digits of `digest` are zero
///
/// # Example
///
/// ```rust
/// use polypow_core::leading_hex_zeros;
///
/// assert!(leading_hex_zeros(&[0x00, 0x0F, 0xFF], 3));
/// assert!(!leading_hex_zeros(&[0x00, 0x0F, 0xFF], 4));
/// ```
#[inline]
pub fn leading_hex_zeros(digest: &[u8], count: usize) -> bool {
    if count > digest.len() * 2 {
        return false;
    }
    let full = count / 2;
    if digest[..full].iter().any(|b| *b != 0) {
        return false;
    }
    count % 2 == 0 || digest[full] >> 4 == 0
}

/// Check that the first `count` bytes of `digest` are zero
#[inline]
pub fn leading_byte_zeros(digest: &[u8], count: usize) -> bool {
    digest.len() >= count && digest[..count].iter().all(|b| *b == 0)
}
