//! PolyPoW Parameters
//!
//! Fixed sizes, nonce spans and default cost parameters shared by the
//! search engine and the verifier.

/// SHA-256 output size
pub const SHA256_SIZE: usize = 32;

/// Argon2id output size
pub const ARGON2_OUTPUT_LEN: usize = 32;

/// Argon2id salt size (matches the password-hash default)
pub const ARGON2_SALT_LEN: usize = 16;

/// scrypt output size
pub const SCRYPT_OUTPUT_LEN: usize = 64;

/// Hex nibbles in a SHA-256 digest
pub const SHA256_HEX_LEN: usize = SHA256_SIZE * 2;

/// Upper bound (inclusive) of the random start nonce for most algorithms
pub const NONCE_SPAN: u64 = 100_000_000_000;

/// Upper bound (inclusive) of the random start nonce for the factorial puzzle
pub const FACTORIAL_NONCE_SPAN: u64 = 100;

/// Upper bound (inclusive) of the per-iteration value drawn by the randomized puzzle
pub const RANDOM_VALUE_MAX: u32 = 1_000_000;

/// Largest re-hash count accepted for the chained puzzle
pub const MAX_CHAIN_ROUNDS: u64 = 1_000_000;

/// Default iteration ceiling for a single search
pub const DEFAULT_MAX_ITERATIONS: u64 = 50_000_000;

/// Default ceiling on factorial evaluation
pub const DEFAULT_MAX_FACTORIAL_NONCE: u64 = 10_000;

/// Default number of memory-hard evaluations allowed to run at once
pub const DEFAULT_MAX_MEMORY_HARD_WORKERS: usize = 2;

/// Argon2 memory cost in KiB (RFC 9106 low-memory profile)
pub const DEFAULT_ARGON2_M_COST: u32 = 64 * 1024;

/// Argon2 passes (RFC 9106 low-memory profile)
pub const DEFAULT_ARGON2_T_COST: u32 = 3;

/// Argon2 lanes
pub const DEFAULT_ARGON2_P_COST: u32 = 4;

/// scrypt log2(N), N = 16384
pub const DEFAULT_SCRYPT_LOG_N: u8 = 14;

/// scrypt block size
pub const DEFAULT_SCRYPT_R: u32 = 8;

/// scrypt parallelism
pub const DEFAULT_SCRYPT_P: u32 = 1;

/// Iterations between progress trace events
pub const PROGRESS_INTERVAL: u64 = 1 << 16;
