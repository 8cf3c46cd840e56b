//! Input-validation error taxonomy.
//!
//! Every variant is raised before any search work is scheduled; outcome
//! classifications of a completed search are not errors and live in the
//! attack crate.

use std::fmt;
use thiserror::Error;

/// Which of the two component registers a seed belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegisterRole {
    /// R1, the register whose output drives decimation.
    Clocking,
    /// R2, the register whose output is decimated.
    Decimated,
}

impl fmt::Display for RegisterRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Clocking => "R1",
            Self::Decimated => "R2",
        })
    }
}

/// Rejected attack configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No feedback polynomial ships for this register width.
    #[error("unsupported polynomial degree {0} (supported: 11, 16)")]
    UnsupportedDegree(usize),

    /// A custom register width outside what a `u64` state id can address.
    #[error("register width {0} outside 1..=63")]
    InvalidWidth(usize),

    /// Search word length `m` of zero.
    #[error("search word length m must be at least 1")]
    EmptyPattern,

    /// Error budget `K` not smaller than `m`.
    #[error("allowed errors K ({errors}) must be smaller than the search word length m ({m})")]
    TooManyErrors {
        /// Requested `K`.
        errors: usize,
        /// Search word length.
        m: usize,
    },

    /// Search word so long that `2m` overflows.
    #[error("search word length m ({0}) is too large")]
    PatternTooLong(usize),

    /// Search text shorter than `2m`.
    #[error("search text length n ({n}) must be at least 2m ({min})")]
    TextTooShort {
        /// Requested `n`.
        n: usize,
        /// Minimum admissible `n`.
        min: usize,
    },

    /// A seed that does not fit the register width.
    #[error("{role} initial state {seed} exceeds the largest state {max}")]
    SeedOutOfRange {
        /// Register the seed was given for.
        role: RegisterRole,
        /// Offending seed.
        seed: u64,
        /// Largest admissible state (`2^degree - 1`).
        max: u64,
    },

    /// Plaintext width differs from `m`.
    #[error("plaintext holds {got} bits but the search word length m is {m}")]
    PlaintextWidth {
        /// Width supplied.
        got: usize,
        /// Search word length.
        m: usize,
    },

    /// Intercepted ciphertext width differs from `m`.
    #[error("ciphertext holds {got} bits but the search word length m is {m}")]
    CiphertextWidth {
        /// Width supplied.
        got: usize,
        /// Search word length.
        m: usize,
    },
}

/// Malformed textual bit sequence.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseBitsError {
    /// A character other than `0` or `1`.
    #[error("invalid bit character {ch:?} at position {pos} (expected '0' or '1')")]
    InvalidChar {
        /// Offending character.
        ch: char,
        /// Zero-based character position.
        pos: usize,
    },
}
