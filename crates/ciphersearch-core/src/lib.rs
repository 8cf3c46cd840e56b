// crates/ciphersearch-core/src/lib.rs

//! ciphersearch-core: bit vectors, LFSR engine and the clock-controlled
//! cipher oracle.
//!
//! This crate is the arithmetic floor of the workspace:
//! - [`BitSeq`], an arbitrary-width LSB-first bit vector with windowed shifts,
//! - [`Lfsr`], a generalized feedback shift register,
//! - [`cipher`], the decimating combiner `c_i = x_j XOR p_i`, and
//! - [`AttackParams`] / [`AttackConfig`], validated run configuration.
//!
//! ```
//! use ciphersearch_core::{cipher, lfsr, BitSeq, FeedbackPolynomial};
//!
//! let poly = FeedbackPolynomial::for_degree(11)?;
//! let clock = lfsr::generate(&poly, 7, 16);
//! let decimated = lfsr::generate(&poly, 42, 32);
//! let c = cipher::encrypt(&clock, &decimated, &BitSeq::zeros(16), 16);
//! assert_eq!(c.len(), 16);
//! # Ok::<(), ciphersearch_core::ConfigError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation
)]

/// Fixed-width LSB-first bit vectors and their textual encodings.
pub mod bits;
/// Clock-controlled decimation + XOR combiner.
pub mod cipher;
/// Feedback polynomials and validated attack configuration.
pub mod config;
/// Configuration and parse error types.
pub mod error;
/// Feedback shift register engine.
pub mod lfsr;

pub use bits::{BitSeq, Radix};
pub use config::{
    AttackConfig, AttackParams, FeedbackPolynomial, MatcherConfig, SUPPORTED_POLYNOMIALS,
};
pub use error::{ConfigError, ParseBitsError, RegisterRole};
pub use lfsr::Lfsr;
