// crates/ciphersearch-arbp/src/lib.rs

//! Approximate row-based bit-parallel (ARBP) matching over binary text.
//!
//! - [`pattern`] builds the per-symbol masks and initial error rows,
//! - [`matcher`] streams a text through `K + 1` automaton rows and reports
//!   the minimum error level at which the pattern ends at each position.
//!
//! Both Shift-AND and Shift-OR polarities are available at runtime through
//! [`ciphersearch_core::MatcherConfig`].

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

pub mod matcher;
pub mod pattern;

pub use matcher::{MatchLevels, Matcher};
pub use pattern::{AlphabetMasks, ErrorRows};
