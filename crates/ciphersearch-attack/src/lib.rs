// crates/ciphersearch-attack/src/lib.rs

//! Known-plaintext attack on a clock-controlled LFSR cipher.
//!
//! A run has two parallel phases separated by a barrier:
//! 1. [`search::search_candidates`] filters every non-zero R2 state through
//!    the k-error matcher built from the ciphertext;
//! 2. [`verify::resolve`] brute-forces R1 for each surviving candidate and
//!    classifies the run as an [`Outcome`].
//!
//! [`Attack`] wires both phases to a dedicated rayon pool, writes the
//! per-run result file and returns a [`RunReport`].

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

/// Result files and run reports.
pub mod report;
/// Parallel candidate search.
pub mod search;
/// Ciphertext, plaintext and ground truth.
pub mod target;
/// Verification and outcome classification.
pub mod verify;

use anyhow::{Context as _, Result};
use ciphersearch_arbp::Matcher;
use ciphersearch_core::{AttackConfig, Radix};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

pub use report::{OutputOptions, RunReport};
pub use search::{Candidate, CandidateSet};
pub use target::{random_plaintext, PlaintextSource, StatePair, Target};
pub use verify::{Outcome, Verification};

/// One configured attack.
#[derive(Clone, Debug)]
pub struct Attack {
    config: AttackConfig,
    output: Option<OutputOptions>,
}

impl Attack {
    /// Attack that keeps everything in memory.
    #[must_use]
    pub const fn new(config: AttackConfig) -> Self {
        Self {
            config,
            output: None,
        }
    }

    /// Also write the result file into `dir`.
    #[must_use]
    pub fn with_output(mut self, dir: impl Into<PathBuf>, radix: Radix) -> Self {
        self.output = Some(OutputOptions {
            dir: dir.into(),
            radix,
        });
        self
    }

    /// Validated configuration.
    #[must_use]
    pub const fn config(&self) -> &AttackConfig {
        &self.config
    }

    /// Run both phases against `target`.
    pub fn run(&self, target: &Target) -> Result<RunReport> {
        let cfg = &self.config;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(cfg.threads())
            .build()
            .context("build worker pool")?;
        let matcher = Matcher::for_attack(target.ciphertext(), cfg);

        info!(
            degree = cfg.degree(),
            m = cfg.pattern_len(),
            n = cfg.text_len(),
            k = cfg.errors(),
            threads = cfg.threads(),
            states = cfg.max_state(),
            "candidate search"
        );
        let t0 = Instant::now();
        let set = pool.install(|| search::search_candidates(cfg, &matcher));
        let search_ms = t0.elapsed().as_millis();
        let matched = set.matched_count();
        info!(matched, elapsed_ms = search_ms, "candidate search done");

        let written = match &self.output {
            Some(out) => Some(report::write_result_file(out, cfg, target, &set)?),
            None => None,
        };

        let t1 = Instant::now();
        let verification = pool.install(|| verify::resolve(cfg, target, &set));
        let verify_ms = t1.elapsed().as_millis();
        let outcome = verification.outcome;
        info!(
            status = outcome.status(),
            code = outcome.code(),
            reproductions = verification.reproductions.len(),
            elapsed_ms = verify_ms,
            "verification done"
        );
        match outcome {
            Outcome::CollisionDetected { collisions } => {
                warn!(collisions, "ciphertext reproduced by foreign key pairs");
            }
            Outcome::TrueStateAbsent { matched } => {
                warn!(matched, "true R2 state not among the candidates");
            }
            _ => {}
        }

        let result_file = match written {
            Some(path) if !outcome.keeps_result_file() => {
                report::discard_result_file(&path)?;
                None
            }
            other => other,
        };

        Ok(RunReport {
            config: *cfg,
            truth: target.truth(),
            ciphertext: target.ciphertext().to_transmission_string(),
            outcome,
            code: outcome.code(),
            matched,
            reproductions: verification.reproductions,
            search_ms,
            verify_ms,
            result_file,
        })
    }
}
