//! Verification and collision resolution.
//!
//! For every matched candidate, all R1 states `0..2^degree` are tried against
//! the candidate's stored sequence. Each task collects its reproducing pairs
//! locally; the lists are merged after the parallel phase.

use ciphersearch_core::{cipher, lfsr, AttackConfig};
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::search::{Candidate, CandidateSet};
use crate::target::{StatePair, Target};

/// Classification of a finished run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// Exactly the expected key reproduces the ciphertext.
    Success,
    /// No state survived the filter.
    NoCandidates,
    /// (Almost) every state survived; the filter did not discriminate.
    Saturated,
    /// The filter dropped the true R2 state (or, without ground truth,
    /// nothing reproduced the ciphertext).
    TrueStateAbsent {
        /// Matched candidates.
        matched: u64,
    },
    /// More foreign reproducing pairs than the configured threshold.
    CollisionDetected {
        /// Reproducing pairs other than the key.
        collisions: usize,
    },
}

/// Exit statuses available to true-state-absent counts.
const ABSENT_STATUS_SPAN: u64 = 252;

impl Outcome {
    /// Process exit code.
    #[must_use]
    pub fn code(&self) -> i64 {
        match *self {
            Self::Success => 0,
            Self::NoCandidates => -1,
            Self::Saturated => -2,
            Self::TrueStateAbsent { matched } => i64::try_from(matched).unwrap_or(i64::MAX),
            Self::CollisionDetected { .. } => -3,
        }
    }

    /// Process exit status.
    ///
    /// Sentinels map to `255`, `254` and `253` (the low byte of `-1`, `-2`
    /// and `-3`); a true-state-absent count folds into `1..=252` so it can
    /// never read as success or as a sentinel. The exact count stays in
    /// [`Outcome::code`].
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn exit_status(&self) -> u8 {
        match *self {
            Self::Success => 0,
            Self::NoCandidates => 255,
            Self::Saturated => 254,
            Self::CollisionDetected { .. } => 253,
            Self::TrueStateAbsent { matched } => {
                (1 + matched.saturating_sub(1) % ABSENT_STATUS_SPAN) as u8
            }
        }
    }

    /// Status tag used in sweep reports.
    #[must_use]
    pub const fn status(&self) -> &'static str {
        match self {
            Self::Success => "valid",
            Self::NoCandidates => "invalid_zero_set",
            Self::Saturated => "invalid_full_set",
            Self::TrueStateAbsent { .. } => "invalid_no_r2",
            Self::CollisionDetected { .. } => "invalid_collisions",
        }
    }

    /// Whether the result file is worth keeping.
    #[must_use]
    pub const fn keeps_result_file(&self) -> bool {
        !matches!(self, Self::NoCandidates | Self::Saturated)
    }
}

/// Outcome plus every `(R1, R2)` pair found to reproduce the ciphertext.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Verification {
    /// Classification.
    pub outcome: Outcome,
    /// Reproducing pairs, sorted. Empty when verification was skipped.
    pub reproductions: Vec<StatePair>,
}

/// Every R1 state that, combined with `candidate`, reproduces the target.
#[must_use]
pub fn reproductions_for(
    config: &AttackConfig,
    target: &Target,
    candidate: &Candidate,
) -> Vec<StatePair> {
    let Some(decimated) = candidate.sequence.as_ref() else {
        return Vec::new();
    };
    let m = config.pattern_len();
    (0..=config.max_state())
        .filter(|&r1| {
            let clock = lfsr::generate(config.polynomial(), r1, m);
            cipher::reproduces(&clock, decimated, target.plaintext(), target.ciphertext())
        })
        .map(|r1| StatePair::new(r1, candidate.state))
        .inspect(|pair| debug!(%pair, "ciphertext reproduced"))
        .collect()
}

/// Classify the run, brute-forcing R1 only when the filter left a
/// meaningful set that still contains the key.
#[must_use]
pub fn resolve(config: &AttackConfig, target: &Target, set: &CandidateSet) -> Verification {
    let matched = set.matched_count();
    let skipped = |outcome| Verification {
        outcome,
        reproductions: Vec::new(),
    };

    if matched == 0 {
        return skipped(Outcome::NoCandidates);
    }
    if matched >= config.saturation_bound() {
        return skipped(Outcome::Saturated);
    }
    if let Some(truth) = target.truth() {
        if !set.contains(truth.r2) {
            return skipped(Outcome::TrueStateAbsent { matched });
        }
    }

    let candidates: Vec<&Candidate> = set.matched().collect();
    let mut reproductions: Vec<StatePair> = candidates
        .par_iter()
        .map(|c| reproductions_for(config, target, c))
        .reduce(Vec::new, |mut a, mut b| {
            a.append(&mut b);
            a
        });
    reproductions.sort_unstable();

    let outcome = classify(config, target, matched, &reproductions);
    Verification {
        outcome,
        reproductions,
    }
}

fn classify(
    config: &AttackConfig,
    target: &Target,
    matched: u64,
    reproductions: &[StatePair],
) -> Outcome {
    let collisions = match target.truth() {
        Some(truth) => reproductions.iter().filter(|&&p| p != truth).count(),
        None if reproductions.is_empty() => return Outcome::TrueStateAbsent { matched },
        None => reproductions.len() - 1,
    };
    if collisions > config.collision_threshold() {
        Outcome::CollisionDetected { collisions }
    } else {
        Outcome::Success
    }
}
