//! Candidate search over every non-zero R2 initial state.
//!
//! Each state is an independent task: generate `n` bits of undecimated R2
//! output and stream them through the shared matcher. Results land in a
//! vector indexed by `state - 1`, so the whole state space is accounted for.

use ciphersearch_arbp::Matcher;
use ciphersearch_core::{lfsr, AttackConfig, BitSeq};
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

/// Filter result for one R2 hypothesis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// R2 initial state, `1..=2^degree - 1`.
    pub state: u64,
    /// Whether some text position matched within `K` errors.
    pub matched: bool,
    /// Smallest error level reported, when matched.
    pub min_errors: Option<usize>,
    /// Text positions reporting a match.
    pub hits: usize,
    /// The `n`-bit undecimated output, kept only for matched states.
    #[serde(skip)]
    pub sequence: Option<BitSeq>,
}

/// Every evaluated state of one run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CandidateSet {
    entries: Vec<Candidate>,
}

impl CandidateSet {
    /// Number of evaluated states (matched or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no state was evaluated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for `state`.
    #[must_use]
    pub fn get(&self, state: u64) -> Option<&Candidate> {
        let idx = usize::try_from(state.checked_sub(1)?).ok()?;
        self.entries.get(idx)
    }

    /// All entries in state order.
    pub fn iter(&self) -> impl Iterator<Item = &Candidate> + '_ {
        self.entries.iter()
    }

    /// Matched entries in state order.
    pub fn matched(&self) -> impl Iterator<Item = &Candidate> + '_ {
        self.entries.iter().filter(|c| c.matched)
    }

    /// Number of matched states.
    #[must_use]
    pub fn matched_count(&self) -> u64 {
        self.matched().count() as u64
    }

    /// Whether `state` survived the filter.
    #[must_use]
    pub fn contains(&self, state: u64) -> bool {
        self.get(state).is_some_and(|c| c.matched)
    }
}

impl FromIterator<Candidate> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = Candidate>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Generate and scan one R2 hypothesis.
#[must_use]
pub fn evaluate_state(config: &AttackConfig, matcher: &Matcher, state: u64) -> Candidate {
    let text = lfsr::generate(config.polynomial(), state, config.text_len());
    let levels = matcher.scan(&text);
    let matched = levels.any();
    let min_errors = levels.best();
    if matched {
        debug!(state, ?min_errors, hits = levels.hit_count(), "candidate matched");
    }
    Candidate {
        state,
        matched,
        min_errors,
        hits: levels.hit_count(),
        sequence: matched.then_some(text),
    }
}

/// Evaluate every state `1..=2^degree - 1` on the current rayon pool.
#[must_use]
pub fn search_candidates(config: &AttackConfig, matcher: &Matcher) -> CandidateSet {
    let entries: Vec<Candidate> = (1..=config.max_state())
        .into_par_iter()
        .map(|state| evaluate_state(config, matcher, state))
        .collect();
    debug_assert!(entries
        .iter()
        .zip(1..)
        .all(|(c, state)| c.state == state));
    CandidateSet { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::Target;
    use ciphersearch_core::AttackParams;

    #[test]
    fn set_is_indexed_by_state() {
        let set: CandidateSet = (1..=4)
            .map(|state| Candidate {
                state,
                matched: state % 2 == 0,
                min_errors: (state % 2 == 0).then_some(0),
                hits: 0,
                sequence: None,
            })
            .collect();
        assert_eq!(set.len(), 4);
        assert!(set.get(0).is_none());
        assert_eq!(set.get(3).map(|c| c.state), Some(3));
        assert!(set.contains(4));
        assert!(!set.contains(3));
        assert!(!set.contains(99));
        assert_eq!(set.matched_count(), 2);
    }

    #[test]
    fn true_state_survives_a_generous_budget() {
        let cfg = AttackParams::new(11, 24, 4).validate().unwrap();
        let target = Target::simulate(&cfg, 7, 42, BitSeq::zeros(24)).unwrap();
        let matcher = Matcher::for_attack(target.ciphertext(), &cfg);
        let c = evaluate_state(&cfg, &matcher, 42);
        assert!(c.matched);
        assert_eq!(c.min_errors, Some(4));
        assert_eq!(c.sequence.as_ref().map(BitSeq::len), Some(48));
    }
}
