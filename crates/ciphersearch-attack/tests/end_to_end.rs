//! Full pipeline regressions on degree 11 (feedback 1209), plaintext zero.
//!
//! Matched-candidate counts are deterministic for fixed inputs and pinned
//! here as baselines.

use ciphersearch_arbp::Matcher;
use ciphersearch_attack::{
    search, Attack, CandidateSet, Outcome, RunReport, StatePair, Target,
};
use ciphersearch_core::{AttackConfig, AttackParams, BitSeq, MatcherConfig, Radix};

fn config(m: usize, errors: usize) -> AttackConfig {
    let mut params = AttackParams::new(11, m, errors);
    params.threads = 2;
    params.validate().unwrap()
}

fn run(r1: u64, r2: u64, m: usize, errors: usize) -> RunReport {
    let cfg = config(m, errors);
    let target = Target::simulate(&cfg, r1, r2, BitSeq::zeros(m)).unwrap();
    Attack::new(cfg).run(&target).unwrap()
}

#[test]
fn tight_budget_finds_nothing() {
    let r = run(7, 42, 16, 1);
    assert_eq!(r.outcome, Outcome::NoCandidates);
    assert_eq!(r.summary_line(), "-1,0");
    assert!(r.reproductions.is_empty());
}

#[test]
fn loose_budget_at_short_m_loses_the_true_state() {
    let r = run(7, 42, 16, 3);
    assert_eq!(r.outcome, Outcome::TrueStateAbsent { matched: 940 });
    assert_eq!(r.code, 940);
}

#[test]
fn unique_key_recovered() {
    let r = run(7, 42, 24, 4);
    assert_eq!(r.outcome, Outcome::Success);
    assert_eq!(r.matched, 197);
    assert_eq!(r.recovered_key(), Some(StatePair::new(7, 42)));
    assert_eq!(r.summary_line(), "0,197");
}

#[test]
fn colliding_keys_are_reported() {
    let r = run(0, 42, 16, 1);
    assert_eq!(r.matched, 19);
    assert_eq!(r.outcome, Outcome::CollisionDetected { collisions: 3 });
    assert_eq!(r.code, -3);
    assert_eq!(
        r.reproductions,
        [
            StatePair::new(0, 42),
            StatePair::new(576, 10),
            StatePair::new(1152, 10),
            StatePair::new(1312, 1029),
        ]
    );
    assert_eq!(r.recovered_key(), None);
}

#[test]
fn longer_word_removes_the_collisions() {
    let r = run(0, 42, 24, 2);
    assert_eq!(r.outcome, Outcome::Success);
    assert_eq!(r.matched, 29);
    assert_eq!(r.reproductions, [StatePair::new(0, 42)]);
}

#[test]
fn saturated_filter() {
    let r = run(7, 42, 6, 5);
    assert_eq!(r.outcome, Outcome::Saturated);
    assert_eq!(r.matched, 2047);
    assert_eq!(r.code, -2);

    // one below the bound is still a usable set
    let cfg = config(5, 4);
    let target = Target::simulate(&cfg, 7, 42, BitSeq::zeros(5)).unwrap();
    let matcher = Matcher::for_attack(target.ciphertext(), &cfg);
    let set = search::search_candidates(&cfg, &matcher);
    assert_eq!(set.matched_count(), 2045);
    assert!(set.matched_count() < cfg.saturation_bound());
}

#[test]
fn candidate_set_is_complete_and_consistent() {
    let cfg = config(24, 4);
    let target = Target::simulate(&cfg, 7, 42, BitSeq::zeros(24)).unwrap();
    let matcher = Matcher::for_attack(target.ciphertext(), &cfg);
    let set: CandidateSet = search::search_candidates(&cfg, &matcher);

    assert_eq!(set.len(), 2047);
    assert!(set.get(0).is_none());
    assert!(set.iter().all(|c| c.state != 0));
    assert!(set.contains(42));
    for state in [1, 42, 300, 1024, 2047] {
        let direct = search::evaluate_state(&cfg, &matcher, state);
        assert_eq!(set.get(state), Some(&direct), "state {state}");
    }
    assert!(set
        .matched()
        .all(|c| c.sequence.is_some() && c.min_errors.is_some()));
    assert!(set
        .iter()
        .filter(|c| !c.matched)
        .all(|c| c.sequence.is_none()));
}

#[test]
fn insertion_widens_the_filter() {
    let mut params = AttackParams::new(11, 24, 4);
    params.threads = 2;
    params.matcher = MatcherConfig {
        shift_or: true,
        allow_insertion: true,
    };
    let cfg = params.validate().unwrap();
    let target = Target::simulate(&cfg, 7, 42, BitSeq::zeros(24)).unwrap();
    let matcher = Matcher::for_attack(target.ciphertext(), &cfg);
    let set = search::search_candidates(&cfg, &matcher);
    assert_eq!(set.matched_count(), 270);
    assert!(set.contains(42));
}

#[test]
fn shift_and_convention_agrees() {
    let mut params = AttackParams::new(11, 24, 4);
    params.threads = 1;
    params.matcher.shift_or = false;
    let cfg = params.validate().unwrap();
    let target = Target::simulate(&cfg, 7, 42, BitSeq::zeros(24)).unwrap();
    let r = Attack::new(cfg).run(&target).unwrap();
    assert_eq!(r.outcome, Outcome::Success);
    assert_eq!(r.matched, 197);
}

#[test]
fn intercepted_ciphertext_recovers_the_key() {
    let cfg = config(24, 2);
    let simulated = Target::simulate(&cfg, 0, 42, BitSeq::zeros(24)).unwrap();
    let target =
        Target::intercepted(&cfg, simulated.ciphertext().clone(), BitSeq::zeros(24)).unwrap();
    let r = Attack::new(cfg).run(&target).unwrap();
    assert_eq!(r.truth, None);
    assert_eq!(r.outcome, Outcome::Success);
    assert_eq!(r.recovered_key(), Some(StatePair::new(0, 42)));
}

#[test]
fn result_file_kept_only_when_informative() {
    let dir = tempfile::tempdir().unwrap();

    let cfg = config(16, 1);
    let target = Target::simulate(&cfg, 0, 42, BitSeq::zeros(16)).unwrap();
    let r = Attack::new(cfg)
        .with_output(dir.path(), Radix::Base62)
        .run(&target)
        .unwrap();
    let path = r.result_file.clone().unwrap();
    assert!(path.ends_with("ciphersearch_L11_M16_N32_K1_R10_R242.log"));
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 1 + 19);
    assert!(text.lines().skip(1).any(|l| l.starts_with("42,0,")));

    let target = Target::simulate(&cfg, 7, 42, BitSeq::zeros(16)).unwrap();
    let r = Attack::new(cfg)
        .with_output(dir.path(), Radix::Decimal)
        .run(&target)
        .unwrap();
    assert_eq!(r.outcome, Outcome::NoCandidates);
    assert!(r.result_file.is_none());
    assert!(!dir
        .path()
        .join("ciphersearch_L11_M16_N32_K1_R17_R242.log")
        .exists());

    let json = r.to_json().unwrap();
    assert!(json.contains("\"kind\": \"no_candidates\""));
}
