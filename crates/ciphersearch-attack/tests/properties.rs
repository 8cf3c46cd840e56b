//! Verification soundness and collision symmetry over random keys.
//!
//! Each case runs a full degree-11 search, so the case count stays small.

use ciphersearch_arbp::Matcher;
use ciphersearch_attack::{random_plaintext, search, verify, Outcome, StatePair, Target};
use ciphersearch_core::{cipher, lfsr, AttackConfig, AttackParams, BitSeq};
use proptest::prelude::*;

fn config(m: usize, errors: usize) -> AttackConfig {
    let mut params = AttackParams::new(11, m, errors);
    params.threads = 2;
    params.validate().unwrap()
}

fn reencrypt(cfg: &AttackConfig, pair: StatePair, target: &Target) -> BitSeq {
    let clock = lfsr::generate(cfg.polynomial(), pair.r1, cfg.pattern_len());
    let decimated = lfsr::generate(cfg.polynomial(), pair.r2, cfg.text_len());
    cipher::encrypt(&clock, &decimated, target.plaintext(), cfg.pattern_len())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 8,
        .. ProptestConfig::default()
    })]

    #[test]
    fn verification_is_sound_and_symmetric(
        r1 in 0u64..2048,
        r2 in 1u64..2048,
        m in 16usize..=24,
        errors in 1usize..=3,
        pt_seed in any::<u64>(),
    ) {
        let cfg = config(m, errors);
        let target = Target::simulate(&cfg, r1, r2, random_plaintext(pt_seed, m)).unwrap();
        let matcher = Matcher::for_attack(target.ciphertext(), &cfg);
        let set = search::search_candidates(&cfg, &matcher);
        let v = verify::resolve(&cfg, &target, &set);
        let truth = StatePair::new(r1, r2);

        let verified = set.contains(r2)
            && set.matched_count() > 0
            && set.matched_count() < cfg.saturation_bound();
        if !verified {
            prop_assert!(v.reproductions.is_empty());
            prop_assert!(matches!(
                v.outcome,
                Outcome::NoCandidates | Outcome::Saturated | Outcome::TrueStateAbsent { .. }
            ), "unexpected outcome {:?}", v.outcome);
            return Ok(());
        }

        // every reported pair reproduces the ciphertext and passed the filter
        prop_assert!(v.reproductions.contains(&truth));
        for &pair in &v.reproductions {
            prop_assert!(set.contains(pair.r2), "{} skipped the filter", pair);
            prop_assert_eq!(&reencrypt(&cfg, pair, &target), target.ciphertext());
        }

        let foreign: Vec<StatePair> =
            v.reproductions.iter().copied().filter(|&p| p != truth).collect();
        if foreign.is_empty() {
            prop_assert_eq!(v.outcome, Outcome::Success);
        } else {
            prop_assert_eq!(v.outcome, Outcome::CollisionDetected { collisions: foreign.len() });

            // a colliding key sees the same ciphertext and the same pair list
            let other = foreign[0];
            let mirrored =
                Target::simulate(&cfg, other.r1, other.r2, target.plaintext().clone()).unwrap();
            prop_assert_eq!(mirrored.ciphertext(), target.ciphertext());
            let w = verify::resolve(&cfg, &mirrored, &set);
            prop_assert_eq!(&w.reproductions, &v.reproductions);
            prop_assert_eq!(w.outcome, v.outcome);
        }
    }
}
