//! Matcher properties: exact reduction at K = 0, monotonicity in K, polarity
//! agreement and insertion monotonicity.

use ciphersearch_arbp::Matcher;
use ciphersearch_core::{BitSeq, MatcherConfig};
use proptest::prelude::*;

const AND: MatcherConfig = MatcherConfig {
    shift_or: false,
    allow_insertion: false,
};
const OR: MatcherConfig = MatcherConfig {
    shift_or: true,
    allow_insertion: false,
};

fn bits(v: &[bool]) -> BitSeq {
    v.iter().copied().collect()
}

/// (pattern, text) with `1 <= m <= 20` and `m <= n <= 80`.
fn pattern_and_text() -> impl Strategy<Value = (Vec<bool>, Vec<bool>)> {
    (1usize..=20).prop_flat_map(|m| {
        (
            prop::collection::vec(any::<bool>(), m),
            prop::collection::vec(any::<bool>(), m..=80),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn zero_errors_is_exact_matching((p, t) in pattern_and_text()) {
        let m = p.len();
        let r = Matcher::new(&bits(&p), 1, OR).scan(&bits(&t));
        for pos in 0..t.len() {
            let exact = pos + 1 >= m && t[pos + 1 - m..=pos] == p[..];
            prop_assert_eq!(r.get(pos) < m, exact, "position {}", pos);
            if exact {
                prop_assert_eq!(r.get(pos), 0);
            }
        }
    }

    #[test]
    fn more_rows_never_lose_a_match((p, t) in pattern_and_text()) {
        let m = p.len();
        let (p, t) = (bits(&p), bits(&t));
        let mut prev = Matcher::new(&p, 1, OR).scan(&t);
        for levels in 2..=m {
            let cur = Matcher::new(&p, levels, OR).scan(&t);
            for pos in 0..t.len() {
                if prev.get(pos) < m {
                    prop_assert!(cur.get(pos) <= prev.get(pos), "levels {} position {}", levels, pos);
                }
            }
            prev = cur;
        }
    }

    #[test]
    fn polarities_agree((p, t) in pattern_and_text(), extra in 0usize..4, insertion in any::<bool>()) {
        let m = p.len();
        let levels = (1 + extra).min(m);
        let (p, t) = (bits(&p), bits(&t));
        let and = MatcherConfig { allow_insertion: insertion, ..AND };
        let or = MatcherConfig { allow_insertion: insertion, ..OR };
        prop_assert_eq!(
            Matcher::new(&p, levels, and).scan(&t),
            Matcher::new(&p, levels, or).scan(&t)
        );
    }

    #[test]
    fn insertion_only_adds_matches((p, t) in pattern_and_text(), extra in 0usize..4) {
        let m = p.len();
        let levels = (1 + extra).min(m);
        let (p, t) = (bits(&p), bits(&t));
        let plain = Matcher::new(&p, levels, OR).scan(&t);
        let with_ins = Matcher::new(&p, levels, MatcherConfig { allow_insertion: true, ..OR }).scan(&t);
        for pos in 0..t.len() {
            prop_assert!(with_ins.get(pos) <= plain.get(pos));
        }
    }
}

#[test]
fn scan_is_independent_per_call() {
    let p = BitSeq::parse_transmission("0110").unwrap();
    let t = BitSeq::parse_transmission("0110101100110").unwrap();
    let matcher = Matcher::new(&p, 2, MatcherConfig::default());
    let first = matcher.scan(&t);
    let second = matcher.scan(&t);
    assert_eq!(first, second);
    assert_eq!(matcher.levels(), 2);
}
