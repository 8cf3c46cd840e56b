//! Bit-parallel k-error matcher.
//!
//! The automaton keeps `K + 1` rows of `m` bits. For each text character `c`
//! the rows are advanced in ascending error order:
//!
//! ```text
//! Shift-AND   R0' = (R0 << 1 | 1) & B[c]
//!             Ri' = (Ri << 1 & B[c]) | ((R(i-1) | R(i-1)') << 1 | 1) [| R(i-1)]
//! Shift-OR    R0' = (R0 << 1) | B[c]
//!             Ri' = (Ri << 1 | B[c]) & ((R(i-1) & R(i-1)') << 1) [& R(i-1)]
//! ```
//!
//! where the bracketed term is the insertion transition. The two conventions
//! are exact polarity duals and report identical levels.

use ciphersearch_core::{AttackConfig, BitSeq, MatcherConfig};
use serde::Serialize;

use crate::pattern::{AlphabetMasks, ErrorRows};

/// Per-position result of one scan.
///
/// `levels[p]` is the smallest error level at which a match of the whole
/// pattern ends at text position `p`, or the sentinel `m` when none does.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MatchLevels {
    levels: Vec<usize>,
    sentinel: usize,
}

impl MatchLevels {
    /// Level at position `p` (sentinel when `p` is past the text).
    #[must_use]
    pub fn get(&self, p: usize) -> usize {
        self.levels.get(p).copied().unwrap_or(self.sentinel)
    }

    /// No-match sentinel, equal to the pattern length.
    #[must_use]
    pub const fn sentinel(&self) -> usize {
        self.sentinel
    }

    /// Raw per-position levels.
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.levels
    }

    /// Smallest level reported anywhere, if any position matched.
    #[must_use]
    pub fn best(&self) -> Option<usize> {
        self.levels.iter().copied().filter(|&l| l < self.sentinel).min()
    }

    /// Number of positions reporting a match.
    #[must_use]
    pub fn hit_count(&self) -> usize {
        self.levels.iter().filter(|&&l| l < self.sentinel).count()
    }

    /// Whether any position matched.
    #[must_use]
    pub fn any(&self) -> bool {
        self.levels.iter().any(|&l| l < self.sentinel)
    }
}

/// Approximate matcher for one pattern and error budget.
///
/// Immutable after construction and `Sync`; scans allocate their own rows,
/// so a single matcher can be shared by every worker.
#[derive(Clone, Debug)]
pub struct Matcher {
    masks: AlphabetMasks,
    levels: usize,
    allow_insertion: bool,
}

impl Matcher {
    /// Matcher for `pattern` with `levels` rows (`K + 1`).
    ///
    /// # Panics
    /// Panics if `levels` is zero or the pattern is empty.
    #[must_use]
    pub fn new(pattern: &BitSeq, levels: usize, config: MatcherConfig) -> Self {
        let masks = AlphabetMasks::build(pattern, pattern.len(), config.shift_or);
        Self::from_masks(masks, levels, config.allow_insertion)
    }

    /// Matcher over the ciphertext of a validated attack.
    #[must_use]
    pub fn for_attack(ciphertext: &BitSeq, config: &AttackConfig) -> Self {
        let convention = config.matcher();
        let masks = AlphabetMasks::build(ciphertext, config.pattern_len(), convention.shift_or);
        Self::from_masks(masks, config.levels(), convention.allow_insertion)
    }

    /// Matcher from prebuilt masks.
    ///
    /// # Panics
    /// Panics if `levels` is zero or the masks are zero-width.
    #[must_use]
    pub fn from_masks(masks: AlphabetMasks, levels: usize, allow_insertion: bool) -> Self {
        assert!(levels >= 1, "matcher needs at least one row");
        assert!(masks.width() >= 1, "empty pattern");
        Self {
            masks,
            levels,
            allow_insertion,
        }
    }

    /// Pattern masks.
    #[must_use]
    pub const fn masks(&self) -> &AlphabetMasks {
        &self.masks
    }

    /// Number of automaton rows.
    #[must_use]
    pub const fn levels(&self) -> usize {
        self.levels
    }

    /// Stream `text` through a fresh automaton.
    #[must_use]
    pub fn scan(&self, text: &BitSeq) -> MatchLevels {
        let m = self.masks.width();
        let shift_or = self.masks.shift_or();
        let mut rows = ErrorRows::initial(self.levels, m, shift_or).into_rows();
        let mut old = BitSeq::zeros(m);
        let mut diag = BitSeq::zeros(m);
        let mut out = Vec::with_capacity(text.len());

        for c in text.iter() {
            let b = self.masks.mask(c);

            old.copy_from(&rows[0]);
            let r0 = &mut rows[0];
            r0.shl1();
            if shift_or {
                *r0 |= b;
            } else {
                r0.set(0);
                *r0 &= b;
            }

            for i in 1..self.levels {
                let (lower, upper) = rows.split_at_mut(i);
                let prev = &lower[i - 1];
                let row = &mut upper[0];

                diag.copy_from(&old);
                if shift_or {
                    diag &= prev;
                    diag.shl1();
                    if self.allow_insertion {
                        diag &= &old;
                    }
                } else {
                    diag |= prev;
                    diag.shl1();
                    diag.set(0);
                    if self.allow_insertion {
                        diag |= &old;
                    }
                }

                old.copy_from(row);
                row.shl1();
                if shift_or {
                    *row |= b;
                    *row &= &diag;
                } else {
                    *row &= b;
                    *row |= &diag;
                }
            }

            let level = if rows.last().is_some_and(|r| top_matched(r, m, shift_or)) {
                rows.iter()
                    .position(|r| top_matched(r, m, shift_or))
                    .unwrap_or(m)
            } else {
                m
            };
            out.push(level);
        }

        MatchLevels {
            levels: out,
            sentinel: m,
        }
    }
}

#[inline]
fn top_matched(row: &BitSeq, m: usize, shift_or: bool) -> bool {
    row.get(m - 1) != shift_or
}
