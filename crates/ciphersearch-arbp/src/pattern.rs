//! Pattern preprocessing: per-symbol position masks and initial error rows.
//!
//! Both tables are `m` bits wide. Under the Shift-OR convention every entry is
//! stored complemented, so "active" reads as a clear bit throughout the
//! matcher.

use ciphersearch_core::BitSeq;

/// Position masks `B[0]`, `B[1]` of a binary pattern.
///
/// Bit `j` of `B[c]` is set iff pattern bit `j` equals `c` (Shift-AND), or
/// clear iff it does (Shift-OR).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlphabetMasks {
    masks: [BitSeq; 2],
    width: usize,
    shift_or: bool,
    first: Option<bool>,
}

impl AlphabetMasks {
    /// Build the masks from the first `m` bits of `pattern`.
    #[must_use]
    pub fn build(pattern: &BitSeq, m: usize, shift_or: bool) -> Self {
        let mut masks = [BitSeq::zeros(m), BitSeq::zeros(m)];
        for j in 0..m {
            masks[usize::from(pattern.get(j))].set(j);
        }
        if shift_or {
            for mask in &mut masks {
                mask.invert();
            }
        }
        Self {
            masks,
            width: m,
            shift_or,
            first: (m > 0).then(|| pattern.get(0)),
        }
    }

    /// Mask for `symbol`.
    #[inline]
    #[must_use]
    pub fn mask(&self, symbol: bool) -> &BitSeq {
        &self.masks[usize::from(symbol)]
    }

    /// Pattern length `m`.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Whether the masks are stored complemented.
    #[inline]
    #[must_use]
    pub const fn shift_or(&self) -> bool {
        self.shift_or
    }

    /// First pattern symbol, the alignment target of skip-until-prefix
    /// generation. `None` for an empty pattern.
    #[inline]
    #[must_use]
    pub const fn first_symbol(&self) -> Option<bool> {
        self.first
    }
}

/// Automaton rows `R[0..levels)`, one per error level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorRows {
    rows: Vec<BitSeq>,
}

impl ErrorRows {
    /// Initial rows: `R[k]` has bits `[0, k)` set (the first `k` characters
    /// are free under `k` errors), complemented under Shift-OR.
    ///
    /// `levels` is `K + 1` for an error budget of `K`.
    #[must_use]
    pub fn initial(levels: usize, m: usize, shift_or: bool) -> Self {
        let rows = (0..levels)
            .map(|k| {
                let mut row: BitSeq = (0..m).map(|j| j < k).collect();
                if shift_or {
                    row.invert();
                }
                row
            })
            .collect();
        Self { rows }
    }

    /// Number of rows.
    #[must_use]
    pub fn levels(&self) -> usize {
        self.rows.len()
    }

    /// Rows in ascending error order.
    #[must_use]
    pub fn rows(&self) -> &[BitSeq] {
        &self.rows
    }

    pub(crate) fn into_rows(self) -> Vec<BitSeq> {
        self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_partition_the_window() {
        // transmission order 1,0,1,1,0
        let p = BitSeq::parse_transmission("10110").unwrap();
        let and = AlphabetMasks::build(&p, 5, false);
        assert_eq!(and.mask(true).to_u64(), Some(0b0_1101));
        assert_eq!(and.mask(false).to_u64(), Some(0b1_0010));
        assert_eq!(and.first_symbol(), Some(true));

        let or = AlphabetMasks::build(&p, 5, true);
        assert_eq!(or.mask(true).to_u64(), Some(0b1_0010));
        assert_eq!(or.mask(false).to_u64(), Some(0b0_1101));
        assert!(or.shift_or());
    }

    #[test]
    fn masks_ignore_bits_past_m() {
        let p = BitSeq::from_u64(0b1111_0000, 8);
        let b = AlphabetMasks::build(&p, 4, false);
        assert_eq!(b.width(), 4);
        assert!(b.mask(true).is_zero());
        assert_eq!(b.mask(false).to_u64(), Some(0b1111));
    }

    #[test]
    fn error_rows_preseed_low_bits() {
        let r = ErrorRows::initial(4, 6, false);
        let vals: Vec<_> = r.rows().iter().map(BitSeq::to_u64).collect();
        assert_eq!(vals, [Some(0), Some(0b1), Some(0b11), Some(0b111)]);

        let r = ErrorRows::initial(3, 6, true);
        let vals: Vec<_> = r.rows().iter().map(BitSeq::to_u64).collect();
        assert_eq!(vals, [Some(0b11_1111), Some(0b11_1110), Some(0b11_1100)]);
        assert_eq!(r.levels(), 3);
    }
}
