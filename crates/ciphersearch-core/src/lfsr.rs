//! Linear feedback shift register engine.
//!
//! Each step emits the most significant state bit (position `degree - 1`),
//! computes feedback as the parity of `state AND taps`, shifts the state left
//! inside its `degree`-bit window and writes the feedback into bit 0.

use crate::bits::BitSeq;
use crate::config::FeedbackPolynomial;

/// One feedback shift register.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lfsr {
    taps: BitSeq,
    state: BitSeq,
}

impl Lfsr {
    /// Register driven by `poly`, seeded with `seed` taken modulo `2^degree`.
    #[must_use]
    pub fn new(poly: &FeedbackPolynomial, seed: u64) -> Self {
        Self {
            taps: poly.tap_mask(),
            state: BitSeq::from_u64(seed, poly.degree()),
        }
    }

    /// Register from an explicit tap mask and state of equal, non-zero width.
    ///
    /// # Panics
    /// Panics if the widths differ or are zero.
    #[must_use]
    pub fn from_parts(taps: BitSeq, state: BitSeq) -> Self {
        assert_eq!(taps.len(), state.len(), "tap mask and state widths differ");
        assert!(!state.is_empty(), "register width must be non-zero");
        Self { taps, state }
    }

    /// Register width.
    #[inline]
    #[must_use]
    pub const fn degree(&self) -> usize {
        self.state.len()
    }

    /// Current state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> &BitSeq {
        &self.state
    }

    /// Advance one step and return the emitted bit.
    pub fn step(&mut self) -> bool {
        let out = self.state.get(self.degree() - 1);
        let feedback = self.state.and_parity(&self.taps);
        self.state.shl1();
        self.state.assign(0, feedback);
        out
    }

    /// Emit `len` bits; bit `i` of the result is the `i`-th emitted bit.
    pub fn generate(&mut self, len: usize) -> BitSeq {
        let mut out = BitSeq::zeros(len);
        for i in 0..len {
            if self.step() {
                out.set(i);
            }
        }
        out
    }

    /// Skip-until-prefix generation: discard output until a bit equal to
    /// `first` is emitted, then record it and the following `len - 1` bits.
    ///
    /// Returns `None` when no such bit appears within one full period bound
    /// of `2^degree` steps (e.g. an all-zero register asked for a `1`).
    pub fn generate_aligned(&mut self, len: usize, first: bool) -> Option<BitSeq> {
        let mut out = BitSeq::zeros(len);
        if len == 0 {
            return Some(out);
        }
        let limit = u32::try_from(self.degree())
            .ok()
            .and_then(|d| 1usize.checked_shl(d))
            .unwrap_or(usize::MAX);

        let mut skipped = 0usize;
        while self.step() != first {
            skipped += 1;
            if skipped >= limit {
                return None;
            }
        }
        out.assign(0, first);
        for i in 1..len {
            if self.step() {
                out.set(i);
            }
        }
        Some(out)
    }
}

/// Unbounded output stream.
impl Iterator for Lfsr {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        Some(self.step())
    }
}

/// Output of a fresh register seeded with `seed`, `len` bits long.
#[must_use]
pub fn generate(poly: &FeedbackPolynomial, seed: u64, len: usize) -> BitSeq {
    Lfsr::new(poly, seed).generate(len)
}
