//! Feedback polynomials and validated attack configuration.
//!
//! Raw inputs arrive as [`AttackParams`] (CLI flags, TOML profiles) and are
//! turned into an immutable [`AttackConfig`] by [`AttackParams::validate`].
//! Everything downstream takes the validated value by reference.

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

use crate::bits::BitSeq;
use crate::error::{ConfigError, RegisterRole};

/// Shipped `(degree, taps)` pairs. Both polynomials are maximal length.
pub const SUPPORTED_POLYNOMIALS: [(usize, u64); 2] = [(11, 1209), (16, 33_262)];

/// Feedback tap mask of a register of width `degree`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedbackPolynomial {
    degree: usize,
    taps: u64,
}

impl FeedbackPolynomial {
    /// Look up the shipped polynomial for `degree`.
    pub fn for_degree(degree: usize) -> Result<Self, ConfigError> {
        SUPPORTED_POLYNOMIALS
            .iter()
            .find(|&&(d, _)| d == degree)
            .map(|&(degree, taps)| Self { degree, taps })
            .ok_or(ConfigError::UnsupportedDegree(degree))
    }

    /// Arbitrary tap mask (truncated to `degree` bits). Primitivity is not
    /// checked; this exists for experiments and small test registers.
    pub fn custom(degree: usize, taps: u64) -> Result<Self, ConfigError> {
        if !(1..=63).contains(&degree) {
            return Err(ConfigError::InvalidWidth(degree));
        }
        Ok(Self {
            degree,
            taps: taps & ((1u64 << degree) - 1),
        })
    }

    /// Register width.
    #[inline]
    #[must_use]
    pub const fn degree(&self) -> usize {
        self.degree
    }

    /// Tap mask as an integer.
    #[inline]
    #[must_use]
    pub const fn taps(&self) -> u64 {
        self.taps
    }

    /// Tap mask as a `degree`-bit vector.
    #[must_use]
    pub fn tap_mask(&self) -> BitSeq {
        BitSeq::from_u64(self.taps, self.degree)
    }

    /// Number of register states, `2^degree`.
    #[inline]
    #[must_use]
    pub const fn state_count(&self) -> u64 {
        1u64 << self.degree
    }

    /// Largest state id, `2^degree - 1`.
    #[inline]
    #[must_use]
    pub const fn max_state(&self) -> u64 {
        self.state_count() - 1
    }
}

/// Matcher convention switches.
///
/// The default is Shift-OR with substitution and deletion only. Insertion is
/// opt-in: it never admits fewer candidates (270 instead of 197 for the
/// degree-11 key `(7, 42)` at `m = 24, K = 4`). Sweeps that want the wider
/// filter set `allow_insertion` (`--insertion` on the command line).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Shift-OR polarity (match = bit clear) instead of Shift-AND.
    pub shift_or: bool,
    /// Admit insertion errors in addition to substitution and deletion.
    pub allow_insertion: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            shift_or: true,
            allow_insertion: false,
        }
    }
}

/// Unvalidated attack parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackParams {
    /// Register width (11 or 16).
    pub degree: usize,
    /// Search word length `m` (ciphertext bits intercepted).
    pub pattern_len: usize,
    /// Search text length `n`; `None` means `2m`.
    #[serde(default)]
    pub text_len: Option<usize>,
    /// Allowed errors `K`.
    pub errors: usize,
    /// Colliding pairs tolerated before a run counts as ambiguous.
    #[serde(default)]
    pub collision_threshold: usize,
    /// Worker threads; `0` uses the available parallelism.
    #[serde(default)]
    pub threads: usize,
    /// Matcher convention.
    #[serde(default)]
    pub matcher: MatcherConfig,
}

impl AttackParams {
    /// Parameters with defaults for everything but the core dimensions.
    #[must_use]
    pub fn new(degree: usize, pattern_len: usize, errors: usize) -> Self {
        Self {
            degree,
            pattern_len,
            text_len: None,
            errors,
            collision_threshold: 0,
            threads: 0,
            matcher: MatcherConfig::default(),
        }
    }

    /// Check every constraint and freeze the configuration.
    pub fn validate(&self) -> Result<AttackConfig, ConfigError> {
        let polynomial = FeedbackPolynomial::for_degree(self.degree)?;
        let m = self.pattern_len;
        if m == 0 {
            return Err(ConfigError::EmptyPattern);
        }
        if self.errors >= m {
            return Err(ConfigError::TooManyErrors {
                errors: self.errors,
                m,
            });
        }
        let min = m.checked_mul(2).ok_or(ConfigError::PatternTooLong(m))?;
        let n = self.text_len.unwrap_or(min);
        if n < min {
            return Err(ConfigError::TextTooShort { n, min });
        }
        let threads = if self.threads == 0 {
            std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
        } else {
            self.threads
        };

        Ok(AttackConfig {
            polynomial,
            pattern_len: m,
            text_len: n,
            errors: self.errors,
            collision_threshold: self.collision_threshold,
            threads,
            matcher: self.matcher,
        })
    }
}

/// Validated, immutable attack configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AttackConfig {
    polynomial: FeedbackPolynomial,
    pattern_len: usize,
    text_len: usize,
    errors: usize,
    collision_threshold: usize,
    threads: usize,
    matcher: MatcherConfig,
}

impl AttackConfig {
    /// Feedback polynomial shared by R1 and R2.
    #[inline]
    #[must_use]
    pub const fn polynomial(&self) -> &FeedbackPolynomial {
        &self.polynomial
    }

    /// Register width.
    #[inline]
    #[must_use]
    pub const fn degree(&self) -> usize {
        self.polynomial.degree
    }

    /// Search word length `m`.
    #[inline]
    #[must_use]
    pub const fn pattern_len(&self) -> usize {
        self.pattern_len
    }

    /// Search text length `n`.
    #[inline]
    #[must_use]
    pub const fn text_len(&self) -> usize {
        self.text_len
    }

    /// Allowed errors `K`.
    #[inline]
    #[must_use]
    pub const fn errors(&self) -> usize {
        self.errors
    }

    /// Number of automaton rows, `K + 1`.
    #[inline]
    #[must_use]
    pub const fn levels(&self) -> usize {
        self.errors + 1
    }

    /// Tolerated colliding pairs.
    #[inline]
    #[must_use]
    pub const fn collision_threshold(&self) -> usize {
        self.collision_threshold
    }

    /// Worker pool size (resolved, never zero).
    #[inline]
    #[must_use]
    pub const fn threads(&self) -> usize {
        self.threads
    }

    /// Matcher convention.
    #[inline]
    #[must_use]
    pub const fn matcher(&self) -> MatcherConfig {
        self.matcher
    }

    /// Largest register state, `2^degree - 1`.
    #[inline]
    #[must_use]
    pub const fn max_state(&self) -> u64 {
        self.polynomial.max_state()
    }

    /// Candidate count at which the filter is considered to have no
    /// discriminating power: every non-zero state but one.
    #[inline]
    #[must_use]
    pub const fn saturation_bound(&self) -> u64 {
        self.max_state() - 1
    }

    /// Reject a seed that does not fit the register.
    pub fn check_seed(&self, role: RegisterRole, seed: u64) -> Result<u64, ConfigError> {
        let max = self.max_state();
        if seed > max {
            return Err(ConfigError::SeedOutOfRange { role, seed, max });
        }
        Ok(seed)
    }

    /// Reject a plaintext whose width is not `m`.
    pub fn check_plaintext(&self, plaintext: &BitSeq) -> Result<(), ConfigError> {
        if plaintext.len() != self.pattern_len {
            return Err(ConfigError::PlaintextWidth {
                got: plaintext.len(),
                m: self.pattern_len,
            });
        }
        Ok(())
    }

    /// Reject an intercepted ciphertext whose width is not `m`.
    pub fn check_ciphertext(&self, ciphertext: &BitSeq) -> Result<(), ConfigError> {
        if ciphertext.len() != self.pattern_len {
            return Err(ConfigError::CiphertextWidth {
                got: ciphertext.len(),
                m: self.pattern_len,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_polynomials() {
        let p11 = FeedbackPolynomial::for_degree(11).unwrap();
        assert_eq!(p11.taps(), 1209);
        assert_eq!(p11.max_state(), 2047);
        let p16 = FeedbackPolynomial::for_degree(16).unwrap();
        assert_eq!(p16.taps(), 33_262);
        assert_eq!(p16.state_count(), 65_536);
        assert_eq!(
            FeedbackPolynomial::for_degree(12),
            Err(ConfigError::UnsupportedDegree(12))
        );
    }

    #[test]
    fn defaults_fill_text_len_and_threads() {
        let cfg = AttackParams::new(11, 16, 1).validate().unwrap();
        assert_eq!(cfg.text_len(), 32);
        assert_eq!(cfg.levels(), 2);
        assert!(cfg.threads() >= 1);
        assert!(cfg.matcher().shift_or);
        assert!(!cfg.matcher().allow_insertion);
        assert_eq!(cfg.saturation_bound(), 2046);
    }

    #[test]
    fn rejects_bad_dimensions() {
        assert_eq!(
            AttackParams::new(11, 0, 0).validate(),
            Err(ConfigError::EmptyPattern)
        );
        assert_eq!(
            AttackParams::new(11, 8, 8).validate(),
            Err(ConfigError::TooManyErrors { errors: 8, m: 8 })
        );
        let mut short = AttackParams::new(16, 8, 1);
        short.text_len = Some(15);
        assert_eq!(
            short.validate(),
            Err(ConfigError::TextTooShort { n: 15, min: 16 })
        );
        assert_eq!(
            AttackParams::new(13, 8, 1).validate(),
            Err(ConfigError::UnsupportedDegree(13))
        );
        let huge = usize::MAX / 2 + 1;
        assert_eq!(
            AttackParams::new(11, huge, 0).validate(),
            Err(ConfigError::PatternTooLong(huge))
        );
        assert!(AttackParams::new(11, usize::MAX / 2, 0).validate().is_ok());
    }

    #[test]
    fn seed_and_plaintext_checks() {
        let cfg = AttackParams::new(11, 16, 1).validate().unwrap();
        assert_eq!(cfg.check_seed(RegisterRole::Clocking, 2047), Ok(2047));
        assert!(matches!(
            cfg.check_seed(RegisterRole::Clocking, 2048),
            Err(ConfigError::SeedOutOfRange { max: 2047, .. })
        ));
        assert!(cfg.check_plaintext(&BitSeq::zeros(16)).is_ok());
        assert_eq!(
            cfg.check_plaintext(&BitSeq::zeros(15)),
            Err(ConfigError::PlaintextWidth { got: 15, m: 16 })
        );
    }

    #[test]
    fn params_deserialize_with_defaults() {
        let p: AttackParams =
            serde_json::from_str(r#"{"degree":11,"pattern_len":24,"errors":4}"#).unwrap();
        assert_eq!(p, AttackParams::new(11, 24, 4));
    }

    #[test]
    fn custom_width_bounds() {
        assert!(FeedbackPolynomial::custom(4, 0b1_1001).is_ok());
        assert_eq!(FeedbackPolynomial::custom(4, 0b1_1001).unwrap().taps(), 0b1001);
        assert_eq!(
            FeedbackPolynomial::custom(0, 1),
            Err(ConfigError::InvalidWidth(0))
        );
    }
}
