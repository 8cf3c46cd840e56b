//! The observed ciphertext, the known plaintext and, in evaluation runs, the
//! key that produced them.

use ciphersearch_core::{cipher, lfsr, AttackConfig, BitSeq, ConfigError, RegisterRole};
use rand::{rngs::StdRng, Rng as _, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An `(R1, R2)` initial-state pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StatePair {
    /// Clocking register state.
    pub r1: u64,
    /// Decimated register state.
    pub r2: u64,
}

impl StatePair {
    /// Pair `(r1, r2)`.
    #[must_use]
    pub const fn new(r1: u64, r2: u64) -> Self {
        Self { r1, r2 }
    }
}

impl fmt::Display for StatePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(R1={}, R2={})", self.r1, self.r2)
    }
}

/// Where the known plaintext comes from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaintextSource {
    /// `m` zero bits.
    #[default]
    Zeros,
    /// Given bits, transmission order.
    Explicit(BitSeq),
    /// `m` bits drawn from a seeded `StdRng`.
    Seeded(u64),
}

impl PlaintextSource {
    /// Materialize `m` plaintext bits. Explicit input is returned as given
    /// and checked against `m` by the target constructors.
    #[must_use]
    pub fn resolve(&self, m: usize) -> BitSeq {
        match self {
            Self::Zeros => BitSeq::zeros(m),
            Self::Explicit(bits) => bits.clone(),
            Self::Seeded(seed) => random_plaintext(*seed, m),
        }
    }
}

/// `m` reproducible pseudo-random plaintext bits.
#[must_use]
pub fn random_plaintext(seed: u64, m: usize) -> BitSeq {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..m).map(|_| rng.random_bool(0.5)).collect()
}

/// Attack input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    ciphertext: BitSeq,
    plaintext: BitSeq,
    truth: Option<StatePair>,
}

impl Target {
    /// Encrypt `plaintext` under `(r1, r2)` and remember the key as ground
    /// truth.
    pub fn simulate(
        config: &AttackConfig,
        r1: u64,
        r2: u64,
        plaintext: BitSeq,
    ) -> Result<Self, ConfigError> {
        let r1 = config.check_seed(RegisterRole::Clocking, r1)?;
        let r2 = config.check_seed(RegisterRole::Decimated, r2)?;
        config.check_plaintext(&plaintext)?;

        let m = config.pattern_len();
        let clock = lfsr::generate(config.polynomial(), r1, m);
        let decimated = lfsr::generate(config.polynomial(), r2, config.text_len());
        let ciphertext = cipher::encrypt(&clock, &decimated, &plaintext, m);
        Ok(Self {
            ciphertext,
            plaintext,
            truth: Some(StatePair::new(r1, r2)),
        })
    }

    /// A ciphertext observed without knowledge of the key.
    pub fn intercepted(
        config: &AttackConfig,
        ciphertext: BitSeq,
        plaintext: BitSeq,
    ) -> Result<Self, ConfigError> {
        config.check_ciphertext(&ciphertext)?;
        config.check_plaintext(&plaintext)?;
        Ok(Self {
            ciphertext,
            plaintext,
            truth: None,
        })
    }

    /// Observed ciphertext (`m` bits).
    #[must_use]
    pub const fn ciphertext(&self) -> &BitSeq {
        &self.ciphertext
    }

    /// Known plaintext (`m` bits).
    #[must_use]
    pub const fn plaintext(&self) -> &BitSeq {
        &self.plaintext
    }

    /// Ground-truth key, when known.
    #[must_use]
    pub const fn truth(&self) -> Option<StatePair> {
        self.truth
    }
}
