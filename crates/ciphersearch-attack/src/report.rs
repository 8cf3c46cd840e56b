//! Result files and run reports.

use anyhow::{Context as _, Result};
use ciphersearch_core::{AttackConfig, Radix};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};

use crate::search::CandidateSet;
use crate::target::{StatePair, Target};
use crate::verify::Outcome;

/// Where result files go and how sequences are encoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputOptions {
    /// Output directory, created on demand.
    pub dir: PathBuf,
    /// Sequence encoding.
    pub radix: Radix,
}

/// Result file name for a run. Runs without ground truth are tagged
/// `intercept` instead of carrying seeds.
#[must_use]
pub fn result_file_name(config: &AttackConfig, truth: Option<StatePair>) -> String {
    let key = truth.map_or_else(
        || "intercept".to_owned(),
        |t| format!("R1{}_R2{}", t.r1, t.r2),
    );
    format!(
        "ciphersearch_L{}_M{}_N{}_K{}_{key}.log",
        config.degree(),
        config.pattern_len(),
        config.text_len(),
        config.errors()
    )
}

/// Write one line per matched candidate: `state,min_errors,sequence`.
pub fn write_result_file(
    out: &OutputOptions,
    config: &AttackConfig,
    target: &Target,
    set: &CandidateSet,
) -> Result<PathBuf> {
    ensure_dir(&out.dir)?;
    let path = out.dir.join(result_file_name(config, target.truth()));
    let file = File::create(&path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(file);

    writeln!(
        w,
        "# degree={} m={} n={} K={} ciphertext={} matched={}",
        config.degree(),
        config.pattern_len(),
        config.text_len(),
        config.errors(),
        target.ciphertext().to_transmission_string(),
        set.matched_count()
    )
    .with_context(|| format!("write header to {}", path.display()))?;
    for c in set.matched() {
        let Some(seq) = c.sequence.as_ref() else {
            continue;
        };
        writeln!(
            w,
            "{},{},{}",
            c.state,
            c.min_errors.unwrap_or_default(),
            out.radix.render(seq)
        )
        .with_context(|| format!("write {}", path.display()))?;
    }
    w.flush()
        .with_context(|| format!("flush {}", path.display()))?;
    Ok(path)
}

/// Remove a result file that carries no signal. A missing file is fine.
pub fn discard_result_file(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("remove {}", path.display())),
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(dir).with_context(|| format!("create dir {}", dir.display()))
}

/// Everything a caller needs to know about one attack run.
#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    /// Validated configuration.
    pub config: AttackConfig,
    /// Ground-truth key, when known.
    pub truth: Option<StatePair>,
    /// Ciphertext in transmission order.
    pub ciphertext: String,
    /// Classification.
    pub outcome: Outcome,
    /// Exit code of the classification.
    pub code: i64,
    /// Matched candidate count.
    pub matched: u64,
    /// Reproducing pairs found during verification.
    pub reproductions: Vec<StatePair>,
    /// Candidate search wall time.
    pub search_ms: u128,
    /// Verification wall time.
    pub verify_ms: u128,
    /// Retained result file.
    pub result_file: Option<PathBuf>,
}

impl RunReport {
    /// The `{code},{matched}` line printed by the CLI.
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!("{},{}", self.code, self.matched)
    }

    /// Recovered key: the single reproducing pair, if there is exactly one.
    #[must_use]
    pub fn recovered_key(&self) -> Option<StatePair> {
        match self.reproductions.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Pretty JSON rendering.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serialize run report")
    }
}
