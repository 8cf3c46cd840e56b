//! ciphersearch-bench-harness
//!
//! Sweep the search word length `m` and walk the error budget `K` for each
//! `m`, running the full attack every step, and append CSV rows into
//! `benchmarks/reports/sweep-<unix>.csv`.
//!
//! For every `m` the walk starts at `K = floor(m / k_factor)` and moves down
//! while runs still produce candidates; once a run comes back empty (or the
//! true state falls out of the set) it moves up instead. Saturated and
//! colliding runs past that point end the walk, as does leaving `[0, m - 1)`.
//!
//! Usage examples:
//!   cargo run --release -p ciphersearch-bench-harness -- --profile benchmarks/profiles/degree11.toml
//!   cargo run --release -p ciphersearch-bench-harness -- --profile benchmarks/profiles/degree16.toml --out-dir results

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::Deserialize;

use ciphersearch_attack::{random_plaintext, Attack, RunReport, Target};
use ciphersearch_core::{AttackParams, BitSeq, MatcherConfig, Radix};

const fn default_m_step() -> usize {
    20
}

#[derive(Debug, Deserialize)]
struct Profile {
    /// Register width (11 or 16)
    degree: usize,
    /// First search word length
    m_start: usize,
    /// Sweep runs while `m < m_stop`
    m_stop: usize,
    /// Increment of `m` between sweeps
    #[serde(default = "default_m_step")]
    m_step: usize,
    /// Initial budget is `floor(m / k_factor)`
    k_factor: f64,
    /// Simulated key
    r1: u64,
    r2: u64,
    #[serde(default)]
    collision_threshold: usize,
    #[serde(default)]
    threads: usize,
    #[serde(default)]
    matcher: MatcherConfig,
    /// Random plaintext seed; zeros when absent
    #[serde(default)]
    plaintext_seed: Option<u64>,
}

/// Where the walk goes after a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Down,
    Up,
    Stop,
}

/// Walk rule on outcome codes: `0` success, `>0` true state absent,
/// `-1` empty set, `-2` saturated, `-3` collisions. `bottom` is set once an
/// empty set has been seen.
const fn next_step(code: i64, bottom: bool) -> Step {
    match code {
        c if c >= 0 && !bottom => Step::Down,
        -2 if !bottom => Step::Down,
        c if c >= 0 => Step::Up,
        -1 => Step::Up,
        _ => Step::Stop,
    }
}

/// Walk `K` over `[0, m - 1)` starting at `start`, calling `run` once per
/// budget. Returns the visited budgets in order.
fn walk_errors(
    m: usize,
    start: usize,
    mut run: impl FnMut(usize) -> Result<i64>,
) -> Result<Vec<usize>> {
    let limit = m.saturating_sub(1);
    let mut visited = vec![false; limit];
    let mut order = Vec::new();
    let mut bottom = false;
    let mut k = start;

    while k < limit {
        if visited[k] {
            k += 1;
            continue;
        }
        visited[k] = true;
        order.push(k);

        let code = run(k)?;
        if code == -1 {
            bottom = true;
        }
        match next_step(code, bottom) {
            Step::Down => match k.checked_sub(1) {
                Some(lower) => k = lower,
                None => break,
            },
            Step::Up => k += 1,
            Step::Stop => break,
        }
    }
    Ok(order)
}

fn parse_flag(name: &str) -> Option<String> {
    let mut it = std::env::args().skip(1);
    while let Some(k) = it.next() {
        if k == format!("--{name}") {
            return it.next();
        }
    }
    None
}

fn run_once(profile: &Profile, m: usize, k: usize, out_dir: Option<&PathBuf>) -> Result<RunReport> {
    let mut params = AttackParams::new(profile.degree, m, k);
    params.collision_threshold = profile.collision_threshold;
    params.threads = profile.threads;
    params.matcher = profile.matcher;
    let cfg = params
        .validate()
        .with_context(|| format!("invalid parameters m={m} k={k}"))?;

    let plaintext = profile
        .plaintext_seed
        .map_or_else(|| BitSeq::zeros(m), |seed| random_plaintext(seed, m));
    let target = Target::simulate(&cfg, profile.r1, profile.r2, plaintext)?;

    let mut attack = Attack::new(cfg);
    if let Some(dir) = out_dir {
        attack = attack.with_output(dir, Radix::Decimal);
    }
    attack.run(&target)
}

fn main() -> Result<()> {
    let profile_path = PathBuf::from(
        parse_flag("profile").unwrap_or_else(|| "benchmarks/profiles/degree11.toml".to_owned()),
    );
    let out_dir = parse_flag("out-dir").map(PathBuf::from);

    let profile_src = fs::read_to_string(&profile_path)
        .with_context(|| format!("read profile {}", profile_path.display()))?;
    let profile: Profile = toml::from_str(&profile_src).context("parse profile toml")?;
    anyhow::ensure!(profile.m_step > 0, "m_step must be positive");
    anyhow::ensure!(profile.k_factor > 0.0, "k_factor must be positive");
    println!(
        "Profile: degree={}, m={}..{} step {}, k_factor={}, R1={}, R2={}",
        profile.degree,
        profile.m_start,
        profile.m_stop,
        profile.m_step,
        profile.k_factor,
        profile.r1,
        profile.r2
    );

    fs::create_dir_all("benchmarks/reports").context("create benchmarks/reports")?;
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let csv_path = PathBuf::from(format!("benchmarks/reports/sweep-{ts}.csv"));
    let mut csv = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&csv_path)
        .with_context(|| format!("open {}", csv_path.display()))?;
    writeln!(csv, "m,n,k,matched,status,duration_ms,threads")?;

    let mut m = profile.m_start.max(1);
    while m < profile.m_stop {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let start = (m as f64 / profile.k_factor).floor() as usize;

        walk_errors(m, start, |k| {
            let t0 = Instant::now();
            let report = run_once(&profile, m, k, out_dir.as_ref())?;
            let ms = t0.elapsed().as_millis();
            let cfg = &report.config;
            writeln!(
                csv,
                "{},{},{},{},{},{},{}",
                cfg.pattern_len(),
                cfg.text_len(),
                k,
                report.matched,
                report.outcome.status(),
                ms,
                cfg.threads()
            )?;
            println!(
                "[m={m},n={},k={k}] {}: {} candidates",
                cfg.text_len(),
                report.outcome.status(),
                report.matched
            );
            Ok(report.code)
        })?;

        m += profile.m_step;
    }

    println!("Wrote report → {}", csv_path.display());
    Ok(())
}
