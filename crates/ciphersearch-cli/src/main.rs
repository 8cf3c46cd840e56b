// crates/ciphersearch-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use ciphersearch_arbp::{AlphabetMasks, Matcher};
use ciphersearch_attack::{Attack, PlaintextSource, Target};
use ciphersearch_core::{
    lfsr, AttackConfig, AttackParams, BitSeq, FeedbackPolynomial, Lfsr, MatcherConfig,
    Radix, RegisterRole,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "ciphersearch",
    about = "Known-plaintext attack on a clock-controlled LFSR cipher",
    long_about = "Known-plaintext attack on a clock-controlled LFSR cipher.\n\nFilters R2 initial states with a bit-parallel k-error matcher, then brute-forces R1 for every surviving candidate.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Run the full attack and print `{code},{matched}`; exits with the outcome code.
    Attack {
        #[command(flatten)]
        dims: Dims,

        /// Allowed errors K (< m)
        #[arg(short = 'k', long)]
        errors: usize,

        /// R1 (clocking) initial state of the simulated key
        #[arg(long, required_unless_present = "ciphertext")]
        r1: Option<u64>,

        /// R2 (decimated) initial state of the simulated key
        #[arg(long, required_unless_present = "ciphertext")]
        r2: Option<u64>,

        /// Attack an observed ciphertext (transmission order) instead of simulating one
        #[arg(long, conflicts_with_all = ["r1", "r2"])]
        ciphertext: Option<String>,

        #[command(flatten)]
        plaintext: PlaintextArgs,

        #[command(flatten)]
        matcher: MatcherArgs,

        /// Colliding pairs tolerated before the run counts as ambiguous
        #[arg(long, default_value_t = 0)]
        threshold: usize,

        /// Worker threads (0 = available parallelism)
        #[arg(long, default_value_t = 0)]
        threads: usize,

        /// Directory for the per-run result file
        #[arg(long, default_value = "results")]
        out_dir: PathBuf,

        /// Skip writing the result file
        #[arg(long, default_value_t = false)]
        no_file: bool,

        /// Sequence encoding in the result file
        #[arg(long, value_enum, default_value_t = RadixOpt::Decimal)]
        radix: RadixOpt,

        /// Also print the run report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Write the run report as JSON to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Encrypt a plaintext under (R1, R2) and print the ciphertext
    Encrypt {
        #[command(flatten)]
        dims: Dims,

        /// R1 (clocking) initial state
        #[arg(long)]
        r1: u64,

        /// R2 (decimated) initial state
        #[arg(long)]
        r2: u64,

        #[command(flatten)]
        plaintext: PlaintextArgs,
    },

    /// Run the matcher for one R2 hypothesis and print per-position levels
    Scan {
        #[command(flatten)]
        dims: Dims,

        /// Allowed errors K (< m)
        #[arg(short = 'k', long)]
        errors: usize,

        /// R2 hypothesis
        #[arg(long)]
        r2: u64,

        /// Pattern (ciphertext) in transmission order, m characters
        #[arg(long)]
        ciphertext: String,

        #[command(flatten)]
        matcher: MatcherArgs,

        /// Align the generated text to the pattern's first symbol
        #[arg(long, default_value_t = false)]
        aligned: bool,

        /// Print the levels as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Print an LFSR output sequence
    Generate {
        /// Register width (11 or 16)
        #[arg(long, default_value_t = 11)]
        degree: usize,

        /// Initial state
        #[arg(long)]
        seed: u64,

        /// Number of output bits
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        len: u64,

        /// Skip output until this symbol is emitted
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=1))]
        align_to: Option<u8>,

        /// Output encoding (transmission prints bit 0 first)
        #[arg(long, value_enum, default_value_t = FormatOpt::Transmission)]
        format: FormatOpt,
    },
}

/// Register width and word lengths shared by several subcommands.
#[derive(Args, Debug, Clone, Copy)]
struct Dims {
    /// Register width (11 or 16)
    #[arg(long, default_value_t = 11)]
    degree: usize,

    /// Search word length m (intercepted ciphertext bits)
    #[arg(short = 'm', long)]
    m: usize,

    /// Search text length n (default 2m)
    #[arg(short = 'n', long)]
    n: Option<usize>,
}

#[derive(Args, Debug, Clone)]
struct PlaintextArgs {
    /// Known plaintext in transmission order (default: all zeros)
    #[arg(long, conflicts_with = "plaintext_seed")]
    plaintext: Option<String>,

    /// Draw the plaintext from a seeded RNG
    #[arg(long)]
    plaintext_seed: Option<u64>,
}

impl PlaintextArgs {
    fn source(&self) -> Result<PlaintextSource> {
        Ok(match (&self.plaintext, self.plaintext_seed) {
            (Some(bits), _) => PlaintextSource::Explicit(parse_bits(bits, "plaintext")?),
            (None, Some(seed)) => PlaintextSource::Seeded(seed),
            (None, None) => PlaintextSource::Zeros,
        })
    }
}

#[derive(Args, Debug, Clone, Copy)]
struct MatcherArgs {
    /// Use the Shift-AND polarity instead of Shift-OR
    #[arg(long, default_value_t = false)]
    shift_and: bool,

    /// Admit insertion errors
    #[arg(long, default_value_t = false)]
    insertion: bool,
}

impl From<MatcherArgs> for MatcherConfig {
    fn from(a: MatcherArgs) -> Self {
        Self {
            shift_or: !a.shift_and,
            allow_insertion: a.insertion,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
enum RadixOpt {
    Binary,
    Decimal,
    Base62,
}

impl From<RadixOpt> for Radix {
    fn from(r: RadixOpt) -> Self {
        match r {
            RadixOpt::Binary => Self::Binary,
            RadixOpt::Decimal => Self::Decimal,
            RadixOpt::Base62 => Self::Base62,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
enum FormatOpt {
    Transmission,
    Binary,
    Decimal,
    Base62,
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Attack {
            dims,
            errors,
            r1,
            r2,
            ciphertext,
            plaintext,
            matcher,
            threshold,
            threads,
            out_dir,
            no_file,
            radix,
            json,
            report,
        } => {
            let mut p = params(dims, errors, matcher);
            p.collision_threshold = threshold;
            p.threads = threads;
            let key = match (r1, r2) {
                (Some(r1), Some(r2)) => Some((r1, r2)),
                _ => None,
            };
            let output = (!no_file).then(|| (out_dir, Radix::from(radix)));
            let status = attack(
                &p,
                key,
                ciphertext.as_deref(),
                &plaintext,
                output,
                json,
                report.as_deref(),
            )?;
            std::process::exit(i32::from(status));
        }

        Cmd::Encrypt {
            dims,
            r1,
            r2,
            plaintext,
        } => encrypt(dims, r1, r2, &plaintext),

        Cmd::Scan {
            dims,
            errors,
            r2,
            ciphertext,
            matcher,
            aligned,
            json,
        } => scan(
            &params(dims, errors, matcher),
            r2,
            &ciphertext,
            aligned,
            json,
        ),

        Cmd::Generate {
            degree,
            seed,
            len,
            align_to,
            format,
        } => generate(degree, seed, len, align_to, format),
    }
}

/// Initialize tracing with an env-driven filter (default INFO).
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

/// Ensure the parent directory for a file exists.
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", dir.display()))?;
        }
    }
    Ok(())
}

fn params(dims: Dims, errors: usize, matcher: MatcherArgs) -> AttackParams {
    let mut p = AttackParams::new(dims.degree, dims.m, errors);
    p.text_len = dims.n;
    p.matcher = matcher.into();
    p
}

fn parse_bits(s: &str, what: &str) -> Result<BitSeq> {
    BitSeq::parse_transmission(s.trim()).with_context(|| format!("parsing {what}"))
}

fn attack(
    params: &AttackParams,
    key: Option<(u64, u64)>,
    ciphertext: Option<&str>,
    plaintext: &PlaintextArgs,
    output: Option<(PathBuf, Radix)>,
    json: bool,
    report_path: Option<&Path>,
) -> Result<u8> {
    let cfg = params.validate().context("invalid attack configuration")?;
    let pt = plaintext.source()?.resolve(cfg.pattern_len());
    let target = match (ciphertext, key) {
        (Some(c), _) => Target::intercepted(&cfg, parse_bits(c, "ciphertext")?, pt)?,
        (None, Some((r1, r2))) => Target::simulate(&cfg, r1, r2, pt)?,
        (None, None) => bail!("either --ciphertext or both --r1 and --r2 are required"),
    };
    info!(ciphertext = %target.ciphertext().to_transmission_string(), "target ready");

    let mut runner = Attack::new(cfg);
    if let Some((dir, radix)) = output {
        runner = runner.with_output(dir, radix);
    }
    let report = runner.run(&target)?;

    println!("{}", report.summary_line());
    if json {
        println!("{}", report.to_json()?);
    }
    if let Some(path) = report_path {
        ensure_parent_dir(path)?;
        std::fs::write(path, report.to_json()?)
            .with_context(|| format!("writing run report to {}", path.display()))?;
    }
    if let Some(key) = report.recovered_key() {
        info!(%key, "key recovered");
    }
    Ok(report.outcome.exit_status())
}

fn encrypt(dims: Dims, r1: u64, r2: u64, plaintext: &PlaintextArgs) -> Result<()> {
    // Error budget is irrelevant here; zero only satisfies validation.
    let cfg = params(dims, 0, MatcherArgs {
        shift_and: false,
        insertion: false,
    })
    .validate()
    .context("invalid configuration")?;
    let pt = plaintext.source()?.resolve(cfg.pattern_len());
    let target = Target::simulate(&cfg, r1, r2, pt)?;

    info!(r1, r2, m = cfg.pattern_len(), "encrypting");
    println!("{}", target.ciphertext().to_transmission_string());
    println!("{}", target.ciphertext().to_str_radix(10));
    Ok(())
}

fn scan(params: &AttackParams, r2: u64, ciphertext: &str, aligned: bool, json: bool) -> Result<()> {
    let cfg: AttackConfig = params.validate().context("invalid scan configuration")?;
    let r2 = cfg.check_seed(RegisterRole::Decimated, r2)?;
    let pattern = parse_bits(ciphertext, "ciphertext")?;
    cfg.check_ciphertext(&pattern)?;

    let masks = AlphabetMasks::build(&pattern, cfg.pattern_len(), cfg.matcher().shift_or);
    let text = if aligned {
        let first = masks.first_symbol().unwrap_or(false);
        Lfsr::new(cfg.polynomial(), r2)
            .generate_aligned(cfg.text_len(), first)
            .with_context(|| format!("R2={r2} never emits {}", u8::from(first)))?
    } else {
        lfsr::generate(cfg.polynomial(), r2, cfg.text_len())
    };
    let matcher = Matcher::from_masks(masks, cfg.levels(), cfg.matcher().allow_insertion);
    let levels = matcher.scan(&text);

    info!(r2, hits = levels.hit_count(), best = ?levels.best(), "scan done");
    if json {
        println!(
            "{}",
            serde_json::to_string(&levels).context("serialize match levels")?
        );
    } else {
        let line: Vec<String> = levels.as_slice().iter().map(ToString::to_string).collect();
        println!("{}", line.join(","));
        match levels.best() {
            Some(best) => println!("matched: min_errors={best} hits={}", levels.hit_count()),
            None => println!("no match"),
        }
    }
    Ok(())
}

fn generate(degree: usize, seed: u64, len: u64, align_to: Option<u8>, format: FormatOpt) -> Result<()> {
    let poly = FeedbackPolynomial::for_degree(degree)?;
    if seed > poly.max_state() {
        bail!("seed {seed} exceeds the largest {degree}-bit state {}", poly.max_state());
    }
    let len = usize::try_from(len).context("length does not fit in memory")?;

    let bits = match align_to {
        Some(sym) => Lfsr::new(&poly, seed)
            .generate_aligned(len, sym == 1)
            .with_context(|| format!("seed {seed} never emits {sym}"))?,
        None => lfsr::generate(&poly, seed, len),
    };
    let out = match format {
        FormatOpt::Transmission => bits.to_transmission_string(),
        FormatOpt::Binary => Radix::Binary.render(&bits),
        FormatOpt::Decimal => Radix::Decimal.render(&bits),
        FormatOpt::Base62 => Radix::Base62.render(&bits),
    };
    println!("{out}");
    Ok(())
}
