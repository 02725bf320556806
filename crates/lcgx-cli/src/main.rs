//! lcgx CLI
//!
//! XOR a file with an LCG keystream across every available core.

mod config;
mod progress;

use clap::Parser;
use clap::error::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use lcgx_core::{CipherParameters, Pipeline, RunConfig, RunReport};

use config::Config;
use progress::{StageProgress, format_bytes, format_duration, format_speed};

/// lcgx - parallel LCG keystream XOR transform
///
/// Running the same command on the output restores the input.
#[derive(Parser, Debug)]
#[command(name = "lcgx")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input file
    #[arg(short = 'i', long = "input", value_name = "PATH")]
    input: PathBuf,

    /// Output file (replaced atomically)
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    output: PathBuf,

    /// Seed (X0)
    #[arg(short = 'x', long = "seed", default_value_t = 0)]
    seed: u64,

    /// Multiplier (A), non-zero
    #[arg(short = 'a', long = "multiplier")]
    multiplier: u64,

    /// Increment (C)
    #[arg(short = 'c', long = "increment", default_value_t = 0)]
    increment: u64,

    /// Modulus (M), non-zero
    #[arg(short = 'm', long = "modulus")]
    modulus: u64,

    /// Worker threads (0 = one per CPU)
    #[arg(short = 'w', long = "workers")]
    workers: Option<usize>,

    /// Largest accepted input in bytes
    #[arg(long = "max-size", value_name = "BYTES")]
    max_size: Option<u64>,

    /// Configuration file path
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print a BLAKE3 digest of the output
    #[arg(long)]
    digest: bool,

    /// Enable verbose output
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            eprintln!("lcgx: {}", describe_usage(&e));
            return ExitCode::FAILURE;
        }
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("lcgx: {}", describe(&err));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.validate()?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(log_level(cli, &config))
        .with_writer(std::io::stderr)
        .init();

    let run_config = resolve(cli, &config)?;
    let pipeline = Pipeline::new(run_config)?;

    let filename = display_name(&cli.input);
    let progress = StageProgress::new(&filename, cli.quiet);
    let report = match pipeline.run_with(|stage| progress.stage(stage)) {
        Ok(report) => {
            progress.finish();
            report
        }
        Err(err) => {
            progress.abandon();
            return Err(err.into());
        }
    };

    if !cli.quiet {
        print_summary(cli, &report);
    }

    Ok(())
}

/// Merge flags over config values over built-in defaults.
fn resolve(cli: &Cli, config: &Config) -> anyhow::Result<RunConfig> {
    let params = CipherParameters::new(cli.seed, cli.multiplier, cli.increment, cli.modulus)
        .and_then(CipherParameters::require_multiplier)
        .map_err(lcgx_core::Error::from)?;

    let workers = cli.workers.unwrap_or(config.pipeline.workers);
    config::validate_workers(workers)?;

    let max_input_size = cli.max_size.unwrap_or(config.pipeline.max_input_size);

    Ok(RunConfig::new(&cli.input, &cli.output, params)
        .with_workers(workers)
        .with_max_input_size(max_input_size)
        .with_digest(cli.digest || config.output.digest))
}

fn log_level(cli: &Cli, config: &Config) -> String {
    if cli.verbose {
        "debug".to_string()
    } else if cli.quiet {
        "error".to_string()
    } else {
        config.logging.level.to_lowercase()
    }
}

/// One-line diagnostic: `<stage>: <error>`
fn describe(err: &anyhow::Error) -> String {
    match err.downcast_ref::<lcgx_core::Error>() {
        Some(e) => format!("{}: {}", e.stage(), single_line(&e.to_string())),
        None => format!("config: {}", single_line(&format!("{err:#}"))),
    }
}

/// One-line diagnostic for a rejected command line, without the usage block
fn describe_usage(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let body: String = rendered
        .lines()
        .take_while(|l| !l.starts_with("Usage:") && !l.starts_with("For more information"))
        .collect::<Vec<_>>()
        .join("\n");
    let body = single_line(&body);
    let message = body.strip_prefix("error:").unwrap_or(&body).trim();
    if message.is_empty() {
        format!("arguments: {}", err.kind())
    } else {
        format!("arguments: {message}")
    }
}

/// Collapse a multi-line message (TOML parse errors carry a snippet) into one line.
fn single_line(message: &str) -> String {
    message
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("input")
        .to_string()
}

fn print_summary(cli: &Cli, report: &RunReport) {
    let total = report.timings.total();
    let speed = if total.as_secs_f64() > 0.0 {
        report.bytes as f64 / total.as_secs_f64()
    } else {
        0.0
    };

    println!(
        "{} -> {}: {} in {} ({}), {} workers",
        cli.input.display(),
        cli.output.display(),
        format_bytes(report.bytes),
        format_duration(total),
        format_speed(speed),
        report.workers()
    );

    for worker in &report.pool.workers {
        tracing::debug!(
            "worker {}: {} bytes [{}, {}) in {:?}",
            worker.id,
            worker.bytes,
            worker.range.start,
            worker.range.end,
            worker.busy
        );
    }
    tracing::debug!(
        "stages: map {:?}, keystream {:?}, xor {:?}, write {:?}",
        report.timings.map,
        report.timings.keystream,
        report.timings.xor,
        report.timings.write
    );

    if let Some(digest) = report.digest {
        println!("blake3: {}", hex::encode(digest));
    }
}
