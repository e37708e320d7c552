//! Stockboard CLI — build and inspect dashboard snapshot files.
//!
//! Commands:
//! - `build` (default) — fetch every dataset from FMP and write the JSON snapshot
//! - `config` — print the effective configuration as TOML
//! - `inspect <file>` — load a snapshot file and report its record count
//!
//! Exit codes: 0 when at least one dataset was written, 1 when nothing was,
//! 2 on configuration errors (including a missing `FMP_API_KEY`).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use stockboard_core::{
    load_json, BuildError, BuilderConfig, ConfigError, Credentials, FmpClient, LogProgress,
    RunSummary, SnapshotBuilder, SnapshotWriter,
};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_CONFIG_FILE: &str = "stockboard.toml";

#[derive(Parser)]
#[command(
    name = "stockboard",
    version,
    about = "Stockboard — market snapshot builder for the dashboard"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every dataset and write the snapshot files.
    Build(BuildArgs),
    /// Print the effective configuration as TOML.
    Config {
        /// Path to a TOML config file. Defaults to ./stockboard.toml if present.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Load a snapshot file and report how many records it holds.
    Inspect {
        /// Snapshot file, e.g. public/data/us-stocks.json.
        file: PathBuf,
    },
}

#[derive(clap::Args, Default)]
struct BuildArgs {
    /// Path to a TOML config file. Defaults to ./stockboard.toml if present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory, overriding `out_dir`.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Milliseconds of idle time between provider requests, overriding `request_delay_ms`.
    #[arg(long)]
    delay_ms: Option<u64>,
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let outcome = match cli.command.unwrap_or(Commands::Build(BuildArgs::default())) {
        Commands::Build(args) => run_build(args),
        Commands::Config { config } => run_config(config.as_deref()),
        Commands::Inspect { file } => run_inspect(&file),
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            if e.downcast_ref::<ConfigError>().is_some() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("stockboard=info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Explicit `--config`, else `stockboard.toml` in the working directory,
/// else built-in defaults.
fn load_config(path: Option<&Path>) -> Result<BuilderConfig, ConfigError> {
    match path {
        Some(path) => BuilderConfig::from_file(path),
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            BuilderConfig::from_file(Path::new(DEFAULT_CONFIG_FILE))
        }
        None => Ok(BuilderConfig::default()),
    }
}

fn run_build(args: BuildArgs) -> Result<ExitCode> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(out_dir) = args.out_dir {
        config.out_dir = out_dir;
    }
    if let Some(delay_ms) = args.delay_ms {
        config.request_delay_ms = delay_ms;
    }
    let credentials = Credentials::from_env()?;

    let provider = FmpClient::new(
        credentials.api_key(),
        config.base_url.as_deref(),
        config.api_version,
        config.timeout(),
    )
    .context("create FMP client")?;
    let writer = SnapshotWriter::new(&config.out_dir);
    let progress = LogProgress;
    let today = chrono::Utc::now().date_naive();

    let builder = SnapshotBuilder::new(&config, &provider, &writer, &progress, today)
        .map_err(|e| match e {
            BuildError::Config(e) => anyhow::Error::from(e),
            other => other.into(),
        })?;

    match builder.run() {
        Ok(summary) => {
            print_summary(&summary, &config.out_dir);
            Ok(ExitCode::SUCCESS)
        }
        Err(BuildError::NoData { datasets }) => {
            error!(datasets, "no dataset produced any data, nothing written");
            Ok(ExitCode::FAILURE)
        }
        Err(BuildError::Config(e)) => Err(e.into()),
    }
}

fn print_summary(summary: &RunSummary, out_dir: &Path) {
    println!("Snapshot written to {}", out_dir.display());
    println!("  history from {}", summary.history_from);
    for report in &summary.reports {
        let status = if report.produced() { "ok" } else { "skipped" };
        println!(
            "  {:<20} {:>7}  {:>5} records  {:>3} failed",
            report.name,
            status,
            report.records(),
            report.failures.len()
        );
    }
    if summary.manifest.is_none() {
        println!("  (manifest not written)");
    }
}

fn run_config(path: Option<&Path>) -> Result<ExitCode> {
    let config = load_config(path)?;
    print!("{}", config.to_toml()?);
    Ok(ExitCode::SUCCESS)
}

fn run_inspect(file: &Path) -> Result<ExitCode> {
    let value: Value = load_json(file)?;
    let records = count_records(&value);
    info!(file = %file.display(), records, "inspected");
    println!("{}: {records} records", file.display());
    Ok(ExitCode::SUCCESS)
}

/// Record count for any snapshot file shape: quote lists and guru files are
/// arrays, the market snapshot splits indexes from extras, history files nest
/// their points, the manifest lists files, and profiles are a keyed map.
fn count_records(value: &Value) -> usize {
    let len = |key: &str| value.get(key).and_then(Value::as_array).map(Vec::len);
    match value {
        Value::Array(items) => items.len(),
        Value::Object(map) => {
            if let (Some(indexes), Some(extras)) = (len("indexes"), len("extras")) {
                indexes + extras
            } else if let Some(points) = len("historical") {
                points
            } else if let Some(files) = len("files") {
                files
            } else {
                map.len()
            }
        }
        _ => 0,
    }
}
