// CLI module for flymply-cache
// Author: kelexine (https://github.com/kelexine)

use crate::cache::{fingerprint, CacheStore, PredictionCache};
use crate::config::AppConfig;
use crate::metrics;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// flymply-cache - inspect and maintain the turbulence prediction cache
#[derive(Parser, Debug)]
#[command(name = "flymply-cache", version, about, long_about = None)]
pub struct Args {
    /// Config file (defaults to ~/.flymply/config.toml)
    #[arg(long, global = true, env = "FLYMPLY_CACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the store file from the config
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Print Prometheus metrics after the command runs
    #[arg(long, global = true)]
    pub metrics: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show resident entry count and capacity
    Stats,

    /// Delete every cached prediction
    Clear,

    /// Run eviction and expiry now
    Prune,

    /// Print the fingerprint and storage key of an input window
    Fingerprint {
        /// JSON file holding the window matrix (`-` for stdin)
        #[arg(long)]
        window: PathBuf,
    },

    /// Print the cached response for an input window
    Get {
        /// JSON file holding the window matrix (`-` for stdin)
        #[arg(long)]
        window: PathBuf,
    },

    /// Cache a response for an input window
    Put {
        /// JSON file holding the window matrix (`-` for stdin)
        #[arg(long)]
        window: PathBuf,

        /// JSON file holding the prediction response
        #[arg(long)]
        response: PathBuf,
    },

    /// Print the effective configuration as TOML
    Config,
}

/// Execute `args.command` against `cache`, writing results to `out`.
///
/// Metrics (with `--metrics`) are written even when the command fails, so a
/// `get` miss still reports its counters before the error exit.
pub fn run<S: CacheStore>(
    args: &Args,
    config: &AppConfig,
    cache: &PredictionCache<S>,
    out: &mut dyn Write,
) -> Result<()> {
    let result = execute(&args.command, config, cache, out);

    if args.metrics {
        write!(out, "{}", metrics::gather_metrics())?;
    }
    result
}

fn execute<S: CacheStore>(
    command: &Command,
    config: &AppConfig,
    cache: &PredictionCache<S>,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        Command::Stats => {
            writeln!(out, "{}", serde_json::to_string_pretty(&cache.stats())?)?;
        }
        Command::Clear => {
            cache.clear_all();
            writeln!(out, "Cleared prediction cache")?;
        }
        Command::Prune => {
            let report = cache.prune();
            writeln!(
                out,
                "Removed {} entries (corrupt: {}, evicted: {}, expired: {}, failed: {})",
                report.removed(),
                report.corrupt,
                report.evicted,
                report.expired,
                report.failed
            )?;
        }
        Command::Fingerprint { window } => {
            let window = read_window(window)?;
            writeln!(out, "fingerprint: {}", fingerprint(&window))?;
            writeln!(out, "key:         {}", cache.key_for(&window))?;
        }
        Command::Get { window } => {
            let window = read_window(window)?;
            match cache.get::<_, Value>(&window) {
                Some(response) => writeln!(out, "{}", serde_json::to_string_pretty(&response)?)?,
                None => bail!("no cached prediction for this window"),
            }
        }
        Command::Put { window, response } => {
            let window = read_window(window)?;
            let response: Value = serde_json::from_str(&read_input(response)?)
                .context("response file is not valid JSON")?;
            cache.put(&window, &response);
            writeln!(out, "{}", cache.key_for(&window))?;
        }
        Command::Config => {
            write!(out, "{}", config.to_toml()?)?;
        }
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn read_window(path: &Path) -> Result<Vec<Vec<f64>>> {
    let raw = read_input(path)?;
    serde_json::from_str(&raw).context("window must be a JSON array of numeric arrays")
}
