// flymply-cache - turbulence prediction cache tooling
// Author: kelexine (https://github.com/kelexine)

use anyhow::{Context, Result};
use clap::Parser;
use flymply_cache::cache::{FileStore, MemoryStore, PredictionCache};
use flymply_cache::cli::{self, Args, Command};
use flymply_cache::config::AppConfig;
use flymply_cache::utils::logging;
use std::path::PathBuf;
use tracing::info;

fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Phase 1: Load configuration
    let config = AppConfig::load_from(args.config.as_deref())?;

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;

    let mut stdout = std::io::stdout().lock();

    // Printing the configuration must not require a readable store
    if let Command::Config = args.command {
        let cache = PredictionCache::with_config(MemoryStore::new(), config.cache.cache_config());
        return cli::run(&args, &config, &cache, &mut stdout);
    }

    // Phase 3: Open the persistent medium
    let store_path = args
        .store
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.cache.store_path));
    let store = FileStore::open(&store_path)
        .with_context(|| format!("opening cache store {}", store_path.display()))?;
    info!("Using cache store {}", store_path.display());

    let cache = PredictionCache::with_config(store, config.cache.cache_config());

    // Phase 4: Run the command
    cli::run(&args, &config, &cache, &mut stdout)
}
