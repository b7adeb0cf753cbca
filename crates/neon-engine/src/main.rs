//! # Neon Midnight Engine
//!
//! Headless host for Neon Midnight.
//!
//! Loads `neon-midnight.toml` (or the path given as the first argument),
//! drives the simulation with the autopilot, and reports how the run went.
//! `neon-midnight --write-config [path]` writes the default configuration.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod autopilot;
mod config;
mod runner;
mod timing;

use std::ffi::OsStr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{EngineConfig, CONFIG_FILE, DEFAULT_LOG_FILTER};

/// Main entry point.
fn main() -> Result<()> {
    let mut args = std::env::args_os().skip(1);
    let first = args.next();
    if first.as_deref() == Some(OsStr::new("--write-config")) {
        let path = args.next().map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from);
        EngineConfig::default()
            .save_to(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }
    let config_path = first.map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from);

    // Read the config first so its log filter can apply
    let loaded = EngineConfig::try_load_from(&config_path);
    let directives = match &loaded {
        Ok(Some(config)) => config.log_filter.as_str(),
        _ => DEFAULT_LOG_FILTER,
    };

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directives))
        .context("invalid log filter")?;
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    info!("Neon Midnight starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = match loaded {
        Ok(Some(config)) => {
            info!("Loaded config from {}", config_path.display());
            config
        },
        Ok(None) => {
            info!("Config file not found, using defaults");
            EngineConfig::default()
        },
        Err(e) => {
            warn!("Failed to load config file: {e}");
            EngineConfig::default()
        },
    };
    config.validate().context("configuration rejected")?;

    let seed = config.seed.unwrap_or_else(|| fastrand::u64(..));
    info!(seed, start_level = config.start_level, max_ticks = config.max_ticks, "Run starting");

    let summary = runner::run(&config, seed);
    info!(
        ticks = summary.ticks,
        level = summary.level,
        levels_completed = summary.levels_completed,
        bosses_defeated = summary.bosses_defeated,
        game_overs = summary.game_overs,
        kills = summary.kills,
        score = summary.score,
        hp = summary.hp,
        form = summary.form.label(),
        status = ?summary.status,
        "Run finished"
    );

    if config.print_snapshot {
        let json = serde_json::to_string_pretty(&summary.snapshot)
            .context("failed to serialize snapshot")?;
        println!("{json}");
    }

    info!("Neon Midnight shutdown complete");
    Ok(())
}
