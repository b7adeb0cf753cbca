//! Engine configuration.
//!
//! Provides run, pacing, autopilot and logging settings plus the embedded
//! gameplay tuning. Configuration can be loaded from and saved to a TOML file.

use neon_common::{NeonError, NeonResult};
use neon_gameplay::GameplayConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

use crate::autopilot::AutopilotConfig;

/// Configuration file name.
pub const CONFIG_FILE: &str = "neon-midnight.toml";

/// Log filter used when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_FILTER: &str = "neon=info";

/// Engine configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Run Settings ===
    /// Level generation seed (None = random)
    pub seed: Option<u64>,
    /// Level to start on after leaving the menu
    pub start_level: u32,
    /// Stop after this many ticks
    pub max_ticks: u64,
    /// Pace ticks in real time at this rate (None = as fast as possible)
    pub target_fps: Option<u32>,

    // === Output Settings ===
    /// `tracing` filter directives, overridden by `RUST_LOG`
    pub log_filter: String,
    /// Print the final snapshot as JSON on stdout
    pub print_snapshot: bool,

    // === Input ===
    /// Scripted player
    pub autopilot: AutopilotConfig,

    // === Gameplay ===
    /// Simulation tuning
    pub gameplay: GameplayConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            start_level: 1,
            max_ticks: 10_000,
            target_fps: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            print_snapshot: false,
            autopilot: AutopilotConfig::default(),
            gameplay: GameplayConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::try_load_from(path) {
            Ok(Some(config)) => {
                info!("Loaded config from {}", path.display());
                config
            },
            Ok(None) => {
                info!("Config file not found, using defaults");
                Self::default()
            },
            Err(e) => {
                warn!("Failed to load config file: {e}");
                Self::default()
            },
        }
    }

    /// Reads a configuration file. Returns `None` if it does not exist.
    pub fn try_load_from<P: AsRef<Path>>(path: P) -> NeonResult<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map(Some)
            .map_err(|e| NeonError::Serialization(e.to_string()))
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> NeonResult<()> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| NeonError::Serialization(e.to_string()))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Checks run settings and the gameplay tuning.
    pub fn validate(&self) -> NeonResult<()> {
        if self.start_level == 0 {
            return Err(invalid("start_level", "levels are numbered from 1"));
        }
        if self.max_ticks == 0 {
            return Err(invalid("max_ticks", "must be greater than zero"));
        }
        if self.target_fps == Some(0) {
            return Err(invalid("target_fps", "must be greater than zero"));
        }
        self.gameplay
            .validate()
            .map_err(|e| invalid("gameplay", &e.to_string()))
    }
}

fn invalid(field: &str, reason: &str) -> NeonError {
    NeonError::InvalidConfig {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
