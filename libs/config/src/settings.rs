//! Engine Configuration Module
//!
//! Provides configuration loading for the pool engine. Supports loading
//! from a TOML file with `$VAR` expansion inside configured paths.
//!
//! Decimal-valued settings are written as TOML strings (`fee_rate =
//! "0.003"`) so they parse without binary floating-point intermediates.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "futarch.toml";

/// Main engine configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Trading defaults
    pub engine: EngineSettings,

    /// Snapshot file locations (omit a file to keep that store in memory)
    pub persistence: PersistenceSettings,

    /// History display bounds
    pub history: HistorySettings,
}

/// Trading defaults applied when a caller does not override them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Fraction of each swap input retained as fee.
    pub fee_rate: Decimal,
    /// Default slippage tolerance for quotes, in percent.
    pub slippage_tolerance_pct: Decimal,
    /// Seed YES reserve for default-initialized pools.
    pub seed_base_reserve: Decimal,
    /// Seed NO reserve for default-initialized pools.
    pub seed_quote_reserve: Decimal,
}

/// Snapshot file locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceSettings {
    pub state_file: Option<PathBuf>,
    pub history_file: Option<PathBuf>,
    pub trade_file: Option<PathBuf>,
}

/// History display bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Maximum points handed to chart displays.
    pub display_limit: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            fee_rate: dec!(0.003),
            slippage_tolerance_pct: dec!(0.5),
            seed_base_reserve: dec!(1000),
            seed_quote_reserve: dec!(1000),
        }
    }
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self { display_limit: 50 }
    }
}

impl EngineConfig {
    /// Load configuration from `path` (or [`DEFAULT_CONFIG_PATH`]).
    ///
    /// A missing file yields the defaults with a warning; an unreadable or
    /// malformed file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));

        if !path.exists() {
            warn!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config: Self = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.expand_env_vars()?;

        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Expand `$VAR` references in configured paths.
    pub fn expand_env_vars(&mut self) -> Result<()> {
        for file in [
            &mut self.persistence.state_file,
            &mut self.persistence.history_file,
            &mut self.persistence.trade_file,
        ] {
            if let Some(path) = file {
                let raw = path.to_string_lossy();
                let expanded = shellexpand::env(raw.as_ref())
                    .with_context(|| format!("failed to expand path {raw}"))?;
                *path = PathBuf::from(expanded.into_owned());
            }
        }
        Ok(())
    }
}

/// Convenience function to load configuration with defaults.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    EngineConfig::load(path)
}
