//! # Futarch Centralized Configuration
//!
//! Settings for the pool engine: trading defaults, persistence locations,
//! and history display bounds. Loaded from TOML with environment-variable
//! expansion in paths; every field has a default, so a missing file means
//! defaults, not an error.
//!
//! ## Usage
//!
//! ```rust
//! use config::EngineConfig;
//!
//! let config = EngineConfig::load(None).unwrap();
//! assert!(config.engine.fee_rate > rust_decimal::Decimal::ZERO);
//! ```

pub mod settings;

pub use settings::{
    load_config, EngineConfig, EngineSettings, HistorySettings, PersistenceSettings,
    DEFAULT_CONFIG_PATH,
};
