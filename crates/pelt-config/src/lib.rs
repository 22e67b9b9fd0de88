//! Configuration system for the Pelt fur components.
//!
//! Author-time settings (shell counts, wind, LOD tiers, batching, profiler
//! and UI speed control) persisted to disk as RON. Supports CLI overrides via
//! clap, hot-reload detection, and forward/backward compatible serialization.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    BatchingConfig, CONFIG_FILE_NAME, Config, DebugConfig, FurConfig, LodConfig, ProfilerConfig,
    ShellAllocation, UiConfig, WindConfig, default_config_dir,
};
pub use error::ConfigError;
