//! Configuration file for the lcgx CLI.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use anyhow::Context;

/// Largest worker count accepted from a config file or flag
pub const MAX_WORKERS: usize = 1024;

/// lcgx configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Pipeline configuration
    pub pipeline: PipelineConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Output configuration
    pub output: OutputConfig,
}

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Worker threads (0 = one per CPU)
    #[serde(default)]
    pub workers: usize,
    /// Largest accepted input in bytes
    #[serde(default = "default_max_input_size")]
    pub max_input_size: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Print a BLAKE3 digest of the output
    #[serde(default)]
    pub digest: bool,
}

// Default values

fn default_max_input_size() -> u64 {
    lcgx_core::DEFAULT_MAX_INPUT_SIZE
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            max_input_size: default_max_input_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("cannot parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid.
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_workers(self.pipeline.workers)?;

        if self.pipeline.max_input_size == 0 {
            anyhow::bail!("max_input_size must be at least 1 byte");
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!(
                "Invalid log level: {}. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            );
        }

        Ok(())
    }
}

/// Check a worker count against [`MAX_WORKERS`]
///
/// # Errors
///
/// Returns an error if `workers` exceeds the limit.
pub fn validate_workers(workers: usize) -> anyhow::Result<()> {
    if workers > MAX_WORKERS {
        anyhow::bail!("workers must be between 0 (auto) and {MAX_WORKERS}, got {workers}");
    }
    Ok(())
}
