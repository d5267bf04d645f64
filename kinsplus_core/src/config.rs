//! TOML configuration with validation.
//!
//! All keys have defaults matching an identity setup with no extra joints;
//! the binary lets CLI flags override the file values before validation.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::consts::MAX_EXTRA_JOINTS;

/// Configuration loading/validation error.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File I/O error.
    #[error("config I/O error: {0}")]
    Io(String),
    /// TOML parse error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Parameter out of bounds or malformed.
    #[error("config validation: {0}")]
    Validation(String),
}

/// Adapter configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AdapterConfig {
    /// Component name; prefixes every pin and funct name.
    pub name: String,
    /// Axis letters ordered for joint assignment ("" = default when no
    /// extra joints are configured).
    pub coordinates: String,
    /// Number of extra joints outside the kinematics (negative is treated
    /// as zero).
    pub extra_joints: i32,
    /// Kinematics mode selector: `1` (identity), `b`, `f` or `i`.
    pub kins_type: String,
    /// Control cycle period [µs].
    pub cycle_time_us: u32,
    /// CPU core for the cyclic thread (rt builds).
    pub cpu_core: usize,
    /// SCHED_FIFO priority for the cyclic thread (rt builds).
    pub rt_priority: i32,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            name: "kinsplus".to_string(),
            coordinates: String::new(),
            extra_joints: 0,
            kins_type: "1".to_string(),
            cycle_time_us: 1000,
            cpu_core: 1,
            rt_priority: 80,
        }
    }
}

impl AdapterConfig {
    /// The kinematics selector character (`1` when unset).
    pub fn kins_selector(&self) -> char {
        self.kins_type.chars().next().unwrap_or('1')
    }

    /// Validate parameter bounds. Coordinate letters themselves are
    /// validated by setup, which owns the parsing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::Validation("name must not be empty".into()));
        }
        if !matches!(self.kins_selector(), '1' | 'b' | 'B' | 'f' | 'F' | 'i' | 'I') {
            return Err(ConfigError::Validation(format!(
                "unknown kins_type selector {:?} (expected 1, b, f or i)",
                self.kins_type
            )));
        }
        if self.extra_joints > MAX_EXTRA_JOINTS as i32 {
            return Err(ConfigError::Validation(format!(
                "extra_joints = {} exceeds max {}",
                self.extra_joints, MAX_EXTRA_JOINTS
            )));
        }
        if !(100..=100_000).contains(&self.cycle_time_us) {
            return Err(ConfigError::Validation(format!(
                "cycle_time_us = {} out of range 100..=100000",
                self.cycle_time_us
            )));
        }
        if !(1..=99).contains(&self.rt_priority) {
            return Err(ConfigError::Validation(format!(
                "rt_priority = {} out of range 1..=99",
                self.rt_priority
            )));
        }
        Ok(())
    }
}

/// Load and validate an [`AdapterConfig`] from a TOML file.
pub fn load_config(path: &Path) -> Result<AdapterConfig, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Io(format!("failed to read {}: {e}", path.display())))?;
    let config: AdapterConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    config.validate()?;
    Ok(config)
}
