// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Manager configuration.
//!
//! Read from a TOML file; keys may be camelCase (as documented for the
//! command interface) or snake_case.

use crate::workspace::IsolationMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors from loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Limits and defaults for the workspace manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManagerConfig {
    /// Cap on concurrently live views
    #[serde(alias = "max_active_views")]
    pub max_active_views: usize,
    /// Aggregate view memory above which the sweep starts evicting
    #[serde(alias = "memory_threshold_bytes")]
    pub memory_threshold_bytes: u64,
    /// Period of the background eviction sweep
    #[serde(alias = "eviction_sweep_interval_ms")]
    pub eviction_sweep_interval_ms: u64,
    /// Isolation mode for workspaces created without one
    #[serde(alias = "default_isolation_mode")]
    pub default_isolation_mode: IsolationMode,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            max_active_views: 6,
            memory_threshold_bytes: 1536 * 1024 * 1024,
            eviction_sweep_interval_ms: 30_000,
            default_isolation_mode: IsolationMode::Shared,
        }
    }
}

impl ManagerConfig {
    /// Parse and validate a TOML document. Missing keys take defaults.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.eviction_sweep_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "evictionSweepIntervalMs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn eviction_sweep_interval(&self) -> Duration {
        Duration::from_millis(self.eviction_sweep_interval_ms)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
