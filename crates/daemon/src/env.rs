// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::str::FromStr;

use berth_core::{IsolationMode, ManagerConfig};

use crate::lifecycle::StartupError;

/// Resolve state directory: BERTH_STATE_DIR > XDG_STATE_HOME/berth > ~/.local/state/berth
pub fn state_dir() -> Result<PathBuf, StartupError> {
    if let Ok(dir) = std::env::var("BERTH_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("berth"));
    }
    let home = std::env::var("HOME").map_err(|_| StartupError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/berth"))
}

fn parse_var<T: FromStr>(var: &'static str) -> Result<Option<T>, StartupError> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| StartupError::InvalidEnv { var, value }),
        Err(_) => Ok(None),
    }
}

fn parse_isolation(var: &'static str) -> Result<Option<IsolationMode>, StartupError> {
    let Ok(value) = std::env::var(var) else {
        return Ok(None);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "shared" => Ok(Some(IsolationMode::Shared)),
        "isolated" => Ok(Some(IsolationMode::Isolated)),
        _ => Err(StartupError::InvalidEnv { var, value }),
    }
}

/// Apply `BERTH_*` overrides on top of the file configuration.
pub fn apply_overrides(config: &mut ManagerConfig) -> Result<(), StartupError> {
    if let Some(n) = parse_var("BERTH_MAX_ACTIVE_VIEWS")? {
        config.max_active_views = n;
    }
    if let Some(bytes) = parse_var("BERTH_MEMORY_THRESHOLD_BYTES")? {
        config.memory_threshold_bytes = bytes;
    }
    if let Some(ms) = parse_var("BERTH_EVICTION_SWEEP_MS")? {
        config.eviction_sweep_interval_ms = ms;
    }
    if let Some(mode) = parse_isolation("BERTH_DEFAULT_ISOLATION")? {
        config.default_isolation_mode = mode;
    }
    Ok(())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
