// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the adapters crate.

use std::time::Duration;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Renderer command template from `BERTH_RENDERER`, if set and non-empty.
pub fn renderer_template() -> Option<String> {
    std::env::var("BERTH_RENDERER")
        .ok()
        .filter(|s| !s.trim().is_empty())
}

/// Grace period for a renderer to exit after being killed (default: 5000ms).
pub fn view_close_timeout() -> Duration {
    parse_duration_ms("BERTH_VIEW_CLOSE_TIMEOUT_MS").unwrap_or(Duration::from_secs(5))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
