// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess helpers for renderer processes

use std::time::Duration;
use tokio::process::Child;

/// Kill a child process and wait for it to exit.
///
/// Returns an error if the kill fails or the process does not exit within
/// `timeout`. A child that has already exited is not an error.
pub async fn terminate(mut child: Child, timeout: Duration, description: &str) -> Result<(), String> {
    if let Ok(Some(_)) = child.try_wait() {
        return Ok(());
    }
    if let Err(e) = child.start_kill() {
        return Err(format!("{} kill failed: {}", description, e));
    }
    match tokio::time::timeout(timeout, child.wait()).await {
        Ok(Ok(_status)) => Ok(()),
        Ok(Err(io_err)) => Err(format!("{} wait failed: {}", description, io_err)),
        Err(_elapsed) => Err(format!(
            "{} did not exit within {}ms",
            description,
            timeout.as_millis()
        )),
    }
}

/// Resident set size of a process, read from `/proc/<pid>/status`.
///
/// Returns `None` where procfs is unavailable or the process is gone.
pub fn rss_bytes(pid: u32) -> Option<u64> {
    let status = std::fs::read_to_string(format!("/proc/{pid}/status")).ok()?;
    parse_vm_rss(&status)
}

/// Parse the `VmRSS:` line of a procfs status file into bytes.
pub(crate) fn parse_vm_rss(status: &str) -> Option<u64> {
    let line = status.lines().find(|l| l.starts_with("VmRSS:"))?;
    let kib: u64 = line
        .trim_start_matches("VmRSS:")
        .split_whitespace()
        .next()?
        .parse()
        .ok()?;
    Some(kib * 1024)
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
