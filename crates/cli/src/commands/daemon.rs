// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `berth daemon` - Daemon management commands

use std::path::Path;
use std::process::Command;

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};

use crate::client::DaemonClient;
use crate::client_lifecycle::daemon_stop;
use crate::daemon_process::{daemon_log, find_berthd_binary};
use crate::output::{format_uptime, print_json, OutputFormat};

#[derive(Args)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub command: DaemonCommand,
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start the daemon (foreground or background)
    Start {
        /// Run in foreground (useful for debugging)
        #[arg(long)]
        foreground: bool,
    },
    /// Stop the daemon, flushing state first
    Stop,
    /// Stop and restart the daemon
    Restart,
    /// Check daemon status
    Status,
    /// Print the daemon version
    Version,
    /// View daemon logs
    Logs {
        /// Number of recent lines to show
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
        /// Show all lines (no limit)
        #[arg(long, conflicts_with = "limit")]
        no_limit: bool,
    },
}

pub async fn daemon(args: DaemonArgs, format: OutputFormat) -> Result<()> {
    match args.command {
        DaemonCommand::Start { foreground } => start(foreground).await,
        DaemonCommand::Stop => stop().await,
        DaemonCommand::Restart => restart().await,
        DaemonCommand::Status => status(format).await,
        DaemonCommand::Version => version(format).await,
        DaemonCommand::Logs { limit, no_limit } => logs(limit, no_limit, format),
    }
}

fn print_not_running(format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("Daemon not running"),
        OutputFormat::Json => print_json(&serde_json::json!({ "status": "not_running" }))?,
    }
    Ok(())
}

async fn start(foreground: bool) -> Result<()> {
    if foreground {
        let status = Command::new(find_berthd_binary()).status()?;
        if !status.success() {
            return Err(anyhow!("Daemon exited with status: {}", status));
        }
        return Ok(());
    }

    if let Ok(client) = DaemonClient::connect() {
        if let Ok(status) = client.status().await {
            println!(
                "Daemon already running (uptime: {})",
                format_uptime(status.uptime_secs)
            );
            return Ok(());
        }
    }

    DaemonClient::connect_or_start()?;
    println!("Daemon started");
    Ok(())
}

async fn stop() -> Result<()> {
    match daemon_stop().await {
        Ok(true) => println!("Daemon stopped"),
        Ok(false) => println!("Daemon not running"),
        Err(e) => return Err(anyhow!("Failed to stop daemon: {}", e)),
    }
    Ok(())
}

async fn restart() -> Result<()> {
    let was_running = daemon_stop()
        .await
        .map_err(|e| anyhow!("Failed to stop daemon: {}", e))?;

    if was_running {
        // Grace period for the OS to release the socket
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    }

    DaemonClient::connect_or_start()?;
    println!("Daemon restarted");
    Ok(())
}

async fn status(format: OutputFormat) -> Result<()> {
    let Ok(client) = DaemonClient::connect() else {
        return print_not_running(format);
    };

    let status = match client.status().await {
        Ok(status) => status,
        Err(e) if e.is_not_running() => return print_not_running(format),
        Err(e) => return Err(e.into()),
    };
    let version = client
        .hello()
        .await
        .unwrap_or_else(|_| "unknown".to_string());

    match format {
        OutputFormat::Text => {
            println!("Status: running");
            println!("Version: {}", version);
            println!("Uptime: {}", format_uptime(status.uptime_secs));
            println!("Workspaces: {}", status.workspaces);
            println!(
                "Active workspace: {}",
                status.active_workspace.as_deref().unwrap_or("-")
            );
            println!("Views: {} loaded", status.active_views);
        }
        OutputFormat::Json => {
            let obj = serde_json::json!({
                "status": "running",
                "version": version,
                "uptime": format_uptime(status.uptime_secs),
                "daemon": status,
            });
            print_json(&obj)?;
        }
    }
    Ok(())
}

async fn version(format: OutputFormat) -> Result<()> {
    let Ok(client) = DaemonClient::connect() else {
        return print_not_running(format);
    };
    let version = match client.hello().await {
        Ok(v) => v,
        Err(e) if e.is_not_running() => return print_not_running(format),
        Err(_) => "unknown".to_string(),
    };
    match format {
        OutputFormat::Text => println!("berthd {}", version),
        OutputFormat::Json => print_json(&serde_json::json!({ "version": version }))?,
    }
    Ok(())
}

fn logs(limit: usize, no_limit: bool, format: OutputFormat) -> Result<()> {
    let log_path = daemon_log()?;

    if !log_path.exists() {
        match format {
            OutputFormat::Text => println!("No log file found at {}", log_path.display()),
            OutputFormat::Json => print_json(&serde_json::json!({
                "log_path": log_path.to_string_lossy(),
                "lines": [],
            }))?,
        }
        return Ok(());
    }

    let lines = read_last_lines(&log_path, (!no_limit).then_some(limit))?;
    match format {
        OutputFormat::Text => {
            for line in &lines {
                println!("{line}");
            }
        }
        OutputFormat::Json => print_json(&serde_json::json!({
            "log_path": log_path.to_string_lossy(),
            "lines": lines,
        }))?,
    }
    Ok(())
}

fn read_last_lines(path: &Path, limit: Option<usize>) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    let lines: Vec<String> = content.lines().map(String::from).collect();
    let start = match limit {
        Some(n) => lines.len().saturating_sub(n),
        None => 0,
    };
    Ok(lines[start..].to_vec())
}

#[cfg(test)]
#[path = "daemon_tests.rs"]
mod tests;
