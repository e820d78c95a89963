// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! berth - workspace and service session manager CLI

mod client;
mod client_lifecycle;
mod color;
mod commands;
mod daemon_process;
mod env;
mod output;
mod table;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use commands::{daemon, events, partition, service, settings, view, window, workspace};
use output::OutputFormat;

use crate::client::DaemonClient;

#[derive(Parser)]
#[command(
    name = "berth",
    version,
    about = "berth - Workspaces of isolated service sessions"
)]
pub(crate) struct Cli {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Workspace management
    Workspace(workspace::WorkspaceArgs),
    /// Services within a workspace
    Service(service::ServiceArgs),
    /// Live service views
    View(view::ViewArgs),
    /// Storage partitions
    Partition(partition::PartitionArgs),
    /// Host windows
    Window(window::WindowArgs),
    /// Global settings
    Settings(settings::SettingsArgs),
    /// Follow manager events
    Events,
    /// Daemon management
    Daemon(daemon::DaemonArgs),
}

impl Commands {
    /// Queries never start the daemon.
    fn is_query(&self) -> bool {
        match self {
            Commands::Workspace(args) => args.command.is_query(),
            Commands::Service(args) => args.command.is_query(),
            Commands::View(args) => args.command.is_query(),
            Commands::Partition(args) => args.command.is_query(),
            Commands::Window(args) => args.command.is_query(),
            Commands::Settings(args) => args.command.is_query(),
            Commands::Events => true,
            Commands::Daemon(_) => false,
        }
    }
}

pub(crate) fn cli_command() -> clap::Command {
    Cli::command()
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        let msg = format_error(&e);
        if !msg.is_empty() {
            eprintln!("Error: {}", msg);
        }
        std::process::exit(1);
    }
}

/// Format an anyhow error, deduplicating the chain.
///
/// The "Caused by" chain is skipped when the top-level message already
/// contains every source message.
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();

    let chain_redundant = err
        .chain()
        .skip(1)
        .all(|cause| top.contains(&cause.to_string()));

    if chain_redundant {
        return top;
    }

    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {}: {}", i, cause));
    }
    buf
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = OutputFormat::from_json_flag(cli.json);

    let Some(command) = cli.command else {
        cli_command().print_help()?;
        println!();
        return Ok(());
    };

    // Daemon commands manage the connection themselves
    if let Commands::Daemon(args) = command {
        return daemon::daemon(args, format).await;
    }

    let client = if command.is_query() {
        DaemonClient::connect()?
    } else {
        DaemonClient::connect_or_start()?
    };

    match command {
        Commands::Workspace(args) => workspace::handle(args.command, &client, format).await,
        Commands::Service(args) => service::handle(args.command, &client, format).await,
        Commands::View(args) => view::handle(args.command, &client, format).await,
        Commands::Partition(args) => partition::handle(args.command, &client, format).await,
        Commands::Window(args) => window::handle(args.command, &client, format).await,
        Commands::Settings(args) => settings::handle(args.command, &client, format).await,
        Commands::Events => events::follow(&client, format).await,
        Commands::Daemon(args) => daemon::daemon(args, format).await,
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
