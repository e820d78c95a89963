// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `berth settings` - Global preferences

use anyhow::{bail, Result};
use berth_core::{Settings, SettingsPatch};
use clap::{Args, Subcommand};

use crate::client::DaemonClient;
use crate::color;
use crate::output::{print_json, OutputFormat};

#[derive(Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Show current settings
    Show,
    /// Change settings
    Set {
        /// Workspace activated at startup
        #[arg(long, conflicts_with = "clear_default_workspace")]
        default_workspace: Option<String>,
        /// Forget the default workspace
        #[arg(long)]
        clear_default_workspace: bool,
        /// Switch workspaces when one of their services is loaded
        #[arg(long)]
        auto_switch: Option<bool>,
    },
}

impl SettingsCommand {
    pub fn is_query(&self) -> bool {
        matches!(self, SettingsCommand::Show)
    }
}

pub async fn handle(
    command: SettingsCommand,
    client: &DaemonClient,
    format: OutputFormat,
) -> Result<()> {
    let settings = match command {
        SettingsCommand::Show => client.get_settings().await?,
        SettingsCommand::Set {
            default_workspace,
            clear_default_workspace,
            auto_switch,
        } => {
            let patch = settings_patch(default_workspace, clear_default_workspace, auto_switch)?;
            client.update_settings(patch).await?
        }
    };
    match format {
        OutputFormat::Text => print_settings(&settings),
        OutputFormat::Json => print_json(&settings)?,
    }
    Ok(())
}

fn settings_patch(
    default_workspace: Option<String>,
    clear_default_workspace: bool,
    auto_switch: Option<bool>,
) -> Result<SettingsPatch> {
    let default_workspace = if clear_default_workspace {
        // An empty id clears the field
        Some(String::new())
    } else {
        default_workspace
    };
    if default_workspace.is_none() && auto_switch.is_none() {
        bail!("nothing to change (see `berth settings set --help`)");
    }
    Ok(SettingsPatch {
        default_workspace,
        auto_switch_on_activity: auto_switch,
    })
}

fn print_settings(settings: &Settings) {
    println!(
        "{} {}",
        color::context("Default workspace:"),
        settings
            .default_workspace
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "-".to_string())
    );
    println!(
        "{} {}",
        color::context("Auto-switch on activity:"),
        color::status(if settings.auto_switch_on_activity { "on" } else { "off" })
    );
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
