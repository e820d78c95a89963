// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `berth workspace` - Workspace management commands

use std::collections::BTreeSet;

use anyhow::Result;
use berth_core::{IsolationMode, Workspace, WorkspacePatch, WorkspaceSpec};
use clap::{Args, Subcommand};

use crate::client::DaemonClient;
use crate::color;
use crate::output::{print_json, print_result, OutputFormat};
use crate::table::{Column, Table};

#[derive(Args)]
pub struct WorkspaceArgs {
    #[command(subcommand)]
    pub command: WorkspaceCommand,
}

#[derive(Subcommand)]
pub enum WorkspaceCommand {
    /// List all workspaces
    List,
    /// Show a workspace and its services
    Show {
        /// Workspace ID
        id: String,
    },
    /// Show the active workspace
    Active,
    /// Create a workspace
    Create {
        name: String,
        /// Display initials (derived from the name if omitted)
        #[arg(long)]
        abbreviation: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
        /// shared or isolated
        #[arg(long)]
        isolation: Option<IsolationMode>,
        /// Member identifier (repeatable)
        #[arg(long = "member")]
        members: Vec<String>,
    },
    /// Edit a workspace
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        abbreviation: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
        /// Changing isolation closes the workspace's live views
        #[arg(long)]
        isolation: Option<IsolationMode>,
        /// Replace the member set (repeatable)
        #[arg(long = "member")]
        members: Vec<String>,
    },
    /// Delete a workspace, closing its views
    Delete { id: String },
    /// Make a workspace the active one
    Switch { id: String },
    /// Wipe every partition belonging to a workspace
    ClearData { id: String },
}

impl WorkspaceCommand {
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            WorkspaceCommand::List | WorkspaceCommand::Show { .. } | WorkspaceCommand::Active
        )
    }
}

pub async fn handle(
    command: WorkspaceCommand,
    client: &DaemonClient,
    format: OutputFormat,
) -> Result<()> {
    match command {
        WorkspaceCommand::List => {
            let workspaces = client.list_workspaces().await?;
            match format {
                OutputFormat::Text if workspaces.is_empty() => println!("No workspaces"),
                OutputFormat::Text => {
                    workspace_table(&workspaces, Table::new).render(&mut std::io::stdout())
                }
                OutputFormat::Json => print_json(&workspaces)?,
            }
        }
        WorkspaceCommand::Show { id } => {
            let workspace = client.get_workspace(&id).await?;
            match format {
                OutputFormat::Text => print_detail(&workspace),
                OutputFormat::Json => print_json(&workspace)?,
            }
        }
        WorkspaceCommand::Active => {
            let workspace = client.get_active_workspace().await?;
            match (format, workspace) {
                (OutputFormat::Text, None) => println!("No active workspace"),
                (OutputFormat::Text, Some(w)) => print_detail(&w),
                (OutputFormat::Json, w) => print_json(&w)?,
            }
        }
        WorkspaceCommand::Create {
            name,
            abbreviation,
            color,
            icon,
            isolation,
            members,
        } => {
            let spec = WorkspaceSpec {
                name,
                abbreviation,
                color,
                icon,
                isolation_mode: isolation,
                members: members.into_iter().collect(),
            };
            let workspace = client.create_workspace(spec).await?;
            print_result(format, &workspace, || {
                format!("Created workspace {} ({})", workspace.name, workspace.id)
            })?;
        }
        WorkspaceCommand::Update {
            id,
            name,
            abbreviation,
            color,
            icon,
            isolation,
            members,
        } => {
            let patch = WorkspacePatch {
                name,
                abbreviation,
                color,
                icon,
                isolation_mode: isolation,
                members: members_patch(members),
            };
            let workspace = client.update_workspace(&id, patch).await?;
            print_result(format, &workspace, || {
                format!("Updated workspace {} ({})", workspace.name, workspace.id)
            })?;
        }
        WorkspaceCommand::Delete { id } => {
            client.delete_workspace(&id).await?;
            print_result(format, &serde_json::json!({ "deleted": id }), || {
                format!("Deleted workspace {id}")
            })?;
        }
        WorkspaceCommand::Switch { id } => {
            let workspace = client.switch_workspace(&id).await?;
            print_result(format, &workspace, || {
                format!("Switched to {} ({})", workspace.name, workspace.id)
            })?;
        }
        WorkspaceCommand::ClearData { id } => {
            let cleared = client.clear_workspace_data(&id).await?;
            print_result(format, &cleared, || {
                format!("Cleared {} partition(s) of workspace {id}", cleared.len())
            })?;
        }
    }
    Ok(())
}

/// An empty `--member` list leaves members untouched.
fn members_patch(members: Vec<String>) -> Option<BTreeSet<String>> {
    if members.is_empty() {
        None
    } else {
        Some(members.into_iter().collect())
    }
}

fn workspace_table(workspaces: &[Workspace], make: impl FnOnce(Vec<Column>) -> Table) -> Table {
    let mut table = make(vec![
        Column::muted("ID").with_max(12),
        Column::left("ABBR"),
        Column::left("NAME"),
        Column::left("ISOLATION"),
        Column::right("SERVICES"),
        Column::status("STATE"),
    ]);
    for w in workspaces {
        table.row(vec![
            w.id.to_string(),
            w.abbreviation.clone(),
            w.name.clone(),
            w.isolation_mode.to_string(),
            w.services.len().to_string(),
            if w.is_active { "active" } else { "inactive" }.to_string(),
        ]);
    }
    table
}

fn print_detail(w: &Workspace) {
    println!("{} {} ({})", color::header("Workspace:"), w.name, w.id);
    println!("  {} {}", color::context("Abbreviation:"), w.abbreviation);
    println!("  {} {}", color::context("Color:"), w.color);
    if let Some(icon) = &w.icon {
        println!("  {} {}", color::context("Icon:"), icon);
    }
    println!("  {} {}", color::context("Isolation:"), w.isolation_mode);
    println!(
        "  {} {}",
        color::context("State:"),
        color::status(if w.is_active { "active" } else { "inactive" })
    );
    if !w.members.is_empty() {
        let members: Vec<&str> = w.members.iter().map(String::as_str).collect();
        println!("  {} {}", color::context("Members:"), members.join(", "));
    }
    println!("  {} {}", color::context("Created:"), w.created.to_rfc3339());
    if w.services.is_empty() {
        println!("  {}", color::muted("(no services)"));
        return;
    }
    println!();
    super::service::service_table(&w.services, Table::new).render(&mut std::io::stdout());
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
