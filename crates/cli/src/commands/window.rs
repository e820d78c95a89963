// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `berth window` - Host windows

use anyhow::Result;
use berth_core::{WindowRecord, WindowSpec};
use clap::{Args, Subcommand};

use crate::client::DaemonClient;
use crate::output::{print_json, print_result, OutputFormat};
use crate::table::{Column, Table};

#[derive(Args)]
pub struct WindowArgs {
    #[command(subcommand)]
    pub command: WindowCommand,
}

#[derive(Subcommand)]
pub enum WindowCommand {
    /// List open windows
    List {
        #[arg(long)]
        workspace: Option<String>,
    },
    /// Open a window showing a workspace
    Open {
        workspace: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
    },
    /// Close a window
    Close { id: String },
}

impl WindowCommand {
    pub fn is_query(&self) -> bool {
        matches!(self, WindowCommand::List { .. })
    }
}

pub async fn handle(
    command: WindowCommand,
    client: &DaemonClient,
    format: OutputFormat,
) -> Result<()> {
    match command {
        WindowCommand::List { workspace } => {
            let windows = client.get_windows(workspace.as_deref()).await?;
            match format {
                OutputFormat::Text if windows.is_empty() => println!("No windows"),
                OutputFormat::Text => {
                    window_table(&windows, Table::new).render(&mut std::io::stdout())
                }
                OutputFormat::Json => print_json(&windows)?,
            }
        }
        WindowCommand::Open {
            workspace,
            title,
            width,
            height,
        } => {
            let spec = WindowSpec {
                title,
                width,
                height,
            };
            let window = client.create_window(&workspace, spec).await?;
            print_result(format, &window, || {
                format!("Opened window {} ({})", window.title, window.id)
            })?;
        }
        WindowCommand::Close { id } => {
            client.close_window(&id).await?;
            print_result(format, &serde_json::json!({ "closed": id }), || {
                format!("Closed window {id}")
            })?;
        }
    }
    Ok(())
}

fn window_table(windows: &[WindowRecord], make: impl FnOnce(Vec<Column>) -> Table) -> Table {
    let mut table = make(vec![
        Column::muted("ID").with_max(12),
        Column::muted("WORKSPACE").with_max(12),
        Column::left("TITLE"),
        Column::right("SIZE"),
    ]);
    for w in windows {
        table.row(vec![
            w.id.to_string(),
            w.workspace_id.to_string(),
            w.title.clone(),
            format!("{}x{}", w.width, w.height),
        ]);
    }
    table
}
