// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `berth view` - Live service views

use anyhow::Result;
use berth_engine::ViewInfo;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};

use crate::client::DaemonClient;
use crate::output::{format_bytes, format_time_ago, print_json, print_result, OutputFormat};
use crate::table::{Column, Table};

#[derive(Args)]
pub struct ViewArgs {
    #[command(subcommand)]
    pub command: ViewCommand,
}

#[derive(Subcommand)]
pub enum ViewCommand {
    /// List loaded views, most recently used first
    List,
    /// Load (or focus) a service's view
    Load { workspace: String, service: String },
    /// Close a service's view
    Close { workspace: String, service: String },
    /// Record activity on a loaded view
    Touch { workspace: String, service: String },
    /// Exempt a view from eviction
    Pin {
        workspace: String,
        service: String,
        /// Remove the pin instead
        #[arg(long)]
        unpin: bool,
    },
    /// Evict idle and excess views now
    Sweep,
}

impl ViewCommand {
    pub fn is_query(&self) -> bool {
        matches!(self, ViewCommand::List)
    }
}

pub async fn handle(command: ViewCommand, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    match command {
        ViewCommand::List => {
            let mut views = client.list_views().await?;
            sort_recent_first(&mut views);
            match format {
                OutputFormat::Text if views.is_empty() => println!("No views loaded"),
                OutputFormat::Text => {
                    view_table(&views, Utc::now(), Table::new).render(&mut std::io::stdout())
                }
                OutputFormat::Json => print_json(&views)?,
            }
        }
        ViewCommand::Load { workspace, service } => {
            let view = client.load_service(&workspace, &service).await?;
            print_result(format, &view, || {
                format!("Loaded {} in partition {}", view.service_id, view.partition)
            })?;
        }
        ViewCommand::Close { workspace, service } => {
            client.close_service(&workspace, &service).await?;
            print_result(format, &serde_json::json!({ "closed": service }), || {
                format!("Closed view of {service}")
            })?;
        }
        ViewCommand::Touch { workspace, service } => {
            client.touch_service(&workspace, &service).await?;
            print_result(format, &serde_json::json!({ "touched": service }), || {
                format!("Touched {service}")
            })?;
        }
        ViewCommand::Pin {
            workspace,
            service,
            unpin,
        } => {
            let view = client.pin_service(&workspace, &service, !unpin).await?;
            print_result(format, &view, || {
                let verb = if view.pinned { "Pinned" } else { "Unpinned" };
                format!("{verb} {}", view.service_id)
            })?;
        }
        ViewCommand::Sweep => {
            let evicted = client.run_eviction_sweep().await?;
            print_result(format, &evicted, || match evicted.len() {
                0 => "Nothing to evict".to_string(),
                n => {
                    let ids: Vec<String> = evicted.iter().map(ToString::to_string).collect();
                    format!("Evicted {n} view(s): {}", ids.join(", "))
                }
            })?;
        }
    }
    Ok(())
}

fn sort_recent_first(views: &mut [ViewInfo]) {
    views.sort_by(|a, b| {
        b.last_access
            .cmp(&a.last_access)
            .then_with(|| a.key().cmp(&b.key()))
    });
}

fn view_table(
    views: &[ViewInfo],
    now: DateTime<Utc>,
    make: impl FnOnce(Vec<Column>) -> Table,
) -> Table {
    let mut table = make(vec![
        Column::muted("SERVICE").with_max(12),
        Column::muted("WORKSPACE").with_max(12),
        Column::left("PARTITION").with_max(40),
        Column::status("STATE"),
        Column::right("MEMORY"),
        Column::right("LAST USED"),
    ]);
    for v in views {
        let state = if v.focused {
            "focused"
        } else if v.pinned {
            "pinned"
        } else {
            "loaded"
        };
        table.row(vec![
            v.service_id.to_string(),
            v.workspace_id.to_string(),
            v.partition.to_string(),
            state.to_string(),
            format_bytes(v.memory_bytes),
            format_time_ago(v.last_access, now),
        ]);
    }
    table
}

#[cfg(test)]
#[path = "view_tests.rs"]
mod tests;
