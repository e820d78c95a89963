// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `berth partition` - Storage partition commands

use anyhow::Result;
use berth_core::{PartitionInfo, PartitionPatch};
use clap::{Args, Subcommand};

use crate::client::DaemonClient;
use crate::output::{format_bytes, print_json, print_result, OutputFormat};
use crate::table::{Column, Table};

#[derive(Args)]
pub struct PartitionArgs {
    #[command(subcommand)]
    pub command: PartitionCommand,
}

#[derive(Subcommand)]
pub enum PartitionCommand {
    /// List partitions with usage and live views
    List {
        /// Only partitions of this workspace
        #[arg(long)]
        workspace: Option<String>,
    },
    /// Attach metadata to a workspace's (or service's) partition
    Create {
        workspace: String,
        /// Required when the workspace is isolated
        #[arg(long)]
        service: Option<String>,
        #[arg(long)]
        label: Option<String>,
        /// Whether storage survives a daemon shutdown
        #[arg(long)]
        persistent: Option<bool>,
    },
    /// Edit partition metadata
    Update {
        key: String,
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        persistent: Option<bool>,
    },
    /// Wipe a partition's stored data, closing views that use it
    Clear { key: String },
}

impl PartitionCommand {
    pub fn is_query(&self) -> bool {
        matches!(self, PartitionCommand::List { .. })
    }
}

pub async fn handle(
    command: PartitionCommand,
    client: &DaemonClient,
    format: OutputFormat,
) -> Result<()> {
    match command {
        PartitionCommand::List { workspace } => {
            let partitions = client.list_partitions(workspace.as_deref()).await?;
            match format {
                OutputFormat::Text if partitions.is_empty() => println!("No partitions"),
                OutputFormat::Text => {
                    partition_table(&partitions, Table::new).render(&mut std::io::stdout())
                }
                OutputFormat::Json => print_json(&partitions)?,
            }
        }
        PartitionCommand::Create {
            workspace,
            service,
            label,
            persistent,
        } => {
            let patch = PartitionPatch { label, persistent };
            let partition = client
                .create_partition(&workspace, service.as_deref(), patch)
                .await?;
            print_result(format, &partition, || format!("Partition {}", partition.key))?;
        }
        PartitionCommand::Update {
            key,
            label,
            persistent,
        } => {
            let partition = client
                .update_partition(&key, PartitionPatch { label, persistent })
                .await?;
            print_result(format, &partition, || format!("Updated partition {}", partition.key))?;
        }
        PartitionCommand::Clear { key } => {
            let cleared = client.clear_partition(&key).await?;
            print_result(format, &cleared, || format!("Cleared partition {key}"))?;
        }
    }
    Ok(())
}

fn partition_table(partitions: &[PartitionInfo], make: impl FnOnce(Vec<Column>) -> Table) -> Table {
    let mut table = make(vec![
        Column::left("KEY").with_max(40),
        Column::muted("WORKSPACE").with_max(12),
        Column::left("LABEL"),
        Column::right("SERVICES"),
        Column::right("VIEWS"),
        Column::right("USAGE"),
        Column::status("PERSISTENT"),
    ]);
    for p in partitions {
        table.row(vec![
            p.key.to_string(),
            p.workspace_id.to_string(),
            p.label.clone().unwrap_or_else(|| "-".to_string()),
            p.service_ids.len().to_string(),
            p.active_views.to_string(),
            format_bytes(p.usage_bytes),
            if p.persistent { "yes" } else { "no" }.to_string(),
        ]);
    }
    table
}

#[cfg(test)]
#[path = "partition_tests.rs"]
mod tests;
