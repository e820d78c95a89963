// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `berth service` - Service management commands

use anyhow::Result;
use berth_core::{Service, ServicePatch, ServiceSpec};
use clap::{Args, Subcommand};

use crate::client::DaemonClient;
use crate::output::{print_json, print_result, OutputFormat};
use crate::table::{Column, Table};

#[derive(Args)]
pub struct ServiceArgs {
    #[command(subcommand)]
    pub command: ServiceCommand,
}

#[derive(Subcommand)]
pub enum ServiceCommand {
    /// List the services of a workspace
    List { workspace: String },
    /// Add a service to a workspace
    Add {
        workspace: String,
        name: String,
        url: String,
        /// Service type, e.g. "email" or "chat"
        #[arg(long, default_value = "web")]
        kind: String,
        #[arg(long)]
        icon_url: Option<String>,
    },
    /// Edit a service; a new URL or disabling closes its view
    Update {
        workspace: String,
        service: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        kind: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        icon_url: Option<String>,
        #[arg(long, conflicts_with = "disable")]
        enable: bool,
        #[arg(long)]
        disable: bool,
    },
    /// Remove a service, closing its view
    Remove { workspace: String, service: String },
}

impl ServiceCommand {
    pub fn is_query(&self) -> bool {
        matches!(self, ServiceCommand::List { .. })
    }
}

pub async fn handle(
    command: ServiceCommand,
    client: &DaemonClient,
    format: OutputFormat,
) -> Result<()> {
    match command {
        ServiceCommand::List { workspace } => {
            let services = client.get_workspace(&workspace).await?.services;
            match format {
                OutputFormat::Text if services.is_empty() => println!("No services"),
                OutputFormat::Text => {
                    service_table(&services, Table::new).render(&mut std::io::stdout())
                }
                OutputFormat::Json => print_json(&services)?,
            }
        }
        ServiceCommand::Add {
            workspace,
            name,
            url,
            kind,
            icon_url,
        } => {
            let spec = ServiceSpec {
                icon_url,
                ..ServiceSpec::new(name, kind, url)
            };
            let service = client.add_service(&workspace, spec).await?;
            print_result(format, &service, || {
                format!("Added service {} ({})", service.name, service.id)
            })?;
        }
        ServiceCommand::Update {
            workspace,
            service,
            name,
            kind,
            url,
            icon_url,
            enable,
            disable,
        } => {
            let patch = ServicePatch {
                name,
                kind,
                url,
                icon_url,
                is_enabled: enabled_patch(enable, disable),
                config: None,
            };
            let updated = client.update_service(&workspace, &service, patch).await?;
            print_result(format, &updated, || {
                format!("Updated service {} ({})", updated.name, updated.id)
            })?;
        }
        ServiceCommand::Remove { workspace, service } => {
            client.remove_service(&workspace, &service).await?;
            print_result(format, &serde_json::json!({ "removed": service }), || {
                format!("Removed service {service}")
            })?;
        }
    }
    Ok(())
}

fn enabled_patch(enable: bool, disable: bool) -> Option<bool> {
    match (enable, disable) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

pub(crate) fn service_table(services: &[Service], make: impl FnOnce(Vec<Column>) -> Table) -> Table {
    let mut table = make(vec![
        Column::muted("ID").with_max(12),
        Column::left("NAME"),
        Column::left("TYPE"),
        Column::status("STATE"),
        Column::left("URL").with_max(60),
    ]);
    for s in services {
        table.row(vec![
            s.id.to_string(),
            s.name.clone(),
            s.kind.clone(),
            if s.is_enabled { "enabled" } else { "disabled" }.to_string(),
            s.url.clone(),
        ]);
    }
    table
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
