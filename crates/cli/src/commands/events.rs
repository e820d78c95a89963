// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `berth events` - Follow manager events

use anyhow::Result;
use berth_core::ManagerEvent;
use chrono::Utc;

use crate::client::DaemonClient;
use crate::color;
use crate::output::OutputFormat;

/// Print events as they arrive until the daemon stops or Ctrl-C.
pub async fn follow(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let mut events = client.subscribe().await?;
    loop {
        tokio::select! {
            next = events.next() => match next? {
                Some(event) => println!("{}", render_event(&event, format)?),
                None => {
                    if format == OutputFormat::Text {
                        eprintln!("Daemon closed the event stream");
                    }
                    return Ok(());
                }
            },
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
    }
}

/// One line per event: compact JSON, or a timestamped summary.
fn render_event(event: &ManagerEvent, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string(event)?,
        OutputFormat::Text => format!(
            "{} {}",
            color::muted(&Utc::now().format("%H:%M:%S").to_string()),
            event.log_summary()
        ),
    })
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
