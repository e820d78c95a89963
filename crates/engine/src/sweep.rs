// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic memory-pressure eviction.

use crate::manager::WorkspaceManager;
use berth_adapters::{PartitionStore, ViewAdapter};
use berth_core::{Clock, IdGen};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Run [`WorkspaceManager::run_eviction_sweep`] every `period` until
/// `shutdown` is notified.
pub fn spawn_eviction_sweep<V, P, C, G>(
    manager: Arc<WorkspaceManager<V, P, C, G>>,
    period: Duration,
    shutdown: Arc<Notify>,
) -> JoinHandle<()>
where
    V: ViewAdapter,
    P: PartitionStore,
    C: Clock,
    G: IdGen,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let evicted = manager.run_eviction_sweep().await;
                    if !evicted.is_empty() {
                        tracing::info!(count = evicted.len(), "memory sweep evicted views");
                    }
                }
                _ = shutdown.notified() => {
                    tracing::debug!("eviction sweep stopped");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
#[path = "sweep_tests.rs"]
mod tests;
