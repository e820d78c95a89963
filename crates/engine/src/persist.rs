// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-writer persistence queue.
//!
//! Saves are queued in mutation order and written by one background task.
//! When several saves are waiting, only the newest graph is written and
//! every waiter receives that write's result.

use berth_core::WorkspaceGraph;
use berth_storage::{SnapshotError, Store, StoreError};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Outcome of a save, shared by every coalesced waiter
pub type SaveResult = Result<(), Arc<StoreError>>;

struct SaveRequest {
    graph: Arc<WorkspaceGraph>,
    done: oneshot::Sender<SaveResult>,
}

/// Handle to the background writer
#[derive(Clone)]
pub struct Persister {
    tx: mpsc::UnboundedSender<SaveRequest>,
}

/// Pending save result
pub struct SaveTicket(oneshot::Receiver<SaveResult>);

impl SaveTicket {
    pub async fn wait(self) -> SaveResult {
        self.0.await.unwrap_or_else(|_| Err(stopped()))
    }
}

fn stopped() -> Arc<StoreError> {
    Arc::new(StoreError::Snapshot(SnapshotError::Io(std::io::Error::other(
        "persistence writer stopped",
    ))))
}

impl Persister {
    /// Start the writer task on the current runtime.
    pub fn spawn(store: Arc<dyn Store>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(store, rx));
        Self { tx }
    }

    /// Queue `graph` for saving.
    pub fn enqueue(&self, graph: Arc<WorkspaceGraph>) -> SaveTicket {
        let (done, rx) = oneshot::channel();
        if let Err(mpsc::error::SendError(request)) = self.tx.send(SaveRequest { graph, done }) {
            let _ = request.done.send(Err(stopped()));
        }
        SaveTicket(rx)
    }

    /// Queue `graph` and wait for it to be written.
    pub async fn save(&self, graph: Arc<WorkspaceGraph>) -> SaveResult {
        self.enqueue(graph).wait().await
    }
}

async fn run(store: Arc<dyn Store>, mut rx: mpsc::UnboundedReceiver<SaveRequest>) {
    while let Some(first) = rx.recv().await {
        let mut batch = vec![first];
        while let Ok(next) = rx.try_recv() {
            batch.push(next);
        }

        let Some(graph) = batch.last().map(|r| Arc::clone(&r.graph)) else {
            continue;
        };
        if batch.len() > 1 {
            tracing::debug!(coalesced = batch.len(), "writing newest of queued saves");
        }

        let store = Arc::clone(&store);
        let result = match tokio::task::spawn_blocking(move || store.save(&graph)).await {
            Ok(result) => result.map_err(Arc::new),
            Err(join) => Err(Arc::new(StoreError::Snapshot(SnapshotError::Io(
                std::io::Error::other(join),
            )))),
        };
        if let Err(e) = &result {
            tracing::error!(error = %e, "failed to save workspace graph");
        }

        for request in batch {
            let _ = request.done.send(result.clone());
        }
    }
}

#[cfg(test)]
#[path = "persist_tests.rs"]
mod tests;
