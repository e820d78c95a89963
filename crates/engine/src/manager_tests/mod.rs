// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace manager tests

mod partitions;
mod persistence;
mod services;
mod settings;
mod views;
mod windows;
mod workspaces;

use super::*;
use crate::ErrorKind;
use berth_adapters::{FakePartitionStore, FakeViewAdapter};
use berth_core::{FakeClock, SequentialIdGen};
use berth_storage::MemoryStore;
use std::time::Duration;

type TestManager =
    WorkspaceManager<FakeViewAdapter, FakePartitionStore, FakeClock, SequentialIdGen>;

/// Test context holding the manager and handles to its fakes
struct TestContext {
    manager: TestManager,
    views: FakeViewAdapter,
    partitions: FakePartitionStore,
    store: MemoryStore,
    clock: FakeClock,
}

impl TestContext {
    /// The id of the default "Personal" workspace of a fresh graph.
    fn personal(&self) -> WorkspaceId {
        self.manager.list_workspaces()[0].id.clone()
    }

    /// Add an enabled service to `workspace_id`.
    async fn add(&self, workspace_id: &str, name: &str) -> ServiceId {
        let spec = ServiceSpec::new(name, "web", format!("https://{}.example.com", name.to_lowercase()));
        self.manager
            .add_service(workspace_id, spec)
            .await
            .unwrap()
            .id
    }

    /// Create a workspace with the given isolation mode.
    async fn workspace(&self, name: &str, mode: IsolationMode) -> WorkspaceId {
        let spec = WorkspaceSpec {
            isolation_mode: Some(mode),
            ..WorkspaceSpec::named(name)
        };
        self.manager.create_workspace(spec).await.unwrap().id
    }

    /// Advance the clock so the next access is strictly newer.
    fn tick(&self) {
        self.clock.advance(Duration::from_millis(10));
    }
}

async fn setup() -> TestContext {
    setup_with(MemoryStore::new(), ManagerConfig::default()).await
}

async fn setup_with(store: MemoryStore, config: ManagerConfig) -> TestContext {
    let views = FakeViewAdapter::new();
    let partitions = FakePartitionStore::new();
    let clock = FakeClock::new();
    let manager = WorkspaceManager::open(
        ManagerDeps {
            views: views.clone(),
            partitions: partitions.clone(),
            store: Arc::new(store.clone()),
        },
        config,
        clock.clone(),
        SequentialIdGen::new("id"),
    )
    .await;
    TestContext {
        manager,
        views,
        partitions,
        store,
        clock,
    }
}

fn capped(max_active_views: usize) -> ManagerConfig {
    ManagerConfig {
        max_active_views,
        ..ManagerConfig::default()
    }
}

/// Names of every event received so far.
fn drain(rx: &mut broadcast::Receiver<ManagerEvent>) -> Vec<&'static str> {
    let mut names = Vec::new();
    while let Ok(event) = rx.try_recv() {
        names.push(event.name());
    }
    names
}

fn drain_events(rx: &mut broadcast::Receiver<ManagerEvent>) -> Vec<ManagerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
