// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::ManagerDeps;
use berth_adapters::{FakePartitionStore, FakeViewAdapter};
use berth_core::{FakeClock, ManagerConfig, SequentialIdGen, ServiceSpec};
use berth_storage::MemoryStore;

#[tokio::test]
async fn sweep_runs_on_interval_and_stops_on_shutdown() {
    let views = FakeViewAdapter::new();
    let config = ManagerConfig {
        memory_threshold_bytes: 100,
        ..ManagerConfig::default()
    };
    let manager = Arc::new(
        WorkspaceManager::open(
            ManagerDeps {
                views: views.clone(),
                partitions: FakePartitionStore::new(),
                store: Arc::new(MemoryStore::new()),
            },
            config,
            FakeClock::new(),
            SequentialIdGen::new("id"),
        )
        .await,
    );
    let ws = manager.list_workspaces()[0].id.clone();
    let mut services = Vec::new();
    for name in ["a", "b"] {
        let spec = ServiceSpec::new(name, "web", format!("https://{name}.example.com"));
        services.push(manager.add_service(ws.as_str(), spec).await.unwrap().id);
    }
    for service in &services {
        manager.load_service(ws.as_str(), service.as_str()).await.unwrap();
        views.set_memory(service.as_str(), 80);
    }

    let shutdown = Arc::new(Notify::new());
    let handle = spawn_eviction_sweep(
        Arc::clone(&manager),
        Duration::from_millis(10),
        Arc::clone(&shutdown),
    );

    let mut remaining = manager.list_views().await.len();
    for _ in 0..100 {
        if remaining == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        remaining = manager.list_views().await.len();
    }
    assert_eq!(remaining, 1);

    shutdown.notify_one();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .unwrap()
        .unwrap();
}
