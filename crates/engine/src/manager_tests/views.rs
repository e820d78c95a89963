// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use berth_core::test_support::workspace_with_services;
use berth_core::SettingsPatch;

#[tokio::test]
async fn loading_past_cap_evicts_least_recent() {
    let ctx = setup_with(MemoryStore::new(), capped(1)).await;
    let personal = ctx.personal();
    let s1 = ctx.add(personal.as_str(), "One").await;
    let s2 = ctx.add(personal.as_str(), "Two").await;
    let mut rx = ctx.manager.subscribe();

    ctx.manager
        .load_service(personal.as_str(), s1.as_str())
        .await
        .unwrap();
    ctx.tick();
    let view = ctx
        .manager
        .load_service(personal.as_str(), s2.as_str())
        .await
        .unwrap();

    assert_eq!(view.service_id, s2);
    assert_eq!(ctx.views.open_services(), vec![s2.clone()]);
    let events = drain_events(&mut rx);
    assert_eq!(
        events[1..],
        [
            ManagerEvent::ViewEvicted {
                workspace_id: personal.clone(),
                service_id: s1,
                reason: EvictionReason::Capacity,
            },
            ManagerEvent::ViewActivated {
                workspace_id: personal.clone(),
                service_id: s2,
                partition: PartitionKey::new(personal.as_str()),
            },
        ]
    );
}

#[tokio::test]
async fn shared_workspace_views_share_one_partition() {
    let ctx = setup().await;
    let personal = ctx.personal();
    let a = ctx.add(personal.as_str(), "A").await;
    let b = ctx.add(personal.as_str(), "B").await;

    let va = ctx.manager.load_service(personal.as_str(), a.as_str()).await.unwrap();
    let vb = ctx.manager.load_service(personal.as_str(), b.as_str()).await.unwrap();

    assert_eq!(va.partition, vb.partition);
    assert_eq!(va.partition, personal.as_str());
}

#[tokio::test]
async fn isolated_workspace_views_get_own_partitions() {
    let ctx = setup().await;
    let work = ctx.workspace("Work", IsolationMode::Isolated).await;
    let a = ctx.add(work.as_str(), "A").await;
    let b = ctx.add(work.as_str(), "B").await;

    let va = ctx.manager.load_service(work.as_str(), a.as_str()).await.unwrap();
    let vb = ctx.manager.load_service(work.as_str(), b.as_str()).await.unwrap();

    assert_ne!(va.partition, vb.partition);
    assert_eq!(va.partition, format!("{work}.{a}").as_str());
}

#[tokio::test]
async fn reloading_reuses_the_view() {
    let ctx = setup().await;
    let personal = ctx.personal();
    let chat = ctx.add(personal.as_str(), "Chat").await;

    let first = ctx.manager.load_service(personal.as_str(), chat.as_str()).await.unwrap();
    let mut rx = ctx.manager.subscribe();
    let second = ctx.manager.load_service(personal.as_str(), chat.as_str()).await.unwrap();

    assert_eq!(first.handle, second.handle);
    assert!(drain(&mut rx).is_empty());
    assert_eq!(ctx.views.open_count(), 1);
}

#[tokio::test]
async fn loading_never_saves_without_a_switch() {
    let ctx = setup().await;
    let personal = ctx.personal();
    let chat = ctx.add(personal.as_str(), "Chat").await;
    let saves = ctx.store.saves();

    ctx.manager.load_service(personal.as_str(), chat.as_str()).await.unwrap();

    assert_eq!(ctx.store.saves(), saves);
}

#[tokio::test]
async fn auto_switch_activates_owning_workspace() {
    let ctx = setup().await;
    let personal = ctx.personal();
    let work = ctx.workspace("Work", IsolationMode::Shared).await;
    let mail = ctx.add(work.as_str(), "Mail").await;
    ctx.manager
        .update_settings(SettingsPatch {
            auto_switch_on_activity: Some(true),
            ..SettingsPatch::default()
        })
        .await
        .unwrap();
    let mut rx = ctx.manager.subscribe();

    ctx.manager.load_service(work.as_str(), mail.as_str()).await.unwrap();

    assert_eq!(ctx.manager.get_active_workspace().unwrap().id, work);
    assert_eq!(ctx.store.saved_graph().unwrap().active_workspace_id, Some(work.clone()));
    let events = drain_events(&mut rx);
    assert_eq!(
        events.last(),
        Some(&ManagerEvent::WorkspaceSwitched {
            from: Some(personal),
            to: work,
        })
    );
}

#[tokio::test]
async fn without_auto_switch_active_workspace_is_unchanged() {
    let ctx = setup().await;
    let personal = ctx.personal();
    let work = ctx.workspace("Work", IsolationMode::Shared).await;
    let mail = ctx.add(work.as_str(), "Mail").await;

    ctx.manager.load_service(work.as_str(), mail.as_str()).await.unwrap();

    assert_eq!(ctx.manager.get_active_workspace().unwrap().id, personal);
}

#[tokio::test]
async fn close_is_idempotent() {
    let ctx = setup().await;
    let personal = ctx.personal();
    let chat = ctx.add(personal.as_str(), "Chat").await;
    ctx.manager.load_service(personal.as_str(), chat.as_str()).await.unwrap();
    let mut rx = ctx.manager.subscribe();

    ctx.manager.close_service(personal.as_str(), chat.as_str()).await.unwrap();
    ctx.manager.close_service(personal.as_str(), chat.as_str()).await.unwrap();

    assert_eq!(drain(&mut rx), vec!["view:closed"]);
    assert!(ctx.manager.list_views().await.is_empty());
}

#[tokio::test]
async fn touching_unloaded_service_is_not_found() {
    let ctx = setup().await;
    let personal = ctx.personal();
    let chat = ctx.add(personal.as_str(), "Chat").await;

    let err = ctx
        .manager
        .touch_service(personal.as_str(), chat.as_str())
        .await
        .unwrap_err();
    assert!(matches!(err, ManagerError::ViewNotLoaded(_)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn touch_protects_from_eviction() {
    let ctx = setup_with(MemoryStore::new(), capped(2)).await;
    let personal = ctx.personal();
    let a = ctx.add(personal.as_str(), "A").await;
    let b = ctx.add(personal.as_str(), "B").await;
    let c = ctx.add(personal.as_str(), "C").await;

    ctx.manager.load_service(personal.as_str(), a.as_str()).await.unwrap();
    ctx.tick();
    ctx.manager.load_service(personal.as_str(), b.as_str()).await.unwrap();
    ctx.tick();
    ctx.manager.touch_service(personal.as_str(), a.as_str()).await.unwrap();
    ctx.tick();
    ctx.manager.load_service(personal.as_str(), c.as_str()).await.unwrap();

    let live: Vec<ServiceId> = ctx
        .manager
        .list_views()
        .await
        .into_iter()
        .map(|v| v.service_id)
        .collect();
    assert!(live.contains(&a));
    assert!(!live.contains(&b));
}

#[tokio::test]
async fn pinned_view_blocks_capacity() {
    let ctx = setup_with(MemoryStore::new(), capped(1)).await;
    let personal = ctx.personal();
    let a = ctx.add(personal.as_str(), "A").await;
    let b = ctx.add(personal.as_str(), "B").await;
    ctx.manager.load_service(personal.as_str(), a.as_str()).await.unwrap();

    let pinned = ctx
        .manager
        .pin_service(personal.as_str(), a.as_str(), true)
        .await
        .unwrap();
    assert!(pinned.pinned);

    let err = ctx
        .manager
        .load_service(personal.as_str(), b.as_str())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
    assert_eq!(ctx.views.open_services(), vec![a.clone()]);

    ctx.manager
        .pin_service(personal.as_str(), a.as_str(), false)
        .await
        .unwrap();
    ctx.manager.load_service(personal.as_str(), b.as_str()).await.unwrap();
    assert_eq!(ctx.views.open_services(), vec![b]);
}

#[tokio::test]
async fn pinning_unloaded_service_is_not_found() {
    let ctx = setup().await;
    let personal = ctx.personal();
    let chat = ctx.add(personal.as_str(), "Chat").await;

    let err = ctx
        .manager
        .pin_service(personal.as_str(), chat.as_str(), true)
        .await
        .unwrap_err();
    assert!(matches!(err, ManagerError::ViewNotLoaded(_)));
}

#[tokio::test]
async fn renderer_failure_is_a_view_error() {
    let ctx = setup().await;
    let personal = ctx.personal();
    let chat = ctx.add(personal.as_str(), "Chat").await;
    ctx.views.fail_open(chat.as_str());

    let err = ctx
        .manager
        .load_service(personal.as_str(), chat.as_str())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ViewFailure);
    assert!(ctx.manager.list_views().await.is_empty());
}

#[tokio::test]
async fn memory_sweep_evicts_under_pressure() {
    let config = ManagerConfig {
        memory_threshold_bytes: 1_000,
        ..ManagerConfig::default()
    };
    let ctx = setup_with(MemoryStore::new(), config).await;
    let personal = ctx.personal();
    let a = ctx.add(personal.as_str(), "A").await;
    let b = ctx.add(personal.as_str(), "B").await;
    ctx.manager.load_service(personal.as_str(), a.as_str()).await.unwrap();
    ctx.tick();
    ctx.manager.load_service(personal.as_str(), b.as_str()).await.unwrap();
    ctx.views.set_memory(a.as_str(), 800);
    ctx.views.set_memory(b.as_str(), 800);
    let mut rx = ctx.manager.subscribe();

    let evicted = ctx.manager.run_eviction_sweep().await;

    assert_eq!(evicted, vec![ViewKey::new(personal.clone(), a.clone())]);
    assert_eq!(
        drain_events(&mut rx),
        vec![ManagerEvent::ViewEvicted {
            workspace_id: personal,
            service_id: a,
            reason: EvictionReason::MemoryPressure,
        }]
    );
}

#[tokio::test]
async fn sweep_under_threshold_is_a_no_op() {
    let ctx = setup().await;
    let personal = ctx.personal();
    let a = ctx.add(personal.as_str(), "A").await;
    ctx.manager.load_service(personal.as_str(), a.as_str()).await.unwrap();

    assert!(ctx.manager.run_eviction_sweep().await.is_empty());
    assert_eq!(ctx.manager.list_views().await.len(), 1);
}

fn two_isolated_workspaces_sharing(service: &str) -> WorkspaceGraph {
    let mut graph = WorkspaceGraph {
        workspaces: vec![
            workspace_with_services("w1", IsolationMode::Isolated, &[service]),
            workspace_with_services("w2", IsolationMode::Isolated, &[service]),
        ],
        ..WorkspaceGraph::default()
    };
    graph.activate("w1", berth_core::test_support::fixed_time());
    graph
}

#[tokio::test]
async fn same_service_id_in_two_workspaces_gets_two_views() {
    let graph = two_isolated_workspaces_sharing("mail");
    let store = MemoryStore::with_document(berth_storage::encode(&graph).unwrap());
    let ctx = setup_with(store, ManagerConfig::default()).await;

    let v1 = ctx.manager.load_service("w1", "mail").await.unwrap();
    let v2 = ctx.manager.load_service("w2", "mail").await.unwrap();

    assert_eq!(v1.partition, "w1.mail");
    assert_eq!(v2.partition, "w2.mail");
    assert_eq!(v2.workspace_id, "w2");
    assert_ne!(v1.handle, v2.handle);
    assert_eq!(ctx.manager.list_views().await.len(), 2);
    assert_eq!(ctx.views.open_count(), 2);
}

#[tokio::test]
async fn closing_one_workspace_view_leaves_the_other() {
    let graph = two_isolated_workspaces_sharing("mail");
    let store = MemoryStore::with_document(berth_storage::encode(&graph).unwrap());
    let ctx = setup_with(store, ManagerConfig::default()).await;
    ctx.manager.load_service("w1", "mail").await.unwrap();
    ctx.manager.load_service("w2", "mail").await.unwrap();
    let mut rx = ctx.manager.subscribe();

    ctx.manager.close_service("w2", "mail").await.unwrap();

    let live: Vec<ViewKey> = ctx
        .manager
        .list_views()
        .await
        .iter()
        .map(ViewInfo::key)
        .collect();
    assert_eq!(live, vec![ViewKey::new("w1", "mail")]);
    assert_eq!(
        drain_events(&mut rx),
        vec![ManagerEvent::ViewClosed {
            workspace_id: WorkspaceId::new("w2"),
            service_id: ServiceId::new("mail"),
        }]
    );

    let err = ctx.manager.touch_service("w2", "mail").await.unwrap_err();
    assert!(matches!(err, ManagerError::ViewNotLoaded(_)));
    ctx.manager.touch_service("w1", "mail").await.unwrap();
}

#[tokio::test]
async fn pinning_is_scoped_to_the_workspace() {
    let graph = two_isolated_workspaces_sharing("mail");
    let store = MemoryStore::with_document(berth_storage::encode(&graph).unwrap());
    let ctx = setup_with(store, capped(2)).await;
    ctx.manager.load_service("w1", "mail").await.unwrap();
    ctx.tick();
    ctx.manager.load_service("w2", "mail").await.unwrap();
    ctx.manager.pin_service("w1", "mail", true).await.unwrap();

    let views = ctx.manager.list_views().await;
    let pinned: Vec<ViewKey> = views.iter().filter(|v| v.pinned).map(ViewInfo::key).collect();
    assert_eq!(pinned, vec![ViewKey::new("w1", "mail")]);
}

#[tokio::test]
async fn failed_open_at_cap_evicts_nothing() {
    let ctx = setup_with(MemoryStore::new(), capped(1)).await;
    let personal = ctx.personal();
    let a = ctx.add(personal.as_str(), "A").await;
    let b = ctx.add(personal.as_str(), "B").await;
    ctx.manager.load_service(personal.as_str(), a.as_str()).await.unwrap();
    ctx.views.fail_open(b.as_str());
    let mut rx = ctx.manager.subscribe();

    let err = ctx
        .manager
        .load_service(personal.as_str(), b.as_str())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ViewFailure);
    assert_eq!(ctx.views.open_services(), vec![a.clone()]);
    let live: Vec<ServiceId> = ctx
        .manager
        .list_views()
        .await
        .into_iter()
        .map(|v| v.service_id)
        .collect();
    assert_eq!(live, vec![a]);
    assert!(drain(&mut rx).is_empty());
}
