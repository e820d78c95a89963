// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use berth_core::test_support::graph_with;
use berth_core::DEFAULT_WORKSPACE_NAME;

#[tokio::test]
async fn fresh_start_creates_active_personal_workspace() {
    let ctx = setup().await;

    let workspaces = ctx.manager.list_workspaces();
    assert_eq!(workspaces.len(), 1);
    assert_eq!(workspaces[0].name, DEFAULT_WORKSPACE_NAME);
    assert!(workspaces[0].is_active);
    assert_eq!(
        ctx.manager.get_active_workspace().map(|w| w.id),
        Some(ctx.personal())
    );
    assert_eq!(ctx.store.saves(), 1);
}

#[tokio::test]
async fn existing_graph_is_loaded_without_saving() {
    let mut graph = graph_with(&["ws-a", "ws-b"]);
    graph.activate("ws-b", berth_core::test_support::fixed_time());
    let store = MemoryStore::with_document(berth_storage::encode(&graph).unwrap());

    let ctx = setup_with(store, ManagerConfig::default()).await;

    assert_eq!(ctx.manager.list_workspaces().len(), 2);
    assert_eq!(ctx.manager.get_active_workspace().unwrap().id, "ws-b");
    assert_eq!(ctx.store.saves(), 0);
}

#[tokio::test]
async fn corrupt_record_is_replaced_with_default() {
    let ctx = setup_with(MemoryStore::with_document("{not json"), ManagerConfig::default()).await;

    let workspaces = ctx.manager.list_workspaces();
    assert_eq!(workspaces.len(), 1);
    assert_eq!(workspaces[0].name, DEFAULT_WORKSPACE_NAME);
    assert_eq!(ctx.store.saves(), 1);
}

#[tokio::test]
async fn new_workspace_starts_inactive() {
    let ctx = setup().await;
    let mut rx = ctx.manager.subscribe();

    let work = ctx
        .manager
        .create_workspace(WorkspaceSpec::named("Work"))
        .await
        .unwrap();

    assert!(!work.is_active);
    assert_eq!(work.abbreviation, "W");
    assert_eq!(work.isolation_mode, IsolationMode::Shared);
    assert_eq!(ctx.manager.get_active_workspace().unwrap().id, ctx.personal());
    assert_eq!(drain(&mut rx), vec!["workspace:created"]);
    assert_eq!(ctx.store.saves(), 2);
}

#[tokio::test]
async fn workspace_names_are_trimmed_and_required() {
    let ctx = setup().await;

    let ws = ctx
        .manager
        .create_workspace(WorkspaceSpec::named("  Work  "))
        .await
        .unwrap();
    assert_eq!(ws.name, "Work");

    let err = ctx
        .manager
        .create_workspace(WorkspaceSpec::named("   "))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);
    assert_eq!(ctx.manager.list_workspaces().len(), 2);
}

#[tokio::test]
async fn default_isolation_comes_from_config() {
    let config = ManagerConfig {
        default_isolation_mode: IsolationMode::Isolated,
        ..ManagerConfig::default()
    };
    let ctx = setup_with(MemoryStore::new(), config).await;

    let ws = ctx
        .manager
        .create_workspace(WorkspaceSpec::named("Work"))
        .await
        .unwrap();
    assert_eq!(ws.isolation_mode, IsolationMode::Isolated);
}

#[tokio::test]
async fn switching_keeps_exactly_one_active() {
    let ctx = setup().await;
    let personal = ctx.personal();
    let work = ctx.workspace("Work", IsolationMode::Shared).await;
    let mut rx = ctx.manager.subscribe();

    ctx.manager.switch_workspace(work.as_str()).await.unwrap();

    let active: Vec<_> = ctx
        .manager
        .list_workspaces()
        .into_iter()
        .filter(|w| w.is_active)
        .map(|w| w.id)
        .collect();
    assert_eq!(active, vec![work.clone()]);
    assert_eq!(
        drain_events(&mut rx),
        vec![ManagerEvent::WorkspaceSwitched {
            from: Some(personal),
            to: work,
        }]
    );
}

#[tokio::test]
async fn switching_to_active_workspace_emits_nothing() {
    let ctx = setup().await;
    let mut rx = ctx.manager.subscribe();

    ctx.manager
        .switch_workspace(ctx.personal().as_str())
        .await
        .unwrap();

    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn switching_updates_last_accessed() {
    let ctx = setup().await;
    let work = ctx.workspace("Work", IsolationMode::Shared).await;
    let before = ctx.manager.get_workspace(work.as_str()).unwrap().last_accessed;
    ctx.clock.advance(Duration::from_secs(60));

    let after = ctx.manager.switch_workspace(work.as_str()).await.unwrap();
    assert!(after.last_accessed > before);
}

#[tokio::test]
async fn unknown_workspace_is_not_found() {
    let ctx = setup().await;

    let err = ctx.manager.switch_workspace("nope").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(ctx.manager.get_workspace("nope").is_err());
    assert!(ctx.manager.delete_workspace("nope").await.is_err());
}

#[tokio::test]
async fn update_applies_only_given_fields() {
    let ctx = setup().await;
    let personal = ctx.personal();

    let updated = ctx
        .manager
        .update_workspace(
            personal.as_str(),
            WorkspacePatch {
                color: Some("#ff0000".into()),
                ..WorkspacePatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.color, "#ff0000");
    assert_eq!(updated.name, DEFAULT_WORKSPACE_NAME);
    assert!(updated.is_active);
}

#[tokio::test]
async fn changing_isolation_closes_live_views() {
    let ctx = setup().await;
    let personal = ctx.personal();
    let chat = ctx.add(personal.as_str(), "Chat").await;
    ctx.manager
        .load_service(personal.as_str(), chat.as_str())
        .await
        .unwrap();
    let mut rx = ctx.manager.subscribe();

    ctx.manager
        .update_workspace(
            personal.as_str(),
            WorkspacePatch {
                isolation_mode: Some(IsolationMode::Isolated),
                ..WorkspacePatch::default()
            },
        )
        .await
        .unwrap();

    assert!(ctx.manager.list_views().await.is_empty());
    assert_eq!(ctx.views.open_count(), 0);
    assert_eq!(drain(&mut rx), vec!["view:closed", "workspace:updated"]);

    // The view reopens in the new per-service partition
    let view = ctx
        .manager
        .load_service(personal.as_str(), chat.as_str())
        .await
        .unwrap();
    assert_eq!(view.partition, format!("{personal}.{chat}").as_str());
}

#[tokio::test]
async fn delete_cascades_to_views_and_windows() {
    let ctx = setup().await;
    let personal = ctx.personal();
    let work = ctx.workspace("Work", IsolationMode::Isolated).await;
    let mail = ctx.add(work.as_str(), "Mail").await;
    ctx.manager
        .load_service(work.as_str(), mail.as_str())
        .await
        .unwrap();
    ctx.manager
        .create_window(work.as_str(), WindowSpec::default())
        .await
        .unwrap();
    ctx.manager
        .create_partition(work.as_str(), Some(mail.as_str()), PartitionPatch::default())
        .await
        .unwrap();

    ctx.manager.delete_workspace(work.as_str()).await.unwrap();

    assert!(ctx.manager.get_workspace(work.as_str()).is_err());
    assert!(ctx.manager.list_views().await.is_empty());
    assert!(ctx.manager.get_windows(None).await.unwrap().is_empty());
    assert!(ctx.manager.graph().partitions.is_empty());
    assert_eq!(ctx.views.open_count(), 0);
    // Personal stays active
    assert_eq!(ctx.manager.get_active_workspace().unwrap().id, personal);
}

#[tokio::test]
async fn deleting_active_workspace_leaves_none_active() {
    let ctx = setup().await;
    ctx.workspace("Work", IsolationMode::Shared).await;

    ctx.manager
        .delete_workspace(ctx.personal().as_str())
        .await
        .unwrap();

    assert!(ctx.manager.get_active_workspace().is_none());
    assert!(ctx.manager.list_workspaces().iter().all(|w| !w.is_active));
    assert!(ctx.store.saved_graph().unwrap().active_workspace_id.is_none());
}

#[tokio::test]
async fn first_workspace_of_empty_graph_becomes_active() {
    let ctx = setup().await;
    ctx.manager
        .delete_workspace(ctx.personal().as_str())
        .await
        .unwrap();
    let mut rx = ctx.manager.subscribe();

    let ws = ctx
        .manager
        .create_workspace(WorkspaceSpec::named("Fresh"))
        .await
        .unwrap();

    assert!(ws.is_active);
    assert_eq!(ctx.manager.get_active_workspace().unwrap().id, ws.id);
    assert_eq!(drain(&mut rx), vec!["workspace:created", "workspace:switched"]);
}
