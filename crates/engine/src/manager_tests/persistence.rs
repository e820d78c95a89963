// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn every_graph_mutation_is_saved() {
    let ctx = setup().await;
    let personal = ctx.personal();
    let work = ctx.workspace("Work", IsolationMode::Shared).await;
    let chat = ctx.add(work.as_str(), "Chat").await;
    ctx.manager.switch_workspace(work.as_str()).await.unwrap();
    ctx.manager
        .remove_service(work.as_str(), chat.as_str())
        .await
        .unwrap();
    ctx.manager.delete_workspace(personal.as_str()).await.unwrap();

    assert_eq!(ctx.store.saved_graph().unwrap(), *ctx.manager.graph());
}

#[tokio::test]
async fn failed_save_keeps_change_in_memory() {
    let ctx = setup().await;
    ctx.store.fail_saves(true);
    let mut rx = ctx.manager.subscribe();

    let err = ctx
        .manager
        .create_workspace(WorkspaceSpec::named("Work"))
        .await
        .unwrap_err();

    assert!(matches!(err, ManagerError::Persistence(_)));
    assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
    let names: Vec<String> = ctx
        .manager
        .list_workspaces()
        .into_iter()
        .map(|w| w.name)
        .collect();
    assert_eq!(names, vec!["Personal", "Work"]);
    assert_eq!(drain(&mut rx), vec!["workspace:created", "persistence:failed"]);

    // The next successful save carries the earlier change
    ctx.store.fail_saves(false);
    ctx.manager
        .create_workspace(WorkspaceSpec::named("Play"))
        .await
        .unwrap();
    assert_eq!(ctx.store.saved_graph().unwrap().workspaces.len(), 3);
}

#[tokio::test]
async fn view_and_window_changes_are_not_saved() {
    let ctx = setup().await;
    let personal = ctx.personal();
    let chat = ctx.add(personal.as_str(), "Chat").await;
    let saves = ctx.store.saves();

    ctx.manager
        .load_service(personal.as_str(), chat.as_str())
        .await
        .unwrap();
    ctx.manager
        .close_service(personal.as_str(), chat.as_str())
        .await
        .unwrap();
    let window = ctx
        .manager
        .create_window(personal.as_str(), WindowSpec::default())
        .await
        .unwrap();
    ctx.manager.close_window(window.id.as_str()).await.unwrap();

    assert_eq!(ctx.store.saves(), saves);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_mutations_are_serialized() {
    let ctx = setup().await;
    ctx.store.set_save_delay(Duration::from_millis(5));
    let manager = Arc::new(ctx.manager);

    let handles: Vec<_> = (0..20)
        .map(|n| {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move {
                manager
                    .create_workspace(WorkspaceSpec::named(format!("ws {n}")))
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let graph = manager.graph();
    assert_eq!(graph.workspaces.len(), 21);
    let mut ids: Vec<&str> = graph.workspaces.iter().map(|w| w.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 21);
    assert_eq!(graph.workspaces.iter().filter(|w| w.is_active).count(), 1);
    assert_eq!(ctx.store.saved_graph().unwrap(), *graph);
}

#[tokio::test]
async fn shutdown_flushes_final_state() {
    let ctx = setup().await;
    let saves = ctx.store.saves();

    ctx.manager.shutdown().await.unwrap();

    assert_eq!(ctx.store.saves(), saves + 1);
    assert_eq!(ctx.store.saved_graph().unwrap(), *ctx.manager.graph());
}
